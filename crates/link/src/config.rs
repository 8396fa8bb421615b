//! PDU configuration loading and visualizer asset registration.

use crate::codec::{ACTUATOR_CONTROLS_OFFSET, TWIST_SIZE};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid PDU config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("robot '{0}' not found in PDU config")]
    MissingRobot(String),
    #[error("robot '{robot}' has no PDU channel named '{channel}'")]
    MissingChannel { robot: String, channel: String },
    #[error("PDU channel '{channel}' is {size} bytes, need at least {need}")]
    PduTooSmall {
        channel: String,
        size: usize,
        need: usize,
    },
}

/// PDU configuration document: robots and the PDU channels they expose.
#[derive(Debug, Clone, Deserialize)]
pub struct PduConfig {
    pub robots: Vec<RobotConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RobotConfig {
    pub name: String,
    #[serde(default)]
    pub shm_pdu_readers: Vec<PduChannelConfig>,
    #[serde(default)]
    pub shm_pdu_writers: Vec<PduChannelConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PduChannelConfig {
    #[serde(rename = "type")]
    pub type_name: String,
    pub org_name: String,
    #[serde(default)]
    pub name: Option<String>,
    pub channel_id: u32,
    pub pdu_size: usize,
    #[serde(default)]
    pub write_cycle: Option<u32>,
}

impl PduConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), robots = config.robots.len(), "loaded PDU config");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn robot(&self, name: &str) -> Option<&RobotConfig> {
        self.robots.iter().find(|r| r.name == name)
    }
}

impl RobotConfig {
    /// Channel by `org_name`, searching readers before writers.
    pub fn channel(&self, org_name: &str) -> Option<&PduChannelConfig> {
        self.shm_pdu_readers
            .iter()
            .chain(&self.shm_pdu_writers)
            .find(|c| c.org_name == org_name)
    }
}

/// Which PDUs the sync loop reads and how it paces itself.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    pub robot: String,
    pub pose_channel: String,
    pub actuator_channel: String,
    /// Multiplier from the first actuator control to the rotor speed indicator.
    pub rotor_scale: f64,
    /// Fewer actuator channels than this means rotor speed 0.
    pub min_actuator_channels: usize,
    pub delta_time_usec: u64,
    /// Sleep one delta of wall-clock time after each clock tick.
    pub throttle: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            robot: "Drone".into(),
            pose_channel: "pos".into(),
            actuator_channel: "motor".into(),
            rotor_scale: 400.0,
            min_actuator_channels: 4,
            delta_time_usec: 20_000,
            throttle: true,
        }
    }
}

/// Largest step in milliseconds whose microsecond value fits in a `u64`.
pub const MAX_DELTA_MSEC: u64 = u64::MAX / 1000;

impl LinkConfig {
    /// Steps above [`MAX_DELTA_MSEC`] saturate at `u64::MAX` microseconds.
    pub fn with_delta_msec(delta_msec: u64) -> Self {
        Self {
            delta_time_usec: delta_msec.saturating_mul(1000),
            ..Self::default()
        }
    }
}

/// Result of registering the visualizer against a PDU config.
#[derive(Debug, Clone)]
pub struct Registration {
    pub asset_name: String,
    pub robot: String,
    pub pose: PduChannelConfig,
    pub actuator: PduChannelConfig,
}

/// Check that the configured robot exposes both PDUs the sync loop needs.
pub fn register(
    asset_name: &str,
    config: &PduConfig,
    link: &LinkConfig,
) -> Result<Registration, ConfigError> {
    let robot = config
        .robot(&link.robot)
        .ok_or_else(|| ConfigError::MissingRobot(link.robot.clone()))?;
    let channel = |name: &str| {
        robot
            .channel(name)
            .cloned()
            .ok_or_else(|| ConfigError::MissingChannel {
                robot: robot.name.clone(),
                channel: name.to_owned(),
            })
    };
    let pose = channel(&link.pose_channel)?;
    let actuator = channel(&link.actuator_channel)?;
    check_size(&pose, TWIST_SIZE)?;
    check_size(&actuator, ACTUATOR_CONTROLS_OFFSET)?;
    tracing::info!(
        asset = asset_name,
        robot = %robot.name,
        pose_channel = pose.channel_id,
        actuator_channel = actuator.channel_id,
        "asset registered"
    );
    Ok(Registration {
        asset_name: asset_name.to_owned(),
        robot: robot.name.clone(),
        pose,
        actuator,
    })
}

fn check_size(channel: &PduChannelConfig, need: usize) -> Result<(), ConfigError> {
    if channel.pdu_size < need {
        return Err(ConfigError::PduTooSmall {
            channel: channel.org_name.clone(),
            size: channel.pdu_size,
            need,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "robots": [
            {
                "name": "Drone",
                "shm_pdu_readers": [
                    { "type": "hako_mavlink_msgs/HakoHilActuatorControls",
                      "org_name": "motor", "name": "Drone_motor",
                      "channel_id": 0, "pdu_size": 88 }
                ],
                "shm_pdu_writers": [
                    { "type": "geometry_msgs/Twist", "org_name": "pos",
                      "channel_id": 1, "pdu_size": 48, "write_cycle": 1 }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_robots_and_channels() {
        let cfg = PduConfig::from_json(SAMPLE).unwrap();
        let drone = cfg.robot("Drone").unwrap();
        assert_eq!(drone.channel("motor").unwrap().channel_id, 0);
        let pos = drone.channel("pos").unwrap();
        assert_eq!(pos.type_name, "geometry_msgs/Twist");
        assert_eq!(pos.write_cycle, Some(1));
        assert!(drone.channel("camera").is_none());
    }

    #[test]
    fn register_finds_both_channels() {
        let cfg = PduConfig::from_json(SAMPLE).unwrap();
        let reg = register("Visualizer", &cfg, &LinkConfig::default()).unwrap();
        assert_eq!(reg.asset_name, "Visualizer");
        assert_eq!(reg.pose.org_name, "pos");
        assert_eq!(reg.actuator.org_name, "motor");
    }

    #[test]
    fn register_rejects_unknown_robot() {
        let cfg = PduConfig::from_json(SAMPLE).unwrap();
        let link = LinkConfig {
            robot: "Rover".into(),
            ..LinkConfig::default()
        };
        let err = register("Visualizer", &cfg, &link).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRobot(r) if r == "Rover"));
    }

    #[test]
    fn register_rejects_missing_channel() {
        let cfg = PduConfig::from_json(r#"{"robots":[{"name":"Drone"}]}"#).unwrap();
        let err = register("Visualizer", &cfg, &LinkConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingChannel { channel, .. } if channel == "pos"));
    }

    #[test]
    fn sample_sizes_match_codec_records() {
        let cfg = PduConfig::from_json(SAMPLE).unwrap();
        let reg = register("Visualizer", &cfg, &LinkConfig::default()).unwrap();
        assert_eq!(reg.pose.pdu_size, TWIST_SIZE);
        assert_eq!(reg.actuator.pdu_size, crate::codec::ACTUATOR_SIZE);
    }

    #[test]
    fn register_rejects_undersized_pdus() {
        let short_pose = SAMPLE.replace(r#""pdu_size": 48"#, r#""pdu_size": 24"#);
        let cfg = PduConfig::from_json(&short_pose).unwrap();
        let err = register("Visualizer", &cfg, &LinkConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::PduTooSmall { channel, size: 24, need: 48 } if channel == "pos"
        ));

        let short_motor = SAMPLE.replace(r#""pdu_size": 88"#, r#""pdu_size": 4"#);
        let cfg = PduConfig::from_json(&short_motor).unwrap();
        let err = register("Visualizer", &cfg, &LinkConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::PduTooSmall { channel, .. } if channel == "motor"));
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let cfg = PduConfig::load(file.path()).unwrap();
        assert_eq!(cfg.robots.len(), 1);
    }

    #[test]
    fn load_reports_missing_file_and_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(PduConfig::load(&missing), Err(ConfigError::Io { .. })));
        assert!(matches!(PduConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn delta_msec_converts_to_usec() {
        assert_eq!(LinkConfig::with_delta_msec(20).delta_time_usec, 20_000);
    }

    #[test]
    fn delta_msec_limit_does_not_overflow() {
        let at_limit = LinkConfig::with_delta_msec(MAX_DELTA_MSEC).delta_time_usec;
        assert_eq!(at_limit, MAX_DELTA_MSEC * 1000);
        let beyond = LinkConfig::with_delta_msec(u64::MAX / 100).delta_time_usec;
        assert_eq!(beyond, u64::MAX);
    }
}
