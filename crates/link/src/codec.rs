//! Raw PDU record codecs.
//!
//! Pose records are `geometry_msgs/Twist`: six little-endian f64 values,
//! linear x/y/z then angular x/y/z. Actuator records follow
//! `HakoHilActuatorControls`: `u64 time_usec`, up to 16 f32 controls, then
//! an optional `u8 mode` and `u64 flags` with C struct padding.

use glam::DVec3;
use hakoview_common::Pose;
use thiserror::Error;

pub const TWIST_SIZE: usize = 48;
pub const ACTUATOR_CHANNELS: usize = 16;
pub const ACTUATOR_SIZE: usize = 88;

pub(crate) const ACTUATOR_CONTROLS_OFFSET: usize = 8;
const ACTUATOR_MODE_OFFSET: usize = 72;
const ACTUATOR_FLAGS_OFFSET: usize = 80;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{record} record too short: {len} bytes, need at least {need}")]
    TooShort {
        record: &'static str,
        len: usize,
        need: usize,
    },
}

/// Decoded actuator controls.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActuatorControls {
    pub time_usec: u64,
    pub controls: Vec<f32>,
    pub mode: Option<u8>,
    pub flags: Option<u64>,
}

impl ActuatorControls {
    /// Rotor speed indicator: the first control channel scaled by `scale`,
    /// or 0.0 when fewer than `min_channels` channels are present.
    pub fn rotor_speed(&self, min_channels: usize, scale: f64) -> f64 {
        if self.controls.len() < min_channels {
            return 0.0;
        }
        self.controls
            .first()
            .map_or(0.0, |&c| f64::from(c) * scale)
    }
}

fn read_u64(raw: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&raw[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

fn read_f64(raw: &[u8], offset: usize) -> f64 {
    f64::from_bits(read_u64(raw, offset))
}

fn read_f32(raw: &[u8], offset: usize) -> f32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&raw[offset..offset + 4]);
    f32::from_le_bytes(buf)
}

pub fn decode_twist(raw: &[u8]) -> Result<Pose, DecodeError> {
    if raw.len() < TWIST_SIZE {
        return Err(DecodeError::TooShort {
            record: "twist",
            len: raw.len(),
            need: TWIST_SIZE,
        });
    }
    let v = |i: usize| read_f64(raw, i * 8);
    Ok(Pose {
        linear: DVec3::new(v(0), v(1), v(2)),
        angular: DVec3::new(v(3), v(4), v(5)),
    })
}

pub fn encode_twist(pose: &Pose) -> Vec<u8> {
    let mut out = Vec::with_capacity(TWIST_SIZE);
    for v in pose.linear.to_array().into_iter().chain(pose.angular.to_array()) {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

pub fn decode_actuator_controls(raw: &[u8]) -> Result<ActuatorControls, DecodeError> {
    if raw.len() < ACTUATOR_CONTROLS_OFFSET {
        return Err(DecodeError::TooShort {
            record: "actuator",
            len: raw.len(),
            need: ACTUATOR_CONTROLS_OFFSET,
        });
    }
    let channels = ((raw.len() - ACTUATOR_CONTROLS_OFFSET) / 4).min(ACTUATOR_CHANNELS);
    let controls = (0..channels)
        .map(|i| read_f32(raw, ACTUATOR_CONTROLS_OFFSET + i * 4))
        .collect();
    let mode = raw.get(ACTUATOR_MODE_OFFSET).copied();
    let flags =
        (raw.len() >= ACTUATOR_SIZE).then(|| read_u64(raw, ACTUATOR_FLAGS_OFFSET));
    Ok(ActuatorControls {
        time_usec: read_u64(raw, 0),
        controls,
        mode,
        flags,
    })
}

/// Full-size record; missing channels are zero-filled, extras are dropped.
pub fn encode_actuator_controls(ctrl: &ActuatorControls) -> Vec<u8> {
    let mut out = vec![0u8; ACTUATOR_SIZE];
    out[..8].copy_from_slice(&ctrl.time_usec.to_le_bytes());
    for (i, c) in ctrl.controls.iter().take(ACTUATOR_CHANNELS).enumerate() {
        let at = ACTUATOR_CONTROLS_OFFSET + i * 4;
        out[at..at + 4].copy_from_slice(&c.to_le_bytes());
    }
    out[ACTUATOR_MODE_OFFSET] = ctrl.mode.unwrap_or(0);
    out[ACTUATOR_FLAGS_OFFSET..].copy_from_slice(&ctrl.flags.unwrap_or(0).to_le_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twist_layout_is_linear_then_angular() {
        let pose = Pose::new(DVec3::new(1.0, 2.0, 3.0), DVec3::new(0.1, 0.2, 0.3));
        let raw = encode_twist(&pose);
        assert_eq!(raw.len(), TWIST_SIZE);
        assert_eq!(&raw[..8], &1.0f64.to_le_bytes());
        assert_eq!(&raw[40..48], &0.3f64.to_le_bytes());
        assert_eq!(decode_twist(&raw).unwrap(), pose);
    }

    #[test]
    fn twist_ignores_trailing_bytes() {
        let pose = Pose::new(DVec3::splat(4.0), DVec3::splat(-1.0));
        let mut raw = encode_twist(&pose);
        raw.extend_from_slice(&[0xAB; 24]);
        assert_eq!(decode_twist(&raw).unwrap(), pose);
    }

    #[test]
    fn short_twist_is_rejected() {
        let err = decode_twist(&[0u8; 47]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TooShort {
                record: "twist",
                len: 47,
                need: TWIST_SIZE
            }
        );
    }

    #[test]
    fn full_actuator_record_decodes_all_fields() {
        let ctrl = ActuatorControls {
            time_usec: 123_456,
            controls: vec![0.5, 0.6, 0.7, 0.8],
            mode: Some(3),
            flags: Some(0xFF00),
        };
        let decoded = decode_actuator_controls(&encode_actuator_controls(&ctrl)).unwrap();
        assert_eq!(decoded.time_usec, 123_456);
        assert_eq!(decoded.controls.len(), ACTUATOR_CHANNELS);
        assert_eq!(&decoded.controls[..4], &[0.5, 0.6, 0.7, 0.8]);
        assert!(decoded.controls[4..].iter().all(|&c| c == 0.0));
        assert_eq!(decoded.mode, Some(3));
        assert_eq!(decoded.flags, Some(0xFF00));
    }

    #[test]
    fn truncated_actuator_record_yields_fewer_channels() {
        let mut raw = 7u64.to_le_bytes().to_vec();
        raw.extend_from_slice(&0.25f32.to_le_bytes());
        raw.extend_from_slice(&0.5f32.to_le_bytes());
        raw.push(0); // partial channel is ignored
        let decoded = decode_actuator_controls(&raw).unwrap();
        assert_eq!(decoded.controls, vec![0.25, 0.5]);
        assert_eq!(decoded.mode, None);
        assert_eq!(decoded.flags, None);
    }

    #[test]
    fn rotor_speed_needs_four_channels() {
        let two = ActuatorControls {
            controls: vec![0.5, 0.5],
            ..Default::default()
        };
        assert_eq!(two.rotor_speed(4, 400.0), 0.0);

        let four = ActuatorControls {
            controls: vec![0.5, 0.1, 0.1, 0.1],
            ..Default::default()
        };
        assert_eq!(four.rotor_speed(4, 400.0), 200.0);
    }
}
