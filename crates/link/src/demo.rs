//! Scripted flight that stands in for the simulator when none is attached.
//!
//! The flight is also the clock: every `usleep` advances simulated time by
//! the requested delta and writes the new pose and actuator records to a
//! [`MemoryBus`].

use crate::bus::MemoryBus;
use crate::clock::SimClock;
use crate::codec::{ActuatorControls, encode_actuator_controls, encode_twist};
use crate::config::LinkConfig;
use glam::DVec3;
use hakoview_common::Pose;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::time::Duration;

const GRAVITY: f64 = 9.81;
const HOVER_THROTTLE: f32 = 0.55;

#[derive(Debug, Clone)]
pub struct DemoFlight {
    bus: MemoryBus,
    robot: String,
    pose_channel: String,
    actuator_channel: String,
    elapsed_usec: u64,
    duration_usec: Option<u64>,
    /// Climb time to cruise altitude, seconds.
    pub climb_time: f64,
    pub altitude: f64,
    pub radius: f64,
    /// Seconds per lap.
    pub period: f64,
}

impl DemoFlight {
    pub fn new(bus: MemoryBus, link: &LinkConfig) -> Self {
        Self {
            bus,
            robot: link.robot.clone(),
            pose_channel: link.pose_channel.clone(),
            actuator_channel: link.actuator_channel.clone(),
            elapsed_usec: 0,
            duration_usec: None,
            climb_time: 2.0,
            altitude: 1.0,
            radius: 1.0,
            period: 12.0,
        }
    }

    /// End the simulation after `duration` of simulated time.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_usec = Some(u64::try_from(duration.as_micros()).unwrap_or(u64::MAX));
        self
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.elapsed_usec)
    }

    /// Pose at `t` seconds: vertical climb, then counter-clockwise laps with
    /// the nose along the path and a coordinated bank.
    pub fn pose_at(&self, t: f64) -> Pose {
        if t < self.climb_time {
            let z = self.altitude * t / self.climb_time;
            return Pose::new(DVec3::new(self.radius, 0.0, z), DVec3::new(0.0, 0.0, FRAC_PI_2));
        }
        let omega = TAU / self.period;
        let phase = omega * (t - self.climb_time);
        let speed = omega * self.radius;
        let bank = (speed * speed / (self.radius * GRAVITY)).atan();
        Pose::new(
            DVec3::new(
                self.radius * phase.cos(),
                self.radius * phase.sin(),
                self.altitude,
            ),
            DVec3::new(-bank, 0.0, phase + FRAC_PI_2),
        )
    }

    pub fn controls_at(&self, t: f64) -> ActuatorControls {
        let throttle = if t < self.climb_time {
            HOVER_THROTTLE + 0.15
        } else {
            HOVER_THROTTLE
        };
        ActuatorControls {
            time_usec: self.elapsed_usec,
            controls: vec![throttle; 4],
            mode: None,
            flags: None,
        }
    }
}

impl SimClock for DemoFlight {
    fn usleep(&mut self, delta_usec: u64) -> bool {
        self.elapsed_usec = self.elapsed_usec.saturating_add(delta_usec);
        if self.duration_usec.is_some_and(|d| self.elapsed_usec > d) {
            return false;
        }
        let t = self.elapsed_usec as f64 / 1e6;
        self.bus
            .write(&self.robot, &self.pose_channel, encode_twist(&self.pose_at(t)));
        self.bus.write(
            &self.robot,
            &self.actuator_channel,
            encode_actuator_controls(&self.controls_at(t)),
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::PduBus;
    use crate::channel::PoseChannel;
    use crate::codec::decode_twist;
    use crate::sync_loop::{ExitReason, SyncLoop};

    #[test]
    fn each_tick_writes_both_records() {
        let mut bus = MemoryBus::new();
        let mut flight = DemoFlight::new(bus.clone(), &LinkConfig::default());
        assert!(flight.usleep(10_000));
        let pose = decode_twist(&bus.read_raw("Drone", "pos").unwrap()).unwrap();
        assert!(pose.linear.z > 0.0);
        assert!(bus.read_raw("Drone", "motor").is_some());
    }

    #[test]
    fn climb_ends_on_the_circle() {
        let flight = DemoFlight::new(MemoryBus::new(), &LinkConfig::default());
        let end_of_climb = flight.pose_at(flight.climb_time - 1e-9);
        let start_of_lap = flight.pose_at(flight.climb_time);
        assert!(end_of_climb.linear.abs_diff_eq(start_of_lap.linear, 1e-6));
        assert!((start_of_lap.linear.z - flight.altitude).abs() < 1e-12);
    }

    #[test]
    fn lap_stays_on_radius() {
        let flight = DemoFlight::new(MemoryBus::new(), &LinkConfig::default());
        for i in 0..24 {
            let p = flight.pose_at(flight.climb_time + i as f64 * 0.5);
            let r = p.linear.truncate().length();
            assert!((r - flight.radius).abs() < 1e-9);
        }
    }

    #[test]
    fn duration_ends_the_simulation() {
        let mut flight = DemoFlight::new(MemoryBus::new(), &LinkConfig::default())
            .with_duration(Duration::from_millis(50));
        let mut ticks = 0;
        while flight.usleep(10_000) {
            ticks += 1;
        }
        assert_eq!(ticks, 5);
    }

    #[test]
    fn drives_a_sync_loop_to_completion() {
        let bus = MemoryBus::new();
        let channel = PoseChannel::new();
        let link = LinkConfig {
            throttle: false,
            ..LinkConfig::default()
        };
        let flight = DemoFlight::new(bus.clone(), &link).with_duration(Duration::from_secs(1));
        let report = SyncLoop::new(flight, bus, channel.clone(), link.clone()).run();
        assert_eq!(report.exit, Some(ExitReason::ClockStopped));
        assert_eq!(report.published, 50);
        let sample = channel.try_read().unwrap();
        assert_eq!(sample.seq, 50);
        assert!((sample.rotor_speed - f64::from(HOVER_THROTTLE + 0.15) * 400.0).abs() < 1e-3);
    }
}
