use hakoview_common::RenderPose;
use parking_lot::Mutex;
use std::sync::Arc;

/// One published value: the render pose, the rotor speed indicator and the
/// publish sequence number (starts at 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseSample {
    pub pose: RenderPose,
    pub rotor_speed: f64,
    pub seq: u64,
}

/// Single-slot, last-write-wins handoff from the sync thread to the render
/// thread.
///
/// Publishing overwrites whatever is in the slot; reading copies it out and
/// leaves it in place. The lock is held only for the copy, so neither side
/// waits on the other's work.
#[derive(Debug, Clone, Default)]
pub struct PoseChannel {
    slot: Arc<Mutex<Option<PoseSample>>>,
}

impl PoseChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held value.
    pub fn publish(&self, pose: RenderPose, rotor_speed: f64) {
        let mut slot = self.slot.lock();
        let seq = slot.map_or(1, |s| s.seq + 1);
        *slot = Some(PoseSample {
            pose,
            rotor_speed,
            seq,
        });
    }

    /// Latest published value, or `None` if nothing has been published yet.
    pub fn try_read(&self) -> Option<PoseSample> {
        *self.slot.lock()
    }

    /// Latest value only if it is newer than `seen`.
    pub fn read_newer(&self, seen: u64) -> Option<PoseSample> {
        self.try_read().filter(|s| s.seq > seen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn pose(x: f64) -> RenderPose {
        RenderPose::new(DVec3::new(x, 0.0, 0.0), DVec3::ZERO)
    }

    #[test]
    fn empty_before_first_publish() {
        let ch = PoseChannel::new();
        assert!(ch.try_read().is_none());
    }

    #[test]
    fn last_write_wins() {
        let ch = PoseChannel::new();
        ch.publish(pose(1.0), 10.0);
        ch.publish(pose(2.0), 20.0);
        let s = ch.try_read().unwrap();
        assert_eq!(s.pose, pose(2.0));
        assert_eq!(s.rotor_speed, 20.0);
        assert_eq!(s.seq, 2);
    }

    #[test]
    fn read_does_not_consume() {
        let ch = PoseChannel::new();
        ch.publish(pose(3.0), 0.0);
        assert_eq!(ch.try_read(), ch.try_read());
        assert!(ch.try_read().is_some());
    }

    #[test]
    fn read_newer_filters_seen_values() {
        let ch = PoseChannel::new();
        assert!(ch.read_newer(0).is_none());
        ch.publish(pose(1.0), 0.0);
        let s = ch.read_newer(0).unwrap();
        assert!(ch.read_newer(s.seq).is_none());
        ch.publish(pose(2.0), 0.0);
        assert_eq!(ch.read_newer(s.seq).unwrap().pose, pose(2.0));
    }

    #[test]
    fn clones_share_the_slot_across_threads() {
        let ch = PoseChannel::new();
        let writer = ch.clone();
        let t = std::thread::spawn(move || {
            for i in 1..=1000 {
                writer.publish(pose(i as f64), i as f64);
            }
        });
        t.join().unwrap();
        let s = ch.try_read().unwrap();
        assert_eq!(s.pose, pose(1000.0));
        assert_eq!(s.seq, 1000);
    }
}
