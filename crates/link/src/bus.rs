use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Keyed access to raw PDU records on the simulator's data bus.
pub trait PduBus {
    /// Non-blocking service step, run once per cycle before any reads.
    fn pump(&mut self) {}

    /// Latest raw record for `robot`/`channel`, or `None` when nothing new
    /// has arrived.
    fn read_raw(&mut self, robot: &str, channel: &str) -> Option<Vec<u8>>;
}

impl<B: PduBus + ?Sized> PduBus for Box<B> {
    fn pump(&mut self) {
        (**self).pump()
    }

    fn read_raw(&mut self, robot: &str, channel: &str) -> Option<Vec<u8>> {
        (**self).read_raw(robot, channel)
    }
}

/// In-process bus. Clones share storage; a read takes the record so the next
/// read is empty until someone writes again.
#[derive(Debug, Clone, Default)]
pub struct MemoryBus {
    slots: Arc<Mutex<HashMap<(String, String), Vec<u8>>>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&self, robot: &str, channel: &str, data: Vec<u8>) {
        self.slots
            .lock()
            .insert((robot.to_owned(), channel.to_owned()), data);
    }

    /// Whether a record is waiting for `robot`/`channel`.
    pub fn has_pending(&self, robot: &str, channel: &str) -> bool {
        self.slots
            .lock()
            .contains_key(&(robot.to_owned(), channel.to_owned()))
    }
}

impl PduBus for MemoryBus {
    fn read_raw(&mut self, robot: &str, channel: &str) -> Option<Vec<u8>> {
        self.slots
            .lock()
            .remove(&(robot.to_owned(), channel.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_takes_latest_record() {
        let mut bus = MemoryBus::new();
        bus.write("Drone", "pos", vec![1]);
        bus.write("Drone", "pos", vec![2]);
        assert_eq!(bus.read_raw("Drone", "pos"), Some(vec![2]));
        assert_eq!(bus.read_raw("Drone", "pos"), None);
    }

    #[test]
    fn channels_are_keyed_by_robot_and_name() {
        let mut bus = MemoryBus::new();
        bus.write("Drone", "motor", vec![7]);
        assert!(bus.read_raw("Drone", "pos").is_none());
        assert!(bus.read_raw("Other", "motor").is_none());
        assert!(bus.has_pending("Drone", "motor"));
        assert_eq!(bus.read_raw("Drone", "motor"), Some(vec![7]));
    }

    #[test]
    fn clones_share_storage() {
        let writer = MemoryBus::new();
        let mut reader = writer.clone();
        writer.write("Drone", "pos", vec![9, 9]);
        assert_eq!(reader.read_raw("Drone", "pos"), Some(vec![9, 9]));
    }
}
