//! Per-frame task registration.
//!
//! Tasks run once per rendered frame, in registration order, until they are
//! removed or return [`TaskStatus::Done`].

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Continue,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Frames run so far, starting at 0 for the first frame.
    pub frame: u64,
    /// Seconds since the previous frame.
    pub dt: f64,
}

type Task<C> = Box<dyn FnMut(&mut C, &FrameInfo) -> TaskStatus>;

pub struct FrameTasks<C> {
    tasks: Vec<(String, Task<C>)>,
    frame: u64,
}

impl<C> Default for FrameTasks<C> {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            frame: 0,
        }
    }
}

impl<C> FrameTasks<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `task` under `name`, replacing any task with the same name.
    pub fn add<F>(&mut self, name: impl Into<String>, task: F)
    where
        F: FnMut(&mut C, &FrameInfo) -> TaskStatus + 'static,
    {
        let name = name.into();
        if self.remove(&name) {
            tracing::debug!(task = %name, "replacing frame task");
        }
        self.tasks.push((name, Box::new(task)));
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|(n, _)| n != name);
        self.tasks.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run every task once.
    pub fn run_frame(&mut self, ctx: &mut C, dt: f64) {
        let info = FrameInfo {
            frame: self.frame,
            dt,
        };
        self.tasks.retain_mut(|(name, task)| match task(ctx, &info) {
            TaskStatus::Continue => true,
            TaskStatus::Done => {
                tracing::debug!(task = %name, frame = info.frame, "frame task finished");
                false
            }
        });
        self.frame += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_run_every_frame_in_order() {
        let mut tasks = FrameTasks::<Vec<&'static str>>::new();
        tasks.add("a", |log, _| {
            log.push("a");
            TaskStatus::Continue
        });
        tasks.add("b", |log, _| {
            log.push("b");
            TaskStatus::Continue
        });
        let mut log = Vec::new();
        tasks.run_frame(&mut log, 0.016);
        tasks.run_frame(&mut log, 0.016);
        assert_eq!(log, vec!["a", "b", "a", "b"]);
        assert_eq!(tasks.frame(), 2);
    }

    #[test]
    fn removed_task_stops_running() {
        let mut tasks = FrameTasks::<u32>::new();
        tasks.add("count", |n, _| {
            *n += 1;
            TaskStatus::Continue
        });
        let mut n = 0;
        tasks.run_frame(&mut n, 0.0);
        assert!(tasks.remove("count"));
        assert!(!tasks.remove("count"));
        tasks.run_frame(&mut n, 0.0);
        assert_eq!(n, 1);
        assert!(tasks.is_empty());
    }

    #[test]
    fn done_task_is_dropped() {
        let mut tasks = FrameTasks::<u32>::new();
        tasks.add("twice", |n, info| {
            *n += 1;
            if info.frame >= 1 {
                TaskStatus::Done
            } else {
                TaskStatus::Continue
            }
        });
        let mut n = 0;
        for _ in 0..5 {
            tasks.run_frame(&mut n, 0.0);
        }
        assert_eq!(n, 2);
        assert!(!tasks.contains("twice"));
    }

    #[test]
    fn adding_same_name_replaces() {
        let mut tasks = FrameTasks::<u32>::new();
        tasks.add("t", |n, _| {
            *n += 1;
            TaskStatus::Continue
        });
        tasks.add("t", |n, _| {
            *n += 10;
            TaskStatus::Continue
        });
        assert_eq!(tasks.len(), 1);
        let mut n = 0;
        tasks.run_frame(&mut n, 0.0);
        assert_eq!(n, 10);
    }

    #[test]
    fn frame_info_carries_dt() {
        let mut tasks = FrameTasks::<f64>::new();
        tasks.add("dt", |acc, info| {
            *acc += info.dt;
            TaskStatus::Continue
        });
        let mut acc = 0.0;
        tasks.run_frame(&mut acc, 0.25);
        tasks.run_frame(&mut acc, 0.5);
        assert_eq!(acc, 0.75);
    }
}
