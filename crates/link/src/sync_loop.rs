//! The producer side of the pose pipeline.
//!
//! Each cycle waits on the simulator clock, pulls the pose and actuator
//! records, converts the pose to the render frame and publishes it. The loop
//! ends when the clock reports the simulation is over or a stop is requested;
//! the stop flag is checked on both sides of the clock wait so a request
//! takes effect within one cycle.

use crate::bus::PduBus;
use crate::channel::PoseChannel;
use crate::clock::SimClock;
use crate::codec::{decode_actuator_controls, decode_twist};
use crate::config::LinkConfig;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use hakoview_common::to_render_pose;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Starting,
    WaitingOnClock,
    Decoding,
    Publishing,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Published,
    /// No usable pose this cycle; the previous publish stays visible.
    Skipped,
    ClockStopped,
    StopRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    ClockStopped,
    StopRequested,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopReport {
    pub cycles: u64,
    pub published: u64,
    pub skipped: u64,
    pub exit: Option<ExitReason>,
}

pub struct SyncLoop<C, B> {
    clock: C,
    bus: B,
    channel: PoseChannel,
    config: LinkConfig,
    stop: Arc<AtomicBool>,
    state: LoopState,
    report: LoopReport,
}

impl<C: SimClock, B: PduBus> SyncLoop<C, B> {
    pub fn new(clock: C, bus: B, channel: PoseChannel, config: LinkConfig) -> Self {
        Self {
            clock,
            bus,
            channel,
            config,
            stop: Arc::new(AtomicBool::new(false)),
            state: LoopState::Starting,
            report: LoopReport::default(),
        }
    }

    /// Shared flag; storing `true` asks the loop to exit.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn report(&self) -> LoopReport {
        self.report
    }

    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn finish(&mut self, reason: ExitReason) -> CycleOutcome {
        self.state = LoopState::Stopped;
        self.report.exit = Some(reason);
        match reason {
            ExitReason::ClockStopped => CycleOutcome::ClockStopped,
            ExitReason::StopRequested => CycleOutcome::StopRequested,
        }
    }

    /// Run one clock cycle.
    pub fn run_cycle(&mut self) -> CycleOutcome {
        if self.state == LoopState::Stopped {
            return match self.report.exit {
                Some(ExitReason::ClockStopped) => CycleOutcome::ClockStopped,
                _ => CycleOutcome::StopRequested,
            };
        }
        if self.stop_requested() {
            return self.finish(ExitReason::StopRequested);
        }

        self.state = LoopState::WaitingOnClock;
        let delta = self.config.delta_time_usec;
        if !self.clock.usleep(delta) {
            return self.finish(ExitReason::ClockStopped);
        }
        if self.config.throttle {
            thread::sleep(Duration::from_micros(delta));
        }
        self.report.cycles += 1;
        if self.stop_requested() {
            return self.finish(ExitReason::StopRequested);
        }

        self.bus.pump();
        self.state = LoopState::Decoding;
        let robot = self.config.robot.as_str();
        let Some(raw_pose) = self.bus.read_raw(robot, &self.config.pose_channel) else {
            self.report.skipped += 1;
            return CycleOutcome::Skipped;
        };
        let pose = match decode_twist(&raw_pose) {
            Ok(pose) => pose,
            Err(e) => {
                tracing::warn!("dropping pose record: {e}");
                self.report.skipped += 1;
                return CycleOutcome::Skipped;
            }
        };
        let rotor_speed = self
            .bus
            .read_raw(robot, &self.config.actuator_channel)
            .and_then(|raw| match decode_actuator_controls(&raw) {
                Ok(ctrl) => Some(ctrl),
                Err(e) => {
                    tracing::warn!("dropping actuator record: {e}");
                    None
                }
            })
            .map_or(0.0, |ctrl| {
                ctrl.rotor_speed(self.config.min_actuator_channels, self.config.rotor_scale)
            });

        let render_pose = to_render_pose(&pose);
        self.state = LoopState::Publishing;
        self.channel.publish(render_pose, rotor_speed);
        self.report.published += 1;
        tracing::trace!(
            x = pose.linear.x,
            y = pose.linear.y,
            z = pose.linear.z,
            rotor_speed,
            "pose published"
        );
        CycleOutcome::Published
    }

    /// Run cycles until the clock stops or a stop is requested.
    pub fn run(mut self) -> LoopReport {
        let _span = tracing::info_span!("sync_loop", robot = %self.config.robot).entered();
        tracing::info!(delta_usec = self.config.delta_time_usec, "sync loop started");
        loop {
            match self.run_cycle() {
                CycleOutcome::ClockStopped | CycleOutcome::StopRequested => break,
                CycleOutcome::Published | CycleOutcome::Skipped => {}
            }
        }
        tracing::info!(
            cycles = self.report.cycles,
            published = self.report.published,
            skipped = self.report.skipped,
            exit = ?self.report.exit,
            "sync loop stopped"
        );
        self.report
    }
}

impl<C, B> SyncLoop<C, B>
where
    C: SimClock + Send + 'static,
    B: PduBus + Send + 'static,
{
    /// Run the loop on its own thread.
    pub fn spawn(self) -> std::io::Result<SyncHandle> {
        let stop = self.stop_flag();
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let thread = thread::Builder::new()
            .name("hakoview-sync".into())
            .spawn(move || {
                let report = self.run();
                let _ = done_tx.send(report);
            })?;
        Ok(SyncHandle {
            stop,
            done: done_rx,
            thread: Some(thread),
        })
    }
}

/// Owner-side handle to a spawned sync loop.
pub struct SyncHandle {
    stop: Arc<AtomicBool>,
    done: Receiver<LoopReport>,
    thread: Option<JoinHandle<()>>,
}

impl SyncHandle {
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Request a stop and wait up to `timeout` for the loop to exit.
    ///
    /// Returns `None` and logs a warning if the thread is still running when
    /// the wait runs out; the thread is then left detached.
    pub fn stop(mut self, timeout: Duration) -> Option<LoopReport> {
        self.request_stop();
        match self.done.recv_timeout(timeout) {
            Ok(report) => {
                if let Some(thread) = self.thread.take() {
                    let _ = thread.join();
                }
                Some(report)
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(?timeout, "sync thread still alive after stop request");
                self.thread.take();
                None
            }
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(thread) = self.thread.take() {
                    if thread.join().is_err() {
                        tracing::warn!("sync thread panicked");
                    }
                }
                None
            }
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.request_stop();
    }
}
