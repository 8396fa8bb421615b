use anyhow::Context as _;
use clap::{Parser, Subcommand};
use glam::DVec3;
use hakoview_common::{Pose, to_render_pose};
use hakoview_link::{
    CycleOutcome, DemoFlight, LinkConfig, MAX_DELTA_MSEC, MemoryBus, PduConfig, PoseChannel,
    SyncLoop, register,
};
use hakoview_render::{
    CameraRig, DRONE_START, DebugTextRenderer, OrbitCamera, OrbitConfig, Renderer, Scene,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const ASSET_NAME: &str = "Visualizer";

/// Simulated run length from `--seconds`; must be positive and fit a `Duration`.
fn run_duration(seconds: f64) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(seconds)
        .ok()
        .filter(|d| !d.is_zero())
        .with_context(|| format!("--seconds must be a positive duration, got {seconds}"))
}

#[derive(Parser)]
#[command(name = "hakoview-cli", about = "Headless tools for the drone visualizer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Convert a simulation pose to the render frame
    #[command(allow_negative_numbers = true)]
    Frame {
        x: f64,
        y: f64,
        z: f64,
        /// Radians
        roll: f64,
        /// Radians
        pitch: f64,
        /// Radians
        yaw: f64,
    },
    /// Run the sync loop against the scripted flight and dump the scene
    Headless {
        /// PDU configuration JSON
        config_path: PathBuf,
        /// Simulation step in milliseconds
        #[arg(value_parser = clap::value_parser!(u64).range(1..=MAX_DELTA_MSEC))]
        delta_time_msec: u64,
        /// Simulated seconds to run
        #[arg(short, long, default_value = "5")]
        seconds: f64,
        /// Print the scene every N publishes
        #[arg(long, default_value = "50")]
        every: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("hakoview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", hakoview_common::crate_info());
            println!("link: {}", hakoview_link::crate_info());
            println!("input: {}", hakoview_input::crate_info());
            println!("render: {}", hakoview_render::crate_info());
        }
        Commands::Frame {
            x,
            y,
            z,
            roll,
            pitch,
            yaw,
        } => {
            let pose = Pose::new(DVec3::new(x, y, z), DVec3::new(roll, pitch, yaw));
            let render = to_render_pose(&pose);
            let p = render.position;
            let hpr = render.hpr_deg;
            println!("position: ({:.4}, {:.4}, {:.4})", p.x, p.y, p.z);
            println!("hpr (deg): ({:.4}, {:.4}, {:.4})", hpr.x, hpr.y, hpr.z);
        }
        Commands::Headless {
            config_path,
            delta_time_msec,
            seconds,
            every,
        } => {
            let duration = run_duration(seconds)?;
            let link = LinkConfig {
                throttle: false,
                ..LinkConfig::with_delta_msec(delta_time_msec)
            };
            let registration = match PduConfig::load(&config_path)
                .and_then(|pdu| register(ASSET_NAME, &pdu, &link))
            {
                Ok(registration) => registration,
                Err(e) => {
                    tracing::error!(path = %config_path.display(), "asset registration failed: {e}");
                    return Err(e.into());
                }
            };
            println!(
                "Headless run: robot={}, delta={}ms, seconds={seconds}",
                registration.robot, delta_time_msec
            );

            let channel = PoseChannel::new();
            let bus = MemoryBus::new();
            let flight = DemoFlight::new(bus.clone(), &link).with_duration(duration);
            let dt = link.delta_time_usec as f64 / 1e6;
            let mut sync = SyncLoop::new(flight, bus, channel.clone(), link);

            let mut scene = Scene::default();
            let camera = OrbitCamera::new(OrbitConfig::default(), CameraRig::close_up(DRONE_START));
            let renderer = DebugTextRenderer::new();
            let every = every.max(1);
            let mut seen = 0;

            loop {
                match sync.run_cycle() {
                    CycleOutcome::Published => {}
                    CycleOutcome::Skipped => continue,
                    CycleOutcome::ClockStopped | CycleOutcome::StopRequested => break,
                }
                scene.drone.advance_rotors(dt);
                let Some(sample) = channel.read_newer(seen) else {
                    continue;
                };
                seen = sample.seq;
                scene.drone.apply_pose(&sample.pose, sample.rotor_speed);
                if sample.seq % every == 0 {
                    print!("{}", renderer.render(&scene, &camera.render_view()));
                    println!("{}", scene.hud_text());
                }
            }

            let report = sync.report();
            println!(
                "Done: cycles={}, published={}, skipped={}, exit={:?}",
                report.cycles, report.published, report.skipped, report.exit
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headless(delta: &str) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(["hakoview-cli", "headless", "pdu.json", delta])
    }

    #[test]
    fn delta_range_matches_link_limit() {
        assert!(headless("20").is_ok());
        assert!(headless(&MAX_DELTA_MSEC.to_string()).is_ok());
        assert!(headless(&(MAX_DELTA_MSEC + 1).to_string()).is_err());
        assert!(headless("0").is_err());
    }

    #[test]
    fn run_duration_rejects_unrepresentable_seconds() {
        assert_eq!(run_duration(2.5).unwrap(), Duration::from_millis(2500));
        assert!(run_duration(1e20).is_err());
        assert!(run_duration(0.0).is_err());
        assert!(run_duration(-1.0).is_err());
        assert!(run_duration(f64::NAN).is_err());
        assert!(run_duration(f64::INFINITY).is_err());
    }
}
