//! Runs the robot program against the simulated device bus.
//!
//! Gamepad presses, dashboard edits and sensor readings come from an optional
//! JSON script (see `Script`). Without `--ticks` the simulation runs until the
//! script is exhausted, or until Ctrl-C when there is no script.

use std::ops::ControlFlow;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use deepspace_bot::robot_config::RobotConfig;
use deepspace_bot::robot_hal_mock::RobotHalMock;
use deepspace_bot::robot_loop::{run_ticks, RobotLoop};
use deepspace_bot::scripted_input::{Script, ScriptedInput};

#[derive(Parser, Debug)]
#[clap(name = "robot_sim")]
struct Opts {
    /// JSON file overriding any subset of the robot constants.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// JSON input script.
    #[clap(short, long)]
    script: Option<PathBuf>,

    /// Stop after this many ticks.
    #[clap(short = 'n', long)]
    ticks: Option<u64>,

    /// Write the effective configuration to this path and exit.
    #[clap(long)]
    dump_config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts: Opts = Opts::parse();

    let config = match &opts.config {
        Some(path) => RobotConfig::load(path)?,
        None => RobotConfig::default(),
    };
    if let Some(path) = &opts.dump_config {
        config.save(path)?;
        info!("Wrote configuration to {}", path.display());
        return Ok(());
    }

    let script = match &opts.script {
        Some(path) => Some(Script::load(path)?),
        None => None,
    };
    let stop_when_script_ends = script.is_some() && opts.ticks.is_none();
    let mut input = ScriptedInput::new(script.unwrap_or_default());

    let hal = RobotHalMock::new();
    let bus = hal.clone();
    let mut robot_loop = RobotLoop::new(&config, move || Box::new(bus.clone()));
    let period = config.loop_period();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Could not listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    let ticks = run_ticks(period, |tick| {
        input.advance(tick, &hal, &mut robot_loop.dashboard);
        let snapshot = robot_loop.step(&input);
        hal.step(period);
        if tick % 50 == 0 {
            info!("tick {tick}: arm {:?} goal {} legs {} drive {:.2}/{:.2}",
                snapshot.arm.sensed_position, snapshot.arm.goal_position,
                snapshot.climber.leg_height, snapshot.drive.left, snapshot.drive.right);
        }

        let limit_reached = opts.ticks.map_or(false, |limit| tick + 1 >= limit);
        if limit_reached || (stop_when_script_ends && input.is_finished()) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }, shutdown).await;

    robot_loop.shutdown();
    info!("Simulated {ticks} ticks");
    info!("Final dashboard: {}", serde_json::to_string_pretty(&robot_loop.dashboard)?);
    Ok(())
}
