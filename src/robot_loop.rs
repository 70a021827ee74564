use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use log::{info, trace, warn};
use tokio::time::MissedTickBehavior;

use crate::arm_commands::ArmDefault;
use crate::claw_commands::ClawDefault;
use crate::command::Mechanism;
use crate::dashboard::Dashboard;
use crate::drive_commands::DrivetrainTeleop;
use crate::input::InputSource;
use crate::input_translator::InputTranslator;
use crate::operator_interface::OperatorInterface;
use crate::robot::Robot;
use crate::robot_config::RobotConfig;
use crate::robot_hal::RobotHal;
use crate::scheduler::CommandScheduler;
use crate::telemetry::{RobotSnapshot, TelemetryPublisher};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Everything stepped by the tick driver, wired for competition.
pub struct RobotLoop {
    pub robot: Robot,
    pub scheduler: CommandScheduler,
    pub dashboard: Dashboard,
    translator: InputTranslator,
    oi: OperatorInterface,
    telemetry: TelemetryPublisher,
    tick: u64,
}

impl RobotLoop {
    pub fn new(config: &RobotConfig, hal_factory: impl Fn() -> Box<dyn RobotHal>) -> Self {
        let mut dashboard = Dashboard::new();
        let translator = InputTranslator::new(config.drive, config.controls, &mut dashboard);

        let mut scheduler = CommandScheduler::new();
        scheduler.set_default_command(Mechanism::Claw, || Box::new(ClawDefault));
        scheduler.set_default_command(Mechanism::Arm, || Box::new(ArmDefault));
        scheduler.set_default_command(Mechanism::Drivetrain, || Box::new(DrivetrainTeleop));

        Self {
            robot: Robot::new(config, hal_factory),
            scheduler,
            dashboard,
            translator,
            oi: OperatorInterface::standard(config),
            telemetry: TelemetryPublisher,
            tick: 0,
        }
    }

    /// One control period: intents, then button edges, then commands, then
    /// telemetry.
    pub fn step(&mut self, input: &dyn InputSource) -> RobotSnapshot {
        self.robot.intents = self.translator.translate(input, &self.dashboard);
        self.oi.poll(input, &mut self.scheduler, &mut self.robot);
        self.scheduler.tick(&mut self.robot);

        let snapshot = RobotSnapshot::capture(self.tick, &self.robot);
        if let Err(e) = self.telemetry.publish(&snapshot, &mut self.dashboard) {
            warn!("Telemetry publish failed: {e:?}");
        }
        self.tick += 1;
        snapshot
    }

    /// Ends every command (running their cleanup) and zeroes the motors.
    pub fn shutdown(&mut self) {
        info!("Disabling after {} ticks", self.tick);
        self.scheduler.cancel_all(&mut self.robot);
        if let Err(e) = self.robot.disable() {
            warn!("Could not zero every motor: {e}");
        }
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }
}

/// Calls `on_tick` once per `period` (at least 1 ms) until it breaks or
/// `shutdown` resolves. Late ticks are skipped rather than bunched up.
/// Returns the number of ticks run.
pub async fn run_ticks<F, S>(period: Duration, mut on_tick: F, shutdown: S) -> u64
where
    F: FnMut(u64) -> ControlFlow<()>,
    S: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period.max(MIN_PERIOD));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut ticks = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            _ = interval.tick() => {
                trace!("<tick {ticks}>");
                let flow = on_tick(ticks);
                ticks += 1;
                if flow.is_break() {
                    break;
                }
            }
        }
    }
    ticks
}
