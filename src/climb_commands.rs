//! Hab climbing maneuvers. All of them leave the wheels stopped when they end,
//! however they end.

use derive_new::new;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::command::{Command, EndReason, Mechanism, Sequence, Status};
use crate::robot::Robot;
use crate::robot_config::ClimberConfig;
use crate::robot_hal::HalResult;

const CLIMBER: &[Mechanism] = &[Mechanism::Climber];
const CLIMBER_AND_DRIVE: &[Mechanism] = &[Mechanism::Climber, Mechanism::Drivetrain];

#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
pub enum HabLevel {
    Two,
    Three,
}

/// Lifts the robot on its legs until the legs pass `target_leg_height`.
#[derive(Debug, new)]
pub struct ClimbToLevel {
    target_leg_height: f64,
}

impl ClimbToLevel {
    pub fn for_level(level: HabLevel, config: &ClimberConfig) -> Self {
        Self::new(match level {
            HabLevel::Two => config.hab2_leg_height,
            HabLevel::Three => config.hab3_leg_height,
        })
    }

    pub fn target_leg_height(&self) -> f64 {
        self.target_leg_height
    }
}

impl Command for ClimbToLevel {
    fn name(&self) -> &'static str {
        "ClimbToLevel"
    }

    fn requirements(&self) -> &[Mechanism] {
        CLIMBER
    }

    fn start(&mut self, robot: &mut Robot) -> HalResult<()> {
        info!("Climbing to leg height {}", self.target_leg_height);
        robot.climber.spin_wheels(true)?;
        robot.climber.extend_arms()?;
        robot.climber.extend_legs()
    }

    fn tick(&mut self, robot: &mut Robot) -> HalResult<Status> {
        let height = robot.climber.leg_height();
        if height > self.target_leg_height {
            debug!("Legs at {height}, past {}", self.target_leg_height);
            Ok(Status::Done)
        } else {
            Ok(Status::Running)
        }
    }

    fn cleanup(&mut self, robot: &mut Robot, _reason: EndReason) -> HalResult<()> {
        robot.climber.spin_wheels(false)
    }
}

/// Rolls forward onto the platform. Never finishes on its own.
#[derive(Debug, Default)]
pub struct DriveOntoHab;

impl Command for DriveOntoHab {
    fn name(&self) -> &'static str {
        "DriveOntoHab"
    }

    fn requirements(&self) -> &[Mechanism] {
        CLIMBER_AND_DRIVE
    }

    fn start(&mut self, robot: &mut Robot) -> HalResult<()> {
        let speed = robot.climber.config().hab_drive_speed;
        robot.climber.spin_wheels(true)?;
        robot.drivetrain.arcade_drive(speed, 0.0)
    }

    fn tick(&mut self, _robot: &mut Robot) -> HalResult<Status> {
        Ok(Status::Running)
    }

    fn cleanup(&mut self, robot: &mut Robot, _reason: EndReason) -> HalResult<()> {
        // Zero the drive even when the wheels fail to stop.
        let wheels = robot.climber.spin_wheels(false);
        robot.drivetrain.arcade_drive(0.0, 0.0)?;
        wheels
    }
}

/// Climb, then drive on. The drive stage never finishes, so the driver ends it.
pub fn auto_onto_hab(level: HabLevel, config: &ClimberConfig) -> Sequence {
    let name = match level {
        HabLevel::Two => "AutoOntoHab2",
        HabLevel::Three => "AutoOntoHab3",
    };
    Sequence::new(name, vec![
        Box::new(ClimbToLevel::for_level(level, config)) as Box<dyn Command>,
        Box::new(DriveOntoHab),
    ])
}

/// Extends the climbing arms with their wheels spinning, or retracts them with
/// the wheels stopped. The arms stay where they were put when this ends.
#[derive(Debug, new)]
pub struct ClimbingArmActivate {
    extend: bool,
}

impl Command for ClimbingArmActivate {
    fn name(&self) -> &'static str {
        "ClimbingArmActivate"
    }

    fn requirements(&self) -> &[Mechanism] {
        CLIMBER
    }

    fn start(&mut self, robot: &mut Robot) -> HalResult<()> {
        robot.climber.spin_wheels(self.extend)?;
        if self.extend {
            robot.climber.extend_arms()
        } else {
            robot.climber.retract_arms()
        }
    }

    fn tick(&mut self, _robot: &mut Robot) -> HalResult<Status> {
        Ok(Status::Running)
    }

    fn cleanup(&mut self, robot: &mut Robot, _reason: EndReason) -> HalResult<()> {
        robot.climber.spin_wheels(false)
    }
}

/// Pulls the arms and legs up once the front of the robot is on the platform
/// and keeps driving forward.
#[derive(Debug, Default)]
pub struct MakeHabOurHome;

impl Command for MakeHabOurHome {
    fn name(&self) -> &'static str {
        "MakeHabOurHome"
    }

    fn requirements(&self) -> &[Mechanism] {
        CLIMBER_AND_DRIVE
    }

    fn start(&mut self, robot: &mut Robot) -> HalResult<()> {
        let speed = robot.climber.config().hab_drive_speed;
        robot.climber.retract_arms()?;
        robot.climber.retract_legs()?;
        robot.drivetrain.arcade_drive(speed, 0.0)
    }

    fn tick(&mut self, _robot: &mut Robot) -> HalResult<Status> {
        Ok(Status::Running)
    }

    fn cleanup(&mut self, robot: &mut Robot, _reason: EndReason) -> HalResult<()> {
        robot.drivetrain.arcade_drive(0.0, 0.0)
    }
}
