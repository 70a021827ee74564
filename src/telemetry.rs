use log::trace;
use serde::Serialize;
use serde_json::Value;

use crate::claw::{ControlMode, SpinMode, TargetMode};
use crate::dashboard::Dashboard;
use crate::drive_helper::WheelSpeeds;
use crate::height_presets::TargetHeight;
use crate::robot::Robot;
use crate::robot_hal::PresenceSensor;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClawSnapshot {
    pub target_mode: TargetMode,
    pub spin_mode: SpinMode,
    pub control_mode: ControlMode,
    pub intake_output: f64,
    pub pincer_closed: bool,
    pub hatch_left: bool,
    pub hatch_right: bool,
    pub cargo_left: bool,
    pub cargo_right: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArmSnapshot {
    pub goal_height: TargetHeight,
    pub goal_position: f64,
    pub sensed_position: Option<f64>,
    pub sensor_present: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimberSnapshot {
    pub leg_height: f64,
    pub arms_extended: bool,
    pub wheels_spinning: bool,
}

/// Read-only view of the robot taken at the end of a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotSnapshot {
    pub tick: u64,
    pub claw: ClawSnapshot,
    pub arm: ArmSnapshot,
    pub climber: ClimberSnapshot,
    pub drive: WheelSpeeds,
}

impl RobotSnapshot {
    pub fn capture(tick: u64, robot: &Robot) -> Self {
        let claw = &robot.claw;
        let arm = &robot.arm;
        let climber = &robot.climber;
        Self {
            tick,
            claw: ClawSnapshot {
                target_mode: claw.target_mode(),
                spin_mode: claw.spin_mode(),
                control_mode: claw.control_mode(),
                intake_output: claw.intake_output(),
                pincer_closed: claw.pincer_closed(),
                hatch_left: claw.sensor(PresenceSensor::HatchLeft),
                hatch_right: claw.sensor(PresenceSensor::HatchRight),
                cargo_left: claw.sensor(PresenceSensor::CargoLeft),
                cargo_right: claw.sensor(PresenceSensor::CargoRight),
            },
            arm: ArmSnapshot {
                goal_height: arm.goal_height(),
                goal_position: arm.goal_position(),
                sensed_position: arm.position(),
                sensor_present: arm.sensor_present(),
            },
            climber: ClimberSnapshot {
                leg_height: climber.leg_height(),
                arms_extended: climber.arms_extended(),
                wheels_spinning: climber.wheels_spinning(),
            },
            drive: robot.drivetrain.output(),
        }
    }
}

/// Publishes snapshots to the dashboard under the keys the drive team reads.
#[derive(Debug, Default)]
pub struct TelemetryPublisher;

impl TelemetryPublisher {
    pub fn publish(&self, snapshot: &RobotSnapshot, dashboard: &mut Dashboard) -> anyhow::Result<()> {
        let claw = &snapshot.claw;
        dashboard.put("Claw Target Mode", serde_json::to_value(claw.target_mode)?);
        dashboard.put("Claw Spin Mode", serde_json::to_value(claw.spin_mode)?);
        dashboard.put("Claw Control Mode", serde_json::to_value(claw.control_mode)?);
        dashboard.put("Claw Intake Output", claw.intake_output);
        dashboard.put("Hatch Left", claw.hatch_left);
        dashboard.put("Hatch Right", claw.hatch_right);
        dashboard.put("Cargo Left", claw.cargo_left);
        dashboard.put("Cargo Right", claw.cargo_right);

        let arm = &snapshot.arm;
        dashboard.put("Arm Goal Height", arm.goal_height.name());
        dashboard.put("Arm Goal Position", arm.goal_position);
        dashboard.put("Arm Position", arm.sensed_position.map_or(Value::Null, Value::from));
        dashboard.put("Arm Encoder Present", arm.sensor_present);

        dashboard.put("Leg Height", snapshot.climber.leg_height);
        dashboard.put("Climbing Arms Extended", snapshot.climber.arms_extended);
        dashboard.put("Drive Left", snapshot.drive.left);
        dashboard.put("Drive Right", snapshot.drive.right);

        trace!("{}", serde_json::to_string(snapshot)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::tests::mock_robot;
    use crate::robot_hal::EncoderId;

    #[test]
    fn test_snapshot_reflects_mechanisms() {
        let (mut robot, hal) = mock_robot();
        hal.set_presence(PresenceSensor::HatchLeft, true);
        hal.set_encoder(EncoderId::Arm, 420.0);
        hal.set_encoder(EncoderId::ClimberLegs, 3.0);
        robot.arm.set_preset_height(TargetHeight::RocketMid, false);
        robot.drivetrain.tank_drive(1.0, 1.0).unwrap();

        let snapshot = RobotSnapshot::capture(7, &robot);
        assert_eq!(snapshot.tick, 7);
        assert!(snapshot.claw.hatch_left);
        assert!(!snapshot.claw.hatch_right);
        assert_eq!(snapshot.arm.goal_height, TargetHeight::RocketMid);
        assert_eq!(snapshot.arm.sensed_position, Some(420.0));
        assert_eq!(snapshot.climber.leg_height, 3.0);
        assert_eq!(snapshot.drive, WheelSpeeds::new(1.0, 1.0));
    }

    #[test]
    fn test_publish_writes_dashboard_keys() {
        let (robot, _) = mock_robot();
        let mut dashboard = Dashboard::new();
        let snapshot = RobotSnapshot::capture(0, &robot);
        TelemetryPublisher.publish(&snapshot, &mut dashboard).unwrap();
        assert_eq!(dashboard.get_string("Claw Target Mode", ""), "CARGO");
        assert_eq!(dashboard.get_string("Claw Spin Mode", ""), "STOP");
        assert_eq!(dashboard.get_string("Arm Goal Height", ""), "GROUND");
        assert_eq!(dashboard.get_number("Arm Position", -1.0), 0.0);
        assert!(!dashboard.get_bool("Climbing Arms Extended", true));
    }
}
