use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discrete game piece sensors mounted on the claw.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PresenceSensor {
    HatchLeft,
    HatchRight,
    CargoLeft,
    CargoRight,
}

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncoderId {
    Arm,
    ClimberLegs,
}

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MotorId {
    ClawIntake,
    ArmMaster,
    ClimberLegs,
    ClimberWheels,
    DriveLeft,
    DriveRight,
}

#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolenoidId {
    ClawPincer,
    ClimberArms,
}

/// Velocity/acceleration bounds handed to the motor controller for a
/// motion-profiled move. Units are encoder ticks per 100ms (and per 100ms/s).
#[derive(Debug, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct MotionProfile {
    pub cruise_velocity: f64,
    pub acceleration: f64,
}

#[derive(Error, PartialEq, Clone, Debug)]
pub enum HalError {
    #[error("{0}")]
    DeviceNotConnected(String),
    #[error("{0}")]
    InternalError(String),
    #[error("output {value} out of range for {motor:?}")]
    OutputOutOfRange { motor: MotorId, value: f64 },
}

pub type HalResult<T> = Result<T, HalError>;

/// Read side of the vendor device layer. Presence is reported logically
/// (true means a piece is seen), regardless of the sensor's electrical polarity.
pub trait SensorGateway {
    fn presence(&self, sensor: PresenceSensor) -> HalResult<bool>;
    fn encoder_position(&self, encoder: EncoderId) -> HalResult<f64>;
    /// Absolute position from the encoder's pulse-width output, used for zeroing.
    fn pulse_width_position(&self, encoder: EncoderId) -> HalResult<f64>;
    /// Zero when no encoder is plugged in.
    fn pulse_width_rise_to_rise_us(&self, encoder: EncoderId) -> HalResult<f64>;
}

/// Write side of the vendor device layer.
pub trait ActuatorGateway {
    /// `value` must be within [-1, 1].
    fn set_percent_output(&mut self, motor: MotorId, value: f64) -> HalResult<()>;
    fn set_profiled_position(&mut self, motor: MotorId, position: f64, profile: MotionProfile) -> HalResult<()>;
    fn set_binary(&mut self, solenoid: SolenoidId, on: bool) -> HalResult<()>;
    fn set_encoder_position(&mut self, encoder: EncoderId, position: f64) -> HalResult<()>;
}

pub trait RobotHal: SensorGateway + ActuatorGateway {}

impl<T: SensorGateway + ActuatorGateway> RobotHal for T {}
