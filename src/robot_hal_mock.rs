use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use conv::{ConvUtil, RoundToNearest};
use log::{debug, trace};
use pid::Pid;

use crate::robot_hal::{
    ActuatorGateway, EncoderId, HalError, HalResult, MotionProfile, MotorId, PresenceSensor, SensorGateway, SolenoidId,
};

/// Arm travel in encoder ticks per second at full open-loop output.
const ARM_OPEN_LOOP_RATE: f64 = 2500.0;
/// Leg travel in leg-height units per second at full output.
const LEG_RATE: f64 = 25.0;
const ARM_TRAVEL: (f64, f64) = (-400.0, 4000.0);
const CONNECTED_PULSE_PERIOD_US: f64 = 820.0;

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct ProfiledCommand {
    pub position: f64,
    pub profile: MotionProfile,
}

/// Simulated device bus. Clones share the same devices, so a test (or the
/// simulator) can keep a handle to inject sensor readings and inspect what
/// the mechanisms commanded.
#[derive(Clone, Default)]
pub struct RobotHalMock {
    bus: Rc<RefCell<MockBus>>,
}

#[derive(Default)]
struct MockBus {
    presence: HashMap<PresenceSensor, bool>,
    encoders: HashMap<EncoderId, f64>,
    pulse_widths: HashMap<EncoderId, f64>,
    disconnected: HashSet<EncoderId>,
    outputs: HashMap<MotorId, f64>,
    binaries: HashMap<SolenoidId, bool>,
    percent_writes: Vec<(MotorId, f64)>,
    profiled_writes: Vec<(MotorId, ProfiledCommand)>,
    binary_writes: Vec<(SolenoidId, bool)>,
    arm_target: Option<(ProfiledCommand, Pid<f64>)>,
}

impl RobotHalMock {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set_presence(&self, sensor: PresenceSensor, present: bool) {
        self.bus.borrow_mut().presence.insert(sensor, present);
    }

    pub fn set_encoder(&self, encoder: EncoderId, position: f64) {
        self.bus.borrow_mut().encoders.insert(encoder, position);
    }

    pub fn set_pulse_width_position(&self, encoder: EncoderId, position: f64) {
        self.bus.borrow_mut().pulse_widths.insert(encoder, position);
    }

    pub fn disconnect_encoder(&self, encoder: EncoderId) {
        self.bus.borrow_mut().disconnected.insert(encoder);
    }

    pub fn percent_output(&self, motor: MotorId) -> f64 {
        self.bus.borrow().outputs.get(&motor).copied().unwrap_or(0.0)
    }

    pub fn percent_writes(&self, motor: MotorId) -> Vec<f64> {
        self.bus.borrow().percent_writes.iter()
            .filter(|(m, _)| *m == motor)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn profiled_writes(&self, motor: MotorId) -> Vec<ProfiledCommand> {
        self.bus.borrow().profiled_writes.iter()
            .filter(|(m, _)| *m == motor)
            .map(|(_, c)| *c)
            .collect()
    }

    pub fn binary(&self, solenoid: SolenoidId) -> bool {
        self.bus.borrow().binaries.get(&solenoid).copied().unwrap_or(false)
    }

    pub fn binary_writes(&self, solenoid: SolenoidId) -> Vec<bool> {
        self.bus.borrow().binary_writes.iter()
            .filter(|(s, _)| *s == solenoid)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn clear_history(&self) {
        let mut bus = self.bus.borrow_mut();
        bus.percent_writes.clear();
        bus.profiled_writes.clear();
        bus.binary_writes.clear();
    }

    /// Advances the simulated arm and legs by `dt`.
    pub fn step(&self, dt: Duration) {
        let dt = dt.as_secs_f64();
        let mut bus = self.bus.borrow_mut();
        let arm = bus.encoders.get(&EncoderId::Arm).copied().unwrap_or(0.0);
        let arm_output = bus.outputs.get(&MotorId::ArmMaster).copied().unwrap_or(0.0);
        let velocity = match bus.arm_target.as_mut() {
            Some((command, pid)) => {
                let limit = command.profile.cruise_velocity * 10.0;
                pid.next_control_output(arm).output.clamp(-limit, limit)
            }
            None => arm_output * ARM_OPEN_LOOP_RATE,
        };
        let arm = (arm + velocity * dt).clamp(ARM_TRAVEL.0, ARM_TRAVEL.1);
        bus.encoders.insert(EncoderId::Arm, arm);

        let legs = bus.encoders.get(&EncoderId::ClimberLegs).copied().unwrap_or(0.0);
        let leg_output = bus.outputs.get(&MotorId::ClimberLegs).copied().unwrap_or(0.0);
        let legs = (legs + leg_output * LEG_RATE * dt).max(0.0);
        bus.encoders.insert(EncoderId::ClimberLegs, legs);
        trace!("sim step: arm={arm:.1}, legs={legs:.2}");
    }

    fn check_connected(&self, encoder: EncoderId) -> HalResult<()> {
        if self.bus.borrow().disconnected.contains(&encoder) {
            Err(HalError::DeviceNotConnected(format!("{encoder:?} encoder not connected")))
        } else {
            Ok(())
        }
    }
}

fn arm_pid(setpoint: f64) -> Pid<f64> {
    let limit = 1.0e6;
    Pid::new(5.0, 0.0, 0.0, limit, limit, limit, limit, setpoint)
}

fn quantize(position: f64) -> HalResult<f64> {
    position.approx_as_by::<i32, RoundToNearest>()
        .map(f64::from)
        .map_err(|e| HalError::InternalError(format!("bad encoder reading {position}: {e:?}")))
}

impl SensorGateway for RobotHalMock {
    fn presence(&self, sensor: PresenceSensor) -> HalResult<bool> {
        Ok(self.bus.borrow().presence.get(&sensor).copied().unwrap_or(false))
    }

    fn encoder_position(&self, encoder: EncoderId) -> HalResult<f64> {
        self.check_connected(encoder)?;
        quantize(self.bus.borrow().encoders.get(&encoder).copied().unwrap_or(0.0))
    }

    fn pulse_width_position(&self, encoder: EncoderId) -> HalResult<f64> {
        self.check_connected(encoder)?;
        Ok(self.bus.borrow().pulse_widths.get(&encoder).copied().unwrap_or(0.0))
    }

    fn pulse_width_rise_to_rise_us(&self, encoder: EncoderId) -> HalResult<f64> {
        if self.bus.borrow().disconnected.contains(&encoder) {
            Ok(0.0)
        } else {
            Ok(CONNECTED_PULSE_PERIOD_US)
        }
    }
}

impl ActuatorGateway for RobotHalMock {
    fn set_percent_output(&mut self, motor: MotorId, value: f64) -> HalResult<()> {
        if !(-1.0..=1.0).contains(&value) {
            return Err(HalError::OutputOutOfRange { motor, value });
        }
        trace!("set_percent_output: {motor:?} = {value}");
        let mut bus = self.bus.borrow_mut();
        bus.outputs.insert(motor, value);
        bus.percent_writes.push((motor, value));
        if motor == MotorId::ArmMaster {
            bus.arm_target = None;
        }
        Ok(())
    }

    fn set_profiled_position(&mut self, motor: MotorId, position: f64, profile: MotionProfile) -> HalResult<()> {
        trace!("set_profiled_position: {motor:?} -> {position} ({profile:?})");
        let command = ProfiledCommand { position, profile };
        let mut bus = self.bus.borrow_mut();
        bus.profiled_writes.push((motor, command));
        if motor == MotorId::ArmMaster {
            let retarget = match &bus.arm_target {
                Some((current, _)) => current.position != position,
                None => true,
            };
            if retarget {
                bus.arm_target = Some((command, arm_pid(position)));
            } else if let Some((current, _)) = bus.arm_target.as_mut() {
                current.profile = profile;
            }
        }
        Ok(())
    }

    fn set_binary(&mut self, solenoid: SolenoidId, on: bool) -> HalResult<()> {
        debug!("set_binary: {solenoid:?} = {on}");
        let mut bus = self.bus.borrow_mut();
        bus.binaries.insert(solenoid, on);
        bus.binary_writes.push((solenoid, on));
        Ok(())
    }

    fn set_encoder_position(&mut self, encoder: EncoderId, position: f64) -> HalResult<()> {
        self.check_connected(encoder)?;
        self.bus.borrow_mut().encoders.insert(encoder, position);
        Ok(())
    }
}
