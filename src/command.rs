use log::{debug, info, warn};
use serde::Serialize;

use crate::robot::Robot;
use crate::robot_hal::{HalError, HalResult};

/// Exclusively owned robot resources. At most one scheduled command holds
/// each one at a time.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Serialize)]
pub enum Mechanism {
    Claw,
    Arm,
    Climber,
    Drivetrain,
}

impl Mechanism {
    pub const ALL: [Mechanism; 4] = [
        Mechanism::Claw,
        Mechanism::Arm,
        Mechanism::Climber,
        Mechanism::Drivetrain,
    ];
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Status {
    Running,
    Done,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Lifecycle {
    NotStarted,
    Running,
    Done,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum EndReason {
    /// `tick` reported `Done`.
    Finished,
    /// Cancelled, or displaced by a command needing the same mechanism.
    Interrupted,
    /// `start` or `tick` returned an error.
    Faulted,
}

/// A unit of robot behavior stepped once per scheduler tick. Implementations
/// never block.
pub trait Command {
    fn name(&self) -> &'static str;

    fn requirements(&self) -> &[Mechanism];

    fn start(&mut self, _robot: &mut Robot) -> HalResult<()> {
        Ok(())
    }

    fn tick(&mut self, robot: &mut Robot) -> HalResult<Status>;

    /// Called exactly once after a started command ends, whatever the reason.
    /// Never called for a command that was cancelled before it started.
    fn cleanup(&mut self, _robot: &mut Robot, _reason: EndReason) -> HalResult<()> {
        Ok(())
    }
}

/// Drives a command through NotStarted -> Running -> Done, owning the
/// guarantee that cleanup runs once.
pub struct CommandRunner {
    command: Box<dyn Command>,
    lifecycle: Lifecycle,
}

impl CommandRunner {
    pub fn new(command: Box<dyn Command>) -> Self {
        Self { command, lifecycle: Lifecycle::NotStarted }
    }

    pub fn name(&self) -> &'static str {
        self.command.name()
    }

    pub fn requirements(&self) -> &[Mechanism] {
        self.command.requirements()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_done(&self) -> bool {
        self.lifecycle == Lifecycle::Done
    }

    /// The first call starts the command and ticks it in the same step. An
    /// error leaves the runner Done with cleanup already performed.
    pub fn tick(&mut self, robot: &mut Robot) -> HalResult<Lifecycle> {
        match self.lifecycle {
            Lifecycle::Done => return Ok(Lifecycle::Done),
            Lifecycle::NotStarted => {
                debug!("Starting {}", self.name());
                self.lifecycle = Lifecycle::Running;
                if let Err(e) = self.command.start(robot) {
                    return Err(self.fault(robot, e));
                }
            }
            Lifecycle::Running => (),
        }

        match self.command.tick(robot) {
            Ok(Status::Running) => Ok(Lifecycle::Running),
            Ok(Status::Done) => {
                self.finish(robot, EndReason::Finished)?;
                Ok(Lifecycle::Done)
            }
            Err(e) => Err(self.fault(robot, e)),
        }
    }

    /// Ends the command now. A command that never started is simply
    /// discarded.
    pub fn cancel(&mut self, robot: &mut Robot) -> HalResult<()> {
        match self.lifecycle {
            Lifecycle::Running => self.finish(robot, EndReason::Interrupted),
            Lifecycle::NotStarted => {
                self.lifecycle = Lifecycle::Done;
                Ok(())
            }
            Lifecycle::Done => Ok(()),
        }
    }

    fn fault(&mut self, robot: &mut Robot, error: HalError) -> HalError {
        if let Err(cleanup_error) = self.finish(robot, EndReason::Faulted) {
            warn!("{} cleanup also failed: {cleanup_error}", self.name());
        }
        error
    }

    fn finish(&mut self, robot: &mut Robot, reason: EndReason) -> HalResult<()> {
        // Marked Done before cleanup so a failing cleanup is never retried.
        self.lifecycle = Lifecycle::Done;
        match reason {
            EndReason::Finished => info!("{} finished", self.name()),
            EndReason::Interrupted => info!("{} interrupted", self.name()),
            EndReason::Faulted => warn!("{} faulted", self.name()),
        }
        self.command.cleanup(robot, reason)
    }
}

/// Runs stages strictly in order. Each stage starts on the tick after its
/// predecessor finishes; the sequence is Done after its last stage is.
pub struct Sequence {
    name: &'static str,
    stages: Vec<CommandRunner>,
    current: usize,
    requirements: Vec<Mechanism>,
}

impl Sequence {
    pub fn new(name: &'static str, stages: Vec<Box<dyn Command>>) -> Self {
        let mut requirements: Vec<Mechanism> = stages.iter()
            .flat_map(|s| s.requirements().iter().copied())
            .collect();
        requirements.sort();
        requirements.dedup();
        Self {
            name,
            stages: stages.into_iter().map(CommandRunner::new).collect(),
            current: 0,
            requirements,
        }
    }

    /// Index of the stage currently running (equal to the stage count once
    /// all are done).
    pub fn current_stage(&self) -> usize {
        self.current
    }
}

impl Command for Sequence {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requirements(&self) -> &[Mechanism] {
        &self.requirements
    }

    fn tick(&mut self, robot: &mut Robot) -> HalResult<Status> {
        let stage = match self.stages.get_mut(self.current) {
            Some(stage) => stage,
            None => return Ok(Status::Done),
        };
        if stage.tick(robot)? == Lifecycle::Done {
            self.current += 1;
            if self.current == self.stages.len() {
                return Ok(Status::Done);
            }
        }
        Ok(Status::Running)
    }

    fn cleanup(&mut self, robot: &mut Robot, _reason: EndReason) -> HalResult<()> {
        match self.stages.get_mut(self.current) {
            Some(stage) => stage.cancel(robot),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::robot::tests::mock_robot;

    /// Records lifecycle calls into a shared log; finishes after `ticks_to_finish` ticks.
    pub(crate) struct Probe {
        pub name: &'static str,
        pub requirements: Vec<Mechanism>,
        pub ticks_to_finish: Option<usize>,
        pub fail_on_tick: Option<usize>,
        pub ticks: usize,
        pub log: Rc<RefCell<Vec<String>>>,
    }

    impl Probe {
        pub(crate) fn new(name: &'static str, requirements: &[Mechanism], log: &Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                name,
                requirements: requirements.to_vec(),
                ticks_to_finish: None,
                fail_on_tick: None,
                ticks: 0,
                log: log.clone(),
            }
        }

        pub(crate) fn finishing_after(mut self, ticks: usize) -> Self {
            self.ticks_to_finish = Some(ticks);
            self
        }

        pub(crate) fn failing_on(mut self, tick: usize) -> Self {
            self.fail_on_tick = Some(tick);
            self
        }
    }

    impl Command for Probe {
        fn name(&self) -> &'static str {
            self.name
        }

        fn requirements(&self) -> &[Mechanism] {
            &self.requirements
        }

        fn start(&mut self, _robot: &mut Robot) -> HalResult<()> {
            self.log.borrow_mut().push(format!("{}:start", self.name));
            Ok(())
        }

        fn tick(&mut self, _robot: &mut Robot) -> HalResult<Status> {
            self.ticks += 1;
            self.log.borrow_mut().push(format!("{}:tick{}", self.name, self.ticks));
            if self.fail_on_tick == Some(self.ticks) {
                return Err(HalError::InternalError("probe failure".to_owned()));
            }
            match self.ticks_to_finish {
                Some(n) if self.ticks >= n => Ok(Status::Done),
                _ => Ok(Status::Running),
            }
        }

        fn cleanup(&mut self, _robot: &mut Robot, reason: EndReason) -> HalResult<()> {
            self.log.borrow_mut().push(format!("{}:cleanup:{reason:?}", self.name));
            Ok(())
        }
    }

    fn entries(log: &Rc<RefCell<Vec<String>>>) -> Vec<String> {
        log.borrow().clone()
    }

    #[test]
    fn test_runner_starts_and_ticks_on_first_step() {
        let (mut robot, _) = mock_robot();
        let log = Rc::default();
        let mut runner = CommandRunner::new(Box::new(Probe::new("p", &[], &log).finishing_after(2)));
        assert_eq!(runner.lifecycle(), Lifecycle::NotStarted);
        assert_eq!(runner.tick(&mut robot), Ok(Lifecycle::Running));
        assert_eq!(runner.tick(&mut robot), Ok(Lifecycle::Done));
        assert_eq!(runner.tick(&mut robot), Ok(Lifecycle::Done));
        assert_eq!(entries(&log), vec!["p:start", "p:tick1", "p:tick2", "p:cleanup:Finished"]);
    }

    #[test]
    fn test_cancel_cleans_up_once() {
        let (mut robot, _) = mock_robot();
        let log = Rc::default();
        let mut runner = CommandRunner::new(Box::new(Probe::new("p", &[], &log)));
        runner.tick(&mut robot).unwrap();
        runner.cancel(&mut robot).unwrap();
        runner.cancel(&mut robot).unwrap();
        assert_eq!(runner.tick(&mut robot), Ok(Lifecycle::Done));
        assert_eq!(entries(&log), vec!["p:start", "p:tick1", "p:cleanup:Interrupted"]);
    }

    #[test]
    fn test_cancel_before_start_skips_cleanup() {
        let (mut robot, _) = mock_robot();
        let log = Rc::default();
        let mut runner = CommandRunner::new(Box::new(Probe::new("p", &[], &log)));
        runner.cancel(&mut robot).unwrap();
        assert!(runner.is_done());
        runner.tick(&mut robot).unwrap();
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn test_failed_tick_faults_and_cleans_up() {
        let (mut robot, _) = mock_robot();
        let log = Rc::default();
        let mut runner = CommandRunner::new(Box::new(Probe::new("p", &[], &log).failing_on(1)));
        assert!(runner.tick(&mut robot).is_err());
        assert!(runner.is_done());
        runner.cancel(&mut robot).unwrap();
        assert_eq!(entries(&log), vec!["p:start", "p:tick1", "p:cleanup:Faulted"]);
    }

    #[test]
    fn test_sequence_runs_stages_in_order() {
        let (mut robot, _) = mock_robot();
        let log = Rc::default();
        let mut runner = CommandRunner::new(Box::new(Sequence::new("seq", vec![
            Box::new(Probe::new("a", &[Mechanism::Climber], &log).finishing_after(1)) as Box<dyn Command>,
            Box::new(Probe::new("b", &[Mechanism::Drivetrain], &log).finishing_after(2)) as Box<dyn Command>,
        ])));
        assert_eq!(runner.requirements(), &[Mechanism::Climber, Mechanism::Drivetrain]);

        assert_eq!(runner.tick(&mut robot), Ok(Lifecycle::Running));
        assert_eq!(runner.tick(&mut robot), Ok(Lifecycle::Running));
        assert_eq!(runner.tick(&mut robot), Ok(Lifecycle::Done));
        assert_eq!(entries(&log), vec![
            "a:start", "a:tick1", "a:cleanup:Finished",
            "b:start", "b:tick1", "b:tick2", "b:cleanup:Finished",
        ]);
    }

    #[test]
    fn test_interrupted_sequence_cancels_current_stage_only() {
        let (mut robot, _) = mock_robot();
        let log = Rc::default();
        let mut runner = CommandRunner::new(Box::new(Sequence::new("seq", vec![
            Box::new(Probe::new("a", &[], &log).finishing_after(1)) as Box<dyn Command>,
            Box::new(Probe::new("b", &[], &log)) as Box<dyn Command>,
            Box::new(Probe::new("c", &[], &log)) as Box<dyn Command>,
        ])));
        runner.tick(&mut robot).unwrap();
        runner.tick(&mut robot).unwrap();
        runner.cancel(&mut robot).unwrap();
        assert_eq!(entries(&log), vec![
            "a:start", "a:tick1", "a:cleanup:Finished",
            "b:start", "b:tick1", "b:cleanup:Interrupted",
        ]);
    }

    #[test]
    fn test_empty_sequence_is_done_immediately() {
        let (mut robot, _) = mock_robot();
        let mut runner = CommandRunner::new(Box::new(Sequence::new("empty", vec![])));
        assert_eq!(runner.tick(&mut robot), Ok(Lifecycle::Done));
    }
}
