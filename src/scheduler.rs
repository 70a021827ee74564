use std::collections::BTreeMap;

use log::{debug, error, info};

use crate::command::{Command, CommandRunner, Mechanism};
use crate::robot::Robot;

pub type CommandFactory = Box<dyn Fn() -> Box<dyn Command>>;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
pub struct CommandHandle(u64);

struct Scheduled {
    handle: CommandHandle,
    runner: CommandRunner,
}

/// Runs commands with exclusive access to the mechanisms they require.
///
/// Scheduling a command interrupts every active command sharing one of its
/// mechanisms. A mechanism left idle gets a fresh instance of its default
/// command at the start of the next tick.
pub struct CommandScheduler {
    active: Vec<Scheduled>,
    defaults: BTreeMap<Mechanism, CommandFactory>,
    next_handle: u64,
}

impl Default for CommandScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandScheduler {
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            defaults: BTreeMap::new(),
            next_handle: 0,
        }
    }

    pub fn set_default_command(&mut self, mechanism: Mechanism, factory: impl Fn() -> Box<dyn Command> + 'static) {
        self.defaults.insert(mechanism, Box::new(factory));
    }

    pub fn schedule(&mut self, robot: &mut Robot, command: Box<dyn Command>) -> CommandHandle {
        let requirements = command.requirements().to_vec();
        for scheduled in self.active.iter_mut() {
            let conflicts = scheduled.runner.requirements().iter().any(|m| requirements.contains(m));
            if conflicts && !scheduled.runner.is_done() {
                debug!("{} displaces {}", command.name(), scheduled.runner.name());
                if let Err(e) = scheduled.runner.cancel(robot) {
                    error!("Cleanup of {} failed: {e}", scheduled.runner.name());
                }
            }
        }
        self.active.retain(|s| !s.runner.is_done());

        let handle = CommandHandle(self.next_handle);
        self.next_handle += 1;
        info!("Scheduling {} on {requirements:?}", command.name());
        self.active.push(Scheduled { handle, runner: CommandRunner::new(command) });
        handle
    }

    /// Returns false when the command had already ended.
    pub fn cancel(&mut self, robot: &mut Robot, handle: CommandHandle) -> bool {
        let index = match self.active.iter().position(|s| s.handle == handle) {
            Some(index) => index,
            None => return false,
        };
        let mut scheduled = self.active.remove(index);
        if let Err(e) = scheduled.runner.cancel(robot) {
            error!("Cleanup of {} failed: {e}", scheduled.runner.name());
        }
        true
    }

    pub fn cancel_all(&mut self, robot: &mut Robot) {
        for mut scheduled in self.active.drain(..) {
            if let Err(e) = scheduled.runner.cancel(robot) {
                error!("Cleanup of {} failed: {e}", scheduled.runner.name());
            }
        }
    }

    pub fn is_scheduled(&self, handle: CommandHandle) -> bool {
        self.active.iter().any(|s| s.handle == handle)
    }

    /// Name of the command currently holding `mechanism`.
    pub fn holder_of(&self, mechanism: Mechanism) -> Option<&'static str> {
        self.active.iter()
            .find(|s| s.runner.requirements().contains(&mechanism))
            .map(|s| s.runner.name())
    }

    pub fn tick(&mut self, robot: &mut Robot) {
        for mechanism in Mechanism::ALL {
            if self.holder_of(mechanism).is_some() {
                continue;
            }
            if let Some(factory) = self.defaults.get(&mechanism) {
                let command = factory();
                if command.requirements().iter().all(|m| self.holder_of(*m).is_none()) {
                    let handle = CommandHandle(self.next_handle);
                    self.next_handle += 1;
                    debug!("Default {} resumes on {mechanism:?}", command.name());
                    self.active.push(Scheduled { handle, runner: CommandRunner::new(command) });
                }
            }
        }

        for scheduled in self.active.iter_mut() {
            if let Err(e) = scheduled.runner.tick(robot) {
                error!("{} failed: {e}", scheduled.runner.name());
            }
        }
        self.active.retain(|s| !s.runner.is_done());
    }
}
