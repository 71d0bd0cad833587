use crate::definitions::Address;
use crate::parse::{assemble, AssemblyError};
use crate::util::to_hex;
use cpu::{Cpu, CpuError, Status};

use std::error::Error;
use std::fmt;
use std::ops::ControlFlow;

use log::{debug, warn};

pub mod cpu;

#[derive(Debug, PartialEq, Eq)]
pub enum SessionError {
    Assembly(AssemblyError),
    Execution {
        pc: Address,
        line_idx: Option<usize>,
        error: CpuError,
    },
    StepLimitExceeded(u64),
}

impl From<AssemblyError> for SessionError {
    fn from(e: AssemblyError) -> Self {
        Self::Assembly(e)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Assembly(e) => write!(f, "{}", e),
            Self::Execution {
                pc,
                line_idx: Some(line_idx),
                error,
            } => write!(f, "Line {}: {} (pc = {})", line_idx + 1, error, to_hex(*pc)),
            Self::Execution {
                pc,
                line_idx: None,
                error,
            } => write!(f, "{} (pc = {})", error, to_hex(*pc)),
            Self::StepLimitExceeded(limit) => {
                write!(f, "Program did not halt within {} steps", limit)
            }
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Assembly(e) => Some(e),
            Self::Execution { error, .. } => Some(error),
            Self::StepLimitExceeded(_) => None,
        }
    }
}

pub type SessionResult<T = ()> = Result<T, SessionError>;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum RunOutcome {
    Halted,
    /// the scheduler asked to stop, the program stays loaded
    Cancelled,
    /// the step budget of a resume ran out before the program halted
    Paused,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct RunSummary {
    pub steps: u64,
    pub outcome: RunOutcome,
}

/// The control surface around a cpu: reset, assemble and run or single step
///
/// A program stays loaded until it halts or fails. The next trigger after that starts
/// from a fresh reset, but the final machine state can still be inspected until then.
#[derive(Debug, Default)]
pub struct Session {
    cpu: Cpu,
    loaded: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.cpu.reset();
        self.loaded = false;
    }

    /// Reset, then assemble and load the program. Nothing stays loaded if assembling fails
    pub fn load(&mut self, source: &str) -> SessionResult {
        self.reset();
        let program = assemble(source)?;
        debug!("loaded program with {} instructions", program.len());
        self.cpu.load(program);
        self.loaded = true;
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn step_loaded(&mut self) -> SessionResult<Status> {
        match self.cpu.step() {
            Ok(Status::Halted) => {
                debug!("program halted at {}", to_hex(self.cpu.registers().pc()));
                self.loaded = false;
                Ok(Status::Halted)
            }
            Ok(Status::Continuing) => Ok(Status::Continuing),
            Err(error) => {
                let pc = self.cpu.registers().pc();
                let line_idx = self.cpu.current_line();
                warn!("execution failed at {}: {}", to_hex(pc), error);
                self.loaded = false;
                Err(SessionError::Execution {
                    pc,
                    line_idx,
                    error,
                })
            }
        }
    }

    /// Assemble if nothing is loaded, then perform exactly one step
    ///
    /// `source` is only read when nothing is loaded. After editing the source of a
    /// loaded program, call `load` or `reset` first, otherwise the old program keeps running.
    pub fn single_step(&mut self, source: &str) -> SessionResult<Status> {
        if !self.loaded {
            self.load(source)?;
        }
        self.step_loaded()
    }

    /// Reset, assemble and step until the program halts
    ///
    /// `between_steps` is called before every step. It can feed the keyboard, render the
    /// display or break to cancel the run.
    pub fn run<F>(
        &mut self,
        source: &str,
        limit: Option<u64>,
        between_steps: F,
    ) -> SessionResult<RunSummary>
    where
        F: FnMut(&mut Cpu) -> ControlFlow<()>,
    {
        self.load(source)?;
        self.drive(limit, between_steps)
    }

    /// Perform up to `max_steps` steps of the loaded program
    pub fn resume(&mut self, max_steps: u64) -> SessionResult<RunSummary> {
        let mut steps = 0;
        while self.loaded && steps < max_steps {
            if self.step_loaded()? == Status::Continuing {
                steps += 1;
            }
        }

        let outcome = if self.loaded {
            RunOutcome::Paused
        } else {
            RunOutcome::Halted
        };
        Ok(RunSummary { steps, outcome })
    }

    fn drive<F>(&mut self, limit: Option<u64>, mut between_steps: F) -> SessionResult<RunSummary>
    where
        F: FnMut(&mut Cpu) -> ControlFlow<()>,
    {
        let mut steps = 0;
        loop {
            if between_steps(&mut self.cpu).is_break() {
                debug!("run cancelled after {} steps", steps);
                return Ok(RunSummary {
                    steps,
                    outcome: RunOutcome::Cancelled,
                });
            }

            if let Some(limit) = limit {
                if steps >= limit && !self.cpu.is_halted() {
                    warn!("program did not halt within {} steps", limit);
                    self.loaded = false;
                    return Err(SessionError::StepLimitExceeded(limit));
                }
            }

            match self.step_loaded()? {
                Status::Continuing => steps += 1,
                Status::Halted => {
                    return Ok(RunSummary {
                        steps,
                        outcome: RunOutcome::Halted,
                    })
                }
            }
        }
    }

    /// Queue a key for the program, false if the keyboard buffer was full
    pub fn push_key(&mut self, key: u8) -> bool {
        self.cpu.push_key(key)
    }

    pub fn current_line(&self) -> Option<usize> {
        self.cpu.current_line()
    }

    pub fn display_text(&self) -> String {
        self.cpu.display().text()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }
}
