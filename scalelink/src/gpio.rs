//! Digital I/O gateway
//!
//! The control loop only sees logical levels: one input line (the button)
//! and one output line (the pulse). Adapters own pin numbering, polarity and
//! the actual hardware access.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{trace, warn};

/// Logical level of the input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    Active,
    Inactive,
}

/// Logical level of the output line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputState {
    Active,
    Inactive,
}

/// One input line and one output line
///
/// Implementations must not fail: a read error is reported as
/// [`InputState::Inactive`] and a write error is logged and dropped.
#[cfg_attr(test, mockall::automock)]
pub trait DigitalIo: Send + Sync {
    fn read_input(&self) -> InputState;

    fn set_output(&self, state: OutputState);
}

/// In-memory lines for simulation and tests
///
/// Every output change is recorded in order.
#[derive(Debug)]
pub struct MemoryIo {
    input: Mutex<InputState>,
    outputs: Mutex<Vec<OutputState>>,
}

impl MemoryIo {
    pub fn new() -> Self {
        Self {
            input: Mutex::new(InputState::Inactive),
            outputs: Mutex::new(Vec::new()),
        }
    }

    /// Drive the input line active
    pub fn press(&self) {
        *self.input.lock() = InputState::Active;
    }

    /// Drive the input line inactive
    pub fn release(&self) {
        *self.input.lock() = InputState::Inactive;
    }

    /// Current output level (inactive if never set)
    pub fn output(&self) -> OutputState {
        self.outputs
            .lock()
            .last()
            .copied()
            .unwrap_or(OutputState::Inactive)
    }

    /// Every output level set so far
    pub fn output_history(&self) -> Vec<OutputState> {
        self.outputs.lock().clone()
    }
}

impl Default for MemoryIo {
    fn default() -> Self {
        Self::new()
    }
}

impl DigitalIo for MemoryIo {
    fn read_input(&self) -> InputState {
        *self.input.lock()
    }

    fn set_output(&self, state: OutputState) {
        self.outputs.lock().push(state);
    }
}

/// Lines exported through the Linux sysfs GPIO interface
///
/// Pins must already be exported and configured (`direction` set) before use.
/// The input defaults to active-low: a button pulls the line to ground
/// against a pull-up when pressed.
#[derive(Debug)]
pub struct SysfsGpio {
    input: PathBuf,
    output: PathBuf,
    input_active_low: bool,
    output_active_low: bool,
    // Serializes writes from overlapping pulse tasks
    write_lock: Mutex<()>,
}

impl SysfsGpio {
    const SYSFS_ROOT: &'static str = "/sys/class/gpio";

    /// Use `gpio<input>` and `gpio<output>` under `/sys/class/gpio`
    pub fn new(input: u32, output: u32) -> Self {
        let root = Path::new(Self::SYSFS_ROOT);
        Self::from_paths(
            root.join(format!("gpio{}", input)).join("value"),
            root.join(format!("gpio{}", output)).join("value"),
        )
    }

    /// Use arbitrary `value` files
    pub fn from_paths(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            input_active_low: true,
            output_active_low: false,
            write_lock: Mutex::new(()),
        }
    }

    /// Treat a low input level as [`InputState::Active`] (the default)
    pub fn with_input_active_low(mut self, active_low: bool) -> Self {
        self.input_active_low = active_low;
        self
    }

    /// Drive the output low for [`OutputState::Active`]
    pub fn with_output_active_low(mut self, active_low: bool) -> Self {
        self.output_active_low = active_low;
        self
    }

    fn read_level(&self) -> io::Result<bool> {
        let value = fs::read_to_string(&self.input)?;
        match value.trim() {
            "0" => Ok(false),
            "1" => Ok(true),
            other => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unexpected gpio value {:?}", other),
            )),
        }
    }
}

impl DigitalIo for SysfsGpio {
    fn read_input(&self) -> InputState {
        match self.read_level() {
            Ok(high) if high != self.input_active_low => InputState::Active,
            Ok(_) => InputState::Inactive,
            Err(e) => {
                warn!("Failed to read {}: {}", self.input.display(), e);
                InputState::Inactive
            }
        }
    }

    fn set_output(&self, state: OutputState) {
        let high = (state == OutputState::Active) != self.output_active_low;
        let value = if high { "1" } else { "0" };

        let _guard = self.write_lock.lock();
        trace!("{} <- {}", self.output.display(), value);
        if let Err(e) = fs::write(&self.output, value) {
            warn!("Failed to write {}: {}", self.output.display(), e);
        }
    }
}
