//! Mission Error Types
//!
//! Every fatal outcome of a mission phase. The sequencer returns these
//! instead of terminating; the caller owns the single exit path.

use core::fmt;

use crate::gateway::{ActionResult, OffboardResult};

/// Vehicle command issued through the command gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOp {
    Arm,
    Land,
    Disarm,
}

impl CommandOp {
    /// Failure message prefix, e.g. "Arming failed".
    pub fn failure_message(self) -> &'static str {
        match self {
            CommandOp::Arm => "Arming failed",
            CommandOp::Land => "Landing failed",
            CommandOp::Disarm => "Disarming failed",
        }
    }
}

/// Mode change issued through the external-control gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeOp {
    StartOffboard,
    StopOffboard,
}

impl ModeOp {
    pub fn failure_message(self) -> &'static str {
        match self {
            ModeOp::StartOffboard => "Offboard start failed",
            ModeOp::StopOffboard => "Offboard stop failed",
        }
    }
}

/// Errors that abort a mission.
#[derive(Debug, Clone, PartialEq)]
pub enum MissionError {
    /// Arm, land or disarm was not accepted
    Command {
        operation: CommandOp,
        result: ActionResult,
    },
    /// Offboard mode change was not accepted
    Mode {
        operation: ModeOp,
        result: OffboardResult,
    },
    /// Required pre-flight health check did not pass
    Preflight {
        /// Human-readable reason for failure
        reason: &'static str,
    },
    /// Vehicle still reported in air when the landing wait expired
    LandingTimeout {
        /// Time spent waiting (ms)
        waited_ms: u64,
    },
}

impl fmt::Display for MissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionError::Command { operation, result } => {
                write!(f, "{}: {}", operation.failure_message(), result)
            }
            MissionError::Mode { operation, result } => {
                write!(f, "{}: {}", operation.failure_message(), result)
            }
            MissionError::Preflight { reason } => {
                write!(f, "Pre-flight check failed: {}", reason)
            }
            MissionError::LandingTimeout { waited_ms } => {
                write!(
                    f,
                    "Landing timed out: still in air after {:.1} s",
                    *waited_ms as f32 / 1000.0
                )
            }
        }
    }
}

impl core::error::Error for MissionError {}
