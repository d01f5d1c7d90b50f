//! Gateway Result Codes
//!
//! Closed result enumerations reported by the command and external-control
//! gateways. Each value has a human-readable description used in failure
//! messages.

use core::fmt;

/// Result of a vehicle command (arm, land, disarm).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionResult {
    /// Command accepted by the vehicle
    Success,
    /// No vehicle has been discovered on the link
    NoSystem,
    /// The link failed while sending the command
    ConnectionError,
    /// Vehicle is busy, retry later
    Busy,
    /// Vehicle rejected the command
    CommandDenied,
    /// Rejected because the landed state is not yet known
    CommandDeniedLandedStateUnknown,
    /// Rejected because the vehicle is not landed
    CommandDeniedNotLanded,
    /// No acknowledgement within the retry budget
    Timeout,
    /// Vehicle does not support the command
    Unsupported,
    /// Vehicle accepted the command but execution failed
    Failed,
    /// Unrecognized result
    Unknown,
}

impl ActionResult {
    pub fn is_success(self) -> bool {
        self == ActionResult::Success
    }

    /// Human-readable description.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionResult::Success => "Success",
            ActionResult::NoSystem => "No system",
            ActionResult::ConnectionError => "Connection error",
            ActionResult::Busy => "Busy",
            ActionResult::CommandDenied => "Command denied",
            ActionResult::CommandDeniedLandedStateUnknown => {
                "Command denied, landed state is unknown"
            }
            ActionResult::CommandDeniedNotLanded => "Command denied, not landed",
            ActionResult::Timeout => "Timeout",
            ActionResult::Unsupported => "Command not supported",
            ActionResult::Failed => "Command failed",
            ActionResult::Unknown => "Unknown error",
        }
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an external-control ("offboard") mode change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OffboardResult {
    /// Mode change accepted
    Success,
    /// No vehicle has been discovered on the link
    NoSystem,
    /// The link failed while sending the command
    ConnectionError,
    /// Vehicle is busy, retry later
    Busy,
    /// Vehicle rejected the mode change
    CommandDenied,
    /// No acknowledgement within the retry budget
    Timeout,
    /// `start()` requested before any setpoint was sent
    NoSetpointSet,
    /// Unrecognized result
    Unknown,
}

impl OffboardResult {
    pub fn is_success(self) -> bool {
        self == OffboardResult::Success
    }

    /// Human-readable description.
    pub fn as_str(self) -> &'static str {
        match self {
            OffboardResult::Success => "Success",
            OffboardResult::NoSystem => "No system",
            OffboardResult::ConnectionError => "Connection error",
            OffboardResult::Busy => "Busy",
            OffboardResult::CommandDenied => "Command denied",
            OffboardResult::Timeout => "Timeout",
            OffboardResult::NoSetpointSet => "No setpoint set",
            OffboardResult::Unknown => "Unknown error",
        }
    }
}

impl fmt::Display for OffboardResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
