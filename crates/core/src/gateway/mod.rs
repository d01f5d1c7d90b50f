//! External Gateway Contracts
//!
//! The sequencer drives the vehicle only through these three traits. The
//! host crate implements them over a MAVLink link; tests implement them with
//! recording fakes. Implementations run their own background I/O and expose
//! synchronous calls that return the latest cached values.

pub mod health;
pub mod result;

pub use health::HealthFlags;
pub use result::{ActionResult, OffboardResult};

use crate::setpoint::Setpoint;

/// Vehicle commands that report a result code per call.
pub trait CommandGateway {
    /// Arm the motors.
    fn arm(&mut self) -> ActionResult;

    /// Land at the current position.
    fn land(&mut self) -> ActionResult;

    /// Disarm the motors.
    fn disarm(&mut self) -> ActionResult;
}

/// External-setpoint ("offboard") control channel.
pub trait OffboardGateway {
    /// Deliver a setpoint. Fire-and-forget: no result is reported.
    fn send_setpoint(&mut self, setpoint: Setpoint);

    /// Switch the vehicle into offboard mode.
    ///
    /// Must fail with [`OffboardResult::NoSetpointSet`] if no setpoint has
    /// been sent yet.
    fn start(&mut self) -> OffboardResult;

    /// Leave offboard mode.
    fn stop(&mut self) -> OffboardResult;
}

/// Polled vehicle status.
pub trait TelemetryGateway {
    /// Current health flags.
    fn health(&self) -> HealthFlags;

    /// Whether the vehicle is airborne.
    fn in_air(&self) -> bool;
}
