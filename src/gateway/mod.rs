//! Vehicle gateways backed by a [`MavLink`](crate::link::MavLink).
//!
//! Each gateway borrows the link and implements one of the core gateway
//! traits, translating calls into COMMAND_LONG exchanges or cached
//! telemetry reads.

pub mod action;
pub mod offboard;
pub mod telemetry;

pub use action::{action_result, ActionGateway};
pub use offboard::{offboard_result, OffboardControl};
pub use telemetry::TelemetryMonitor;
