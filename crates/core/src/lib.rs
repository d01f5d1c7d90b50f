//! offboard_pilot_core - Pure no_std sequencing logic for offboard_pilot
//!
//! This crate contains the offboard mission state machine and the types it
//! works with. It can be tested on host without any transport.
//!
//! # Design Principles
//!
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Vehicle gateways and time injected via traits
//! - **Fail fast**: Phase functions return `Result`, one caller decides how
//!   to terminate
//!
//! # Modules
//!
//! - [`traits`]: Clock abstraction and its mock
//! - [`setpoint`]: Position and velocity targets
//! - [`gateway`]: Command, offboard and telemetry gateway contracts
//! - [`mission`]: Mission script, descent ramp and sequencer
//! - [`policy`]: Result-code checks that turn failures into errors
//! - [`error`]: Mission error types

#![no_std]

pub mod error;
pub mod gateway;
pub mod mission;
pub mod policy;
pub mod setpoint;
pub mod traits;

pub use error::{CommandOp, MissionError, ModeOp};
pub use gateway::{
    ActionResult, CommandGateway, HealthFlags, OffboardGateway, OffboardResult, TelemetryGateway,
};
pub use mission::{
    DescentRamp, MissionPhase, MissionReport, MissionScript, MissionSequencer, SequencerConfig,
    Vehicle, WaypointStep,
};
pub use setpoint::{Setpoint, SetpointFrame};
