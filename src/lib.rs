//! offboard_pilot - Offboard position-control sequencer for MAVLink vehicles
//!
//! Host side of the mission: connection URL parsing, a MAVLink link with
//! background receive and setpoint streaming, gateway implementations over
//! that link, and the command-line bootstrap. The mission logic itself lives
//! in `offboard_pilot_core`.

pub mod cli;
pub mod clock;
pub mod connection;
pub mod error;
pub mod gateway;
pub mod link;
pub mod logging;

pub use clock::SystemClock;
pub use connection::ConnectionUrl;
pub use error::AppError;
pub use gateway::{ActionGateway, OffboardControl, TelemetryMonitor};
pub use link::{CommandOutcome, LinkConfig, MavLink};
