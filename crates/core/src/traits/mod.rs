//! Core traits for platform-agnostic sequencing.
//!
//! - Trait definitions are pure and have no feature gates
//! - Mock implementations are always available for host testing
//! - Platform implementations (std time) live in the host crate

pub mod time;

pub use time::{Clock, MockClock};
