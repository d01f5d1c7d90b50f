//! Mission Script and Sequencing
//!
//! A mission is a declarative, ordered list of [`WaypointStep`]s consumed by
//! the [`MissionSequencer`]. Substituting a different script does not touch
//! the state machine.
//!
//! # Mission Script
//!
//! - Fixed-capacity step list (max 32 steps)
//! - Insertion order is execution order, strictly sequential
//! - In-memory only (no persistence)
//!
//! The descent ramp that follows the script is generated, not authored; see
//! [`DescentRamp`].

pub mod config;
pub mod descent;
pub mod sequencer;
pub mod state;

use core::fmt;
use core::time::Duration;

use heapless::Vec;

use crate::setpoint::Setpoint;

pub use config::SequencerConfig;
pub use descent::DescentRamp;
pub use sequencer::{MissionReport, MissionSequencer, Vehicle};
pub use state::{MissionPhase, VehicleState};

/// Maximum number of steps in a mission script
pub const MAX_SCRIPT_STEPS: usize = 32;

/// Hover height of the illustrative offboard position script (meters)
pub const DEFAULT_HOVER_HEIGHT_M: f32 = 0.75;

/// Steps in [`MissionScript::offboard_position`]
const OFFBOARD_POSITION_STEPS: usize = 4;
const _: () = assert!(OFFBOARD_POSITION_STEPS <= MAX_SCRIPT_STEPS);

/// One scripted target and how long to hold it before the next step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaypointStep {
    /// Setpoint streamed while holding
    pub target: Setpoint,
    /// Settle time before advancing
    pub hold: Duration,
}

impl WaypointStep {
    pub const fn new(target: Setpoint, hold: Duration) -> Self {
        Self { target, hold }
    }
}

/// Errors building a mission script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptError {
    /// Script already holds [`MAX_SCRIPT_STEPS`] steps
    Full { capacity: usize },
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Full { capacity } => {
                write!(f, "Mission script full (max {} steps)", capacity)
            }
        }
    }
}

/// Ordered list of waypoint steps.
#[derive(Debug, Clone, Default)]
pub struct MissionScript {
    steps: Vec<WaypointStep, MAX_SCRIPT_STEPS>,
}

impl MissionScript {
    /// Create an empty script
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// The offboard position demo: climb in place, hover, step 0.2 m north
    /// and come back, all at `height` meters above the origin.
    pub fn offboard_position(height: f32) -> Self {
        let steps: [WaypointStep; OFFBOARD_POSITION_STEPS] = [
            WaypointStep::new(
                Setpoint::position_ned(0.0, 0.0, -0.0, 0.0),
                Duration::from_secs(1),
            ),
            WaypointStep::new(
                Setpoint::position_ned(0.0, 0.0, -height, 0.0),
                Duration::from_secs(4),
            ),
            WaypointStep::new(
                Setpoint::position_ned(0.2, 0.0, -height, 0.0),
                Duration::from_secs(2),
            ),
            WaypointStep::new(
                Setpoint::position_ned(0.0, 0.0, -height, 0.0),
                Duration::from_secs(2),
            ),
        ];
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    /// Append a step to the end of the script.
    pub fn push(&mut self, step: WaypointStep) -> Result<(), ScriptError> {
        self.steps.push(step).map_err(|_| ScriptError::Full {
            capacity: MAX_SCRIPT_STEPS,
        })
    }

    /// Builder-style [`push`](Self::push).
    pub fn then(mut self, target: Setpoint, hold: Duration) -> Result<Self, ScriptError> {
        self.push(WaypointStep::new(target, hold))?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps in execution order
    pub fn steps(&self) -> &[WaypointStep] {
        &self.steps
    }

    /// Last position target, the point the descent ramp starts from.
    pub fn last_position(&self) -> Option<Setpoint> {
        self.steps
            .iter()
            .rev()
            .map(|step| step.target)
            .find(Setpoint::is_position)
    }

    /// Sum of all hold durations
    pub fn total_hold(&self) -> Duration {
        self.steps.iter().map(|step| step.hold).sum()
    }
}
