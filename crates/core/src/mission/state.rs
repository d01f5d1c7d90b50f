//! Mission State Types
//!
//! The sequencer's position in the flight script. The vehicle's own state is
//! never read back; [`VehicleState`] is derived from the phase reached.

use core::fmt;

/// Phase of the offboard mission, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MissionPhase {
    /// Priming the setpoint stream
    #[default]
    Init,
    /// Reading vehicle health
    Preflight,
    /// Arming
    Arm,
    /// Switching to offboard control
    StartOffboard,
    /// Flying the mission script
    Waypoints,
    /// Streaming the descent ramp
    Descent,
    /// Commanding land
    Land,
    /// Waiting for the vehicle to report on ground
    WaitGrounded,
    /// Best-effort disarm
    Disarm,
    /// Mission completed
    Done,
    /// Mission stopped after a fatal error
    Aborted,
}

impl MissionPhase {
    /// Log tag for this phase
    pub fn name(self) -> &'static str {
        match self {
            MissionPhase::Init => "Init",
            MissionPhase::Preflight => "Preflight",
            MissionPhase::Arm => "Arm",
            MissionPhase::StartOffboard => "Offboard",
            MissionPhase::Waypoints => "NED",
            MissionPhase::Descent => "Descent",
            MissionPhase::Land => "Land",
            MissionPhase::WaitGrounded => "Landing",
            MissionPhase::Disarm => "Disarm",
            MissionPhase::Done => "Done",
            MissionPhase::Aborted => "Aborted",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MissionPhase::Done | MissionPhase::Aborted)
    }

    /// Vehicle state implied by having entered this phase.
    ///
    /// `Aborted` has no implied state, the vehicle may be anywhere.
    pub fn vehicle_state(self) -> Option<VehicleState> {
        match self {
            MissionPhase::Init | MissionPhase::Preflight | MissionPhase::Arm => {
                Some(VehicleState::Connected)
            }
            MissionPhase::StartOffboard => Some(VehicleState::Armed),
            MissionPhase::Waypoints | MissionPhase::Descent | MissionPhase::Land => {
                Some(VehicleState::OffboardActive)
            }
            MissionPhase::WaitGrounded | MissionPhase::Disarm => Some(VehicleState::Landing),
            MissionPhase::Done => Some(VehicleState::Disarmed),
            MissionPhase::Aborted => None,
        }
    }
}

impl fmt::Display for MissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Conceptual vehicle state, owned by the vehicle and observed only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VehicleState {
    Disconnected,
    Connected,
    Armed,
    OffboardActive,
    Landing,
    Disarmed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mission_phase_default() {
        assert_eq!(MissionPhase::default(), MissionPhase::Init);
    }

    #[test]
    fn test_terminal_phases() {
        assert!(MissionPhase::Done.is_terminal());
        assert!(MissionPhase::Aborted.is_terminal());
        assert!(!MissionPhase::WaitGrounded.is_terminal());
    }

    #[test]
    fn test_vehicle_state_progression() {
        assert_eq!(
            MissionPhase::Arm.vehicle_state(),
            Some(VehicleState::Connected)
        );
        assert_eq!(
            MissionPhase::StartOffboard.vehicle_state(),
            Some(VehicleState::Armed)
        );
        assert_eq!(
            MissionPhase::Descent.vehicle_state(),
            Some(VehicleState::OffboardActive)
        );
        assert_eq!(
            MissionPhase::Done.vehicle_state(),
            Some(VehicleState::Disarmed)
        );
        assert_eq!(MissionPhase::Aborted.vehicle_state(), None);
    }
}
