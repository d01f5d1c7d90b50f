//! Arm, land and disarm over COMMAND_LONG.

use log::debug;
use mavlink::common::{MavCmd, MavLandedState, MavResult};
use offboard_pilot_core::{ActionResult, CommandGateway};

use crate::link::{CommandOutcome, MavLink};

/// Map a command exchange onto an [`ActionResult`].
pub fn action_result(outcome: CommandOutcome) -> ActionResult {
    match outcome {
        CommandOutcome::Ack(MavResult::MAV_RESULT_ACCEPTED) => ActionResult::Success,
        CommandOutcome::Ack(MavResult::MAV_RESULT_TEMPORARILY_REJECTED) => ActionResult::Busy,
        CommandOutcome::Ack(MavResult::MAV_RESULT_DENIED) => ActionResult::CommandDenied,
        CommandOutcome::Ack(MavResult::MAV_RESULT_UNSUPPORTED) => ActionResult::Unsupported,
        CommandOutcome::Ack(MavResult::MAV_RESULT_FAILED) => ActionResult::Failed,
        CommandOutcome::Ack(_) => ActionResult::Unknown,
        CommandOutcome::NoSystem => ActionResult::NoSystem,
        CommandOutcome::SendFailed => ActionResult::ConnectionError,
        CommandOutcome::Timeout => ActionResult::Timeout,
    }
}

/// Refine a denied disarm using the landed state.
fn disarm_result(result: ActionResult, landed_state: Option<MavLandedState>) -> ActionResult {
    match (result, landed_state) {
        (ActionResult::CommandDenied, None) => ActionResult::CommandDeniedLandedStateUnknown,
        (ActionResult::CommandDenied, Some(MavLandedState::MAV_LANDED_STATE_ON_GROUND)) => {
            ActionResult::CommandDenied
        }
        (ActionResult::CommandDenied, Some(_)) => ActionResult::CommandDeniedNotLanded,
        (result, _) => result,
    }
}

/// [`CommandGateway`] over a MAVLink link.
pub struct ActionGateway<'a> {
    link: &'a MavLink,
}

impl<'a> ActionGateway<'a> {
    pub fn new(link: &'a MavLink) -> Self {
        Self { link }
    }

    fn arm_disarm(&self, arm: bool) -> ActionResult {
        let param1 = if arm { 1.0 } else { 0.0 };
        let outcome = self.link.send_command(
            MavCmd::MAV_CMD_COMPONENT_ARM_DISARM,
            [param1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        );
        debug!("ARM_DISARM({arm}) -> {outcome:?}");
        action_result(outcome)
    }
}

impl CommandGateway for ActionGateway<'_> {
    fn arm(&mut self) -> ActionResult {
        self.arm_disarm(true)
    }

    fn land(&mut self) -> ActionResult {
        // NaN position and yaw: land where we are, keep current heading
        let outcome = self.link.send_command(
            MavCmd::MAV_CMD_NAV_LAND,
            [0.0, 0.0, 0.0, f32::NAN, f32::NAN, f32::NAN, f32::NAN],
        );
        debug!("NAV_LAND -> {outcome:?}");
        action_result(outcome)
    }

    fn disarm(&mut self) -> ActionResult {
        let result = self.arm_disarm(false);
        disarm_result(result, self.link.landed_state())
    }
}
