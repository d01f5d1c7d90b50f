//! Offboard mode control and setpoint delivery.
//!
//! PX4 selects offboard through MAV_CMD_DO_SET_MODE with a custom main
//! mode. Leaving offboard switches to AUTO.LOITER so the vehicle holds
//! position.

use log::debug;
use mavlink::common::{MavCmd, MavResult};
use offboard_pilot_core::{OffboardGateway, OffboardResult, Setpoint};

use crate::link::{CommandOutcome, MavLink};

/// MAV_MODE_FLAG_CUSTOM_MODE_ENABLED
const CUSTOM_MODE_ENABLED: f32 = 1.0;
const PX4_MAIN_MODE_AUTO: f32 = 4.0;
const PX4_MAIN_MODE_OFFBOARD: f32 = 6.0;
const PX4_AUTO_SUB_MODE_LOITER: f32 = 3.0;

/// Map a mode-change exchange onto an [`OffboardResult`].
pub fn offboard_result(outcome: CommandOutcome) -> OffboardResult {
    match outcome {
        CommandOutcome::Ack(MavResult::MAV_RESULT_ACCEPTED) => OffboardResult::Success,
        CommandOutcome::Ack(MavResult::MAV_RESULT_TEMPORARILY_REJECTED) => OffboardResult::Busy,
        CommandOutcome::Ack(MavResult::MAV_RESULT_DENIED) => OffboardResult::CommandDenied,
        CommandOutcome::Ack(_) => OffboardResult::Unknown,
        CommandOutcome::NoSystem => OffboardResult::NoSystem,
        CommandOutcome::SendFailed => OffboardResult::ConnectionError,
        CommandOutcome::Timeout => OffboardResult::Timeout,
    }
}

/// [`OffboardGateway`] over a MAVLink link.
pub struct OffboardControl<'a> {
    link: &'a MavLink,
}

impl<'a> OffboardControl<'a> {
    pub fn new(link: &'a MavLink) -> Self {
        Self { link }
    }

    fn set_mode(&self, main_mode: f32, sub_mode: f32) -> OffboardResult {
        let outcome = self.link.send_command(
            MavCmd::MAV_CMD_DO_SET_MODE,
            [CUSTOM_MODE_ENABLED, main_mode, sub_mode, 0.0, 0.0, 0.0, 0.0],
        );
        debug!("DO_SET_MODE({main_mode}, {sub_mode}) -> {outcome:?}");
        offboard_result(outcome)
    }
}

impl OffboardGateway for OffboardControl<'_> {
    fn send_setpoint(&mut self, setpoint: Setpoint) {
        self.link.send_setpoint(setpoint);
    }

    fn start(&mut self) -> OffboardResult {
        if !self.link.has_setpoint() {
            return OffboardResult::NoSetpointSet;
        }
        self.set_mode(PX4_MAIN_MODE_OFFBOARD, 0.0)
    }

    fn stop(&mut self) -> OffboardResult {
        let result = self.set_mode(PX4_MAIN_MODE_AUTO, PX4_AUTO_SUB_MODE_LOITER);
        if result.is_success() {
            self.link.clear_stream();
        }
        result
    }
}
