//! Fail-fast policy for gateway results.
//!
//! Every checked gateway call goes through one of these functions. A
//! non-success result becomes a [`MissionError`]; the phase returns it with
//! `?` and no later phase runs. There is no retry and no rollback.

use crate::error::{CommandOp, MissionError, ModeOp};
use crate::gateway::{ActionResult, OffboardResult};

/// Accept only [`ActionResult::Success`].
pub fn ensure_action(operation: CommandOp, result: ActionResult) -> Result<(), MissionError> {
    if result.is_success() {
        Ok(())
    } else {
        Err(MissionError::Command { operation, result })
    }
}

/// Accept only [`OffboardResult::Success`].
pub fn ensure_offboard(operation: ModeOp, result: OffboardResult) -> Result<(), MissionError> {
    if result.is_success() {
        Ok(())
    } else {
        Err(MissionError::Mode { operation, result })
    }
}
