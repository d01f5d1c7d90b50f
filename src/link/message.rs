//! Outgoing message builders.

use mavlink::common::{
    MavAutopilot, MavCmd, MavFrame, MavMessage, MavModeFlag, MavState, MavType,
    PositionTargetTypemask, COMMAND_LONG_DATA, HEARTBEAT_DATA, SET_POSITION_TARGET_LOCAL_NED_DATA,
};
use offboard_pilot_core::{Setpoint, SetpointFrame};

use super::state::Target;

/// Use position and yaw; ignore velocity, acceleration and yaw rate.
pub const POSITION_TYPE_MASK: u16 = 0x09F8;
/// Use velocity and yaw; ignore position, acceleration and yaw rate.
pub const VELOCITY_TYPE_MASK: u16 = 0x09C7;

/// Ground station heartbeat announcing our presence.
pub fn gcs_heartbeat() -> MavMessage {
    MavMessage::HEARTBEAT(HEARTBEAT_DATA {
        custom_mode: 0,
        mavtype: MavType::MAV_TYPE_GCS,
        autopilot: MavAutopilot::MAV_AUTOPILOT_INVALID,
        base_mode: MavModeFlag::empty(),
        system_status: MavState::MAV_STATE_ACTIVE,
        mavlink_version: 3,
    })
}

/// COMMAND_LONG addressed to `target`. `confirmation` counts retransmissions.
pub fn command_long(
    target: Target,
    command: MavCmd,
    confirmation: u8,
    params: [f32; 7],
) -> MavMessage {
    let [param1, param2, param3, param4, param5, param6, param7] = params;
    MavMessage::COMMAND_LONG(COMMAND_LONG_DATA {
        target_system: target.system_id,
        target_component: target.component_id,
        command,
        confirmation,
        param1,
        param2,
        param3,
        param4,
        param5,
        param6,
        param7,
    })
}

/// SET_POSITION_TARGET_LOCAL_NED for one setpoint.
pub fn setpoint_message(setpoint: &Setpoint, target: Target, time_boot_ms: u32) -> MavMessage {
    let (coordinate_frame, mask) = match setpoint.frame {
        SetpointFrame::PositionNed => (MavFrame::MAV_FRAME_LOCAL_NED, POSITION_TYPE_MASK),
        SetpointFrame::VelocityNed => (MavFrame::MAV_FRAME_LOCAL_NED, VELOCITY_TYPE_MASK),
        SetpointFrame::VelocityBody => (MavFrame::MAV_FRAME_BODY_NED, VELOCITY_TYPE_MASK),
    };
    let (position, velocity) = if setpoint.is_position() {
        ([setpoint.north, setpoint.east, setpoint.down], [0.0; 3])
    } else {
        ([0.0; 3], [setpoint.north, setpoint.east, setpoint.down])
    };

    MavMessage::SET_POSITION_TARGET_LOCAL_NED(SET_POSITION_TARGET_LOCAL_NED_DATA {
        time_boot_ms,
        x: position[0],
        y: position[1],
        z: position[2],
        vx: velocity[0],
        vy: velocity[1],
        vz: velocity[2],
        afx: 0.0,
        afy: 0.0,
        afz: 0.0,
        yaw: setpoint.yaw_deg.to_radians(),
        yaw_rate: 0.0,
        type_mask: PositionTargetTypemask::from_bits_truncate(mask),
        target_system: target.system_id,
        target_component: target.component_id,
        coordinate_frame,
    })
}
