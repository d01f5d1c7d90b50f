//! Cached vehicle state decoded from incoming MAVLink messages.
//!
//! Updated by the link's receiver thread; read by the gateways.

use std::time::{Duration, Instant};

use mavlink::common::{
    MavAutopilot, MavCmd, MavLandedState, MavMessage, MavModeFlag, MavResult, MavSysStatusSensor,
    SYS_STATUS_DATA,
};
use mavlink::MavHeader;
use offboard_pilot_core::HealthFlags;

/// The autopilot we talk to, learned from its first heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub system_id: u8,
    pub component_id: u8,
}

#[derive(Debug, Default)]
pub struct LinkState {
    target: Option<Target>,
    last_heartbeat: Option<Instant>,
    armed: bool,
    health: HealthFlags,
    landed_state: Option<MavLandedState>,
    /// Acknowledgements not yet claimed by a command sender
    acks: Vec<(MavCmd, MavResult)>,
}

impl LinkState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one received message.
    ///
    /// Returns `true` when a COMMAND_ACK was queued.
    pub fn handle_message(&mut self, header: &MavHeader, msg: &MavMessage, now: Instant) -> bool {
        if let MavMessage::HEARTBEAT(hb) = msg {
            if hb.autopilot == MavAutopilot::MAV_AUTOPILOT_INVALID {
                return false;
            }
            match self.target {
                None => {
                    self.target = Some(Target {
                        system_id: header.system_id,
                        component_id: header.component_id,
                    });
                }
                Some(t) if t.system_id != header.system_id => return false,
                Some(_) => {}
            }
            self.last_heartbeat = Some(now);
            self.armed = hb.base_mode.contains(MavModeFlag::MAV_MODE_FLAG_SAFETY_ARMED);
            return false;
        }

        match self.target {
            Some(t) if t.system_id == header.system_id => {}
            _ => return false,
        }

        match msg {
            MavMessage::SYS_STATUS(status) => self.update_sensor_health(status),
            MavMessage::LOCAL_POSITION_NED(_) => self.health.insert(HealthFlags::LOCAL_POSITION_OK),
            MavMessage::GLOBAL_POSITION_INT(_) => {
                self.health.insert(HealthFlags::GLOBAL_POSITION_OK)
            }
            MavMessage::HOME_POSITION(_) => self.health.insert(HealthFlags::HOME_POSITION_OK),
            MavMessage::EXTENDED_SYS_STATE(state) => self.landed_state = Some(state.landed_state),
            MavMessage::COMMAND_ACK(ack) => {
                self.acks.push((ack.command, ack.result));
                return true;
            }
            _ => {}
        }
        false
    }

    fn update_sensor_health(&mut self, status: &SYS_STATUS_DATA) {
        let ok = |sensor: MavSysStatusSensor| {
            status.onboard_control_sensors_present.contains(sensor)
                && status.onboard_control_sensors_enabled.contains(sensor)
                && status.onboard_control_sensors_health.contains(sensor)
        };
        self.health.set(
            HealthFlags::GYROMETER_CALIBRATION_OK,
            ok(MavSysStatusSensor::MAV_SYS_STATUS_SENSOR_3D_GYRO),
        );
        self.health.set(
            HealthFlags::ACCELEROMETER_CALIBRATION_OK,
            ok(MavSysStatusSensor::MAV_SYS_STATUS_SENSOR_3D_ACCEL),
        );
        self.health.set(
            HealthFlags::MAGNETOMETER_CALIBRATION_OK,
            ok(MavSysStatusSensor::MAV_SYS_STATUS_SENSOR_3D_MAG),
        );
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    /// Heartbeat seen within `timeout`.
    pub fn is_connected(&self, now: Instant, timeout: Duration) -> bool {
        self.last_heartbeat
            .is_some_and(|seen| now.saturating_duration_since(seen) < timeout)
    }

    pub fn armed(&self) -> bool {
        self.armed
    }

    pub fn health(&self) -> HealthFlags {
        self.health
    }

    /// Last reported landed state.
    pub fn landed_state(&self) -> Option<MavLandedState> {
        self.landed_state
    }

    /// Airborne according to EXTENDED_SYS_STATE; `false` until reported.
    pub fn in_air(&self) -> bool {
        matches!(
            self.landed_state,
            Some(
                MavLandedState::MAV_LANDED_STATE_IN_AIR
                    | MavLandedState::MAV_LANDED_STATE_TAKEOFF
                    | MavLandedState::MAV_LANDED_STATE_LANDING
            )
        )
    }

    /// Claim the oldest queued ACK for `command`.
    pub fn take_ack(&mut self, command: MavCmd) -> Option<MavResult> {
        let index = self.acks.iter().position(|(cmd, _)| *cmd == command)?;
        Some(self.acks.remove(index).1)
    }

    /// Drop every queued ACK for `command`.
    pub fn clear_acks(&mut self, command: MavCmd) {
        self.acks.retain(|(cmd, _)| *cmd != command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mavlink::common::{
        MavState, MavSysStatusSensorExtended, MavType, MavVtolState, COMMAND_ACK_DATA,
        EXTENDED_SYS_STATE_DATA, HEARTBEAT_DATA,
    };

    fn header(system_id: u8, component_id: u8) -> MavHeader {
        MavHeader {
            system_id,
            component_id,
            sequence: 0,
        }
    }

    fn heartbeat(autopilot: MavAutopilot, base_mode: MavModeFlag) -> MavMessage {
        MavMessage::HEARTBEAT(HEARTBEAT_DATA {
            custom_mode: 0,
            mavtype: MavType::MAV_TYPE_QUADROTOR,
            autopilot,
            base_mode,
            system_status: MavState::MAV_STATE_STANDBY,
            mavlink_version: 3,
        })
    }

    fn sys_status(healthy: MavSysStatusSensor) -> MavMessage {
        let present = MavSysStatusSensor::MAV_SYS_STATUS_SENSOR_3D_GYRO
            | MavSysStatusSensor::MAV_SYS_STATUS_SENSOR_3D_ACCEL
            | MavSysStatusSensor::MAV_SYS_STATUS_SENSOR_3D_MAG;
        MavMessage::SYS_STATUS(SYS_STATUS_DATA {
            onboard_control_sensors_present: present,
            onboard_control_sensors_enabled: present,
            onboard_control_sensors_health: healthy,
            load: 0,
            voltage_battery: 12600,
            current_battery: -1,
            battery_remaining: -1,
            drop_rate_comm: 0,
            errors_comm: 0,
            errors_count1: 0,
            errors_count2: 0,
            errors_count3: 0,
            errors_count4: 0,
            onboard_control_sensors_present_extended: MavSysStatusSensorExtended::empty(),
            onboard_control_sensors_enabled_extended: MavSysStatusSensorExtended::empty(),
            onboard_control_sensors_health_extended: MavSysStatusSensorExtended::empty(),
        })
    }

    fn connected_state() -> (LinkState, Instant) {
        let mut state = LinkState::new();
        let now = Instant::now();
        state.handle_message(
            &header(1, 1),
            &heartbeat(MavAutopilot::MAV_AUTOPILOT_PX4, MavModeFlag::empty()),
            now,
        );
        (state, now)
    }

    #[test]
    fn test_first_autopilot_heartbeat_sets_target() {
        let (state, now) = connected_state();
        assert_eq!(
            state.target(),
            Some(Target {
                system_id: 1,
                component_id: 1
            })
        );
        assert!(state.is_connected(now, Duration::from_secs(3)));
        assert!(!state.is_connected(now + Duration::from_secs(5), Duration::from_secs(3)));
        assert!(!state.armed());
    }

    #[test]
    fn test_gcs_heartbeat_ignored() {
        let mut state = LinkState::new();
        state.handle_message(
            &header(255, 190),
            &heartbeat(MavAutopilot::MAV_AUTOPILOT_INVALID, MavModeFlag::empty()),
            Instant::now(),
        );
        assert_eq!(state.target(), None);
        assert!(!state.is_connected(Instant::now(), Duration::from_secs(3)));
    }

    #[test]
    fn test_armed_flag_from_heartbeat() {
        let (mut state, now) = connected_state();
        state.handle_message(
            &header(1, 1),
            &heartbeat(
                MavAutopilot::MAV_AUTOPILOT_PX4,
                MavModeFlag::MAV_MODE_FLAG_SAFETY_ARMED,
            ),
            now,
        );
        assert!(state.armed());
    }

    #[test]
    fn test_sys_status_health() {
        let (mut state, now) = connected_state();
        state.handle_message(
            &header(1, 1),
            &sys_status(MavSysStatusSensor::MAV_SYS_STATUS_SENSOR_3D_GYRO),
            now,
        );
        let health = state.health();
        assert!(health.gyrometer_calibration_ok());
        assert!(!health.contains(HealthFlags::ACCELEROMETER_CALIBRATION_OK));
        assert!(!health.all_ok());
    }

    #[test]
    fn test_messages_from_other_systems_ignored() {
        let (mut state, now) = connected_state();
        state.handle_message(
            &header(2, 1),
            &sys_status(MavSysStatusSensor::MAV_SYS_STATUS_SENSOR_3D_GYRO),
            now,
        );
        assert!(!state.health().gyrometer_calibration_ok());
    }

    #[test]
    fn test_landed_state() {
        let (mut state, now) = connected_state();
        assert!(!state.in_air());

        let landed = |landed_state| {
            MavMessage::EXTENDED_SYS_STATE(EXTENDED_SYS_STATE_DATA {
                vtol_state: MavVtolState::MAV_VTOL_STATE_UNDEFINED,
                landed_state,
            })
        };

        state.handle_message(&header(1, 1), &landed(MavLandedState::MAV_LANDED_STATE_IN_AIR), now);
        assert!(state.in_air());
        state.handle_message(&header(1, 1), &landed(MavLandedState::MAV_LANDED_STATE_LANDING), now);
        assert!(state.in_air());
        state.handle_message(
            &header(1, 1),
            &landed(MavLandedState::MAV_LANDED_STATE_ON_GROUND),
            now,
        );
        assert!(!state.in_air());
    }

    #[test]
    fn test_command_ack_queue() {
        let (mut state, now) = connected_state();
        let ack = MavMessage::COMMAND_ACK(COMMAND_ACK_DATA {
            command: MavCmd::MAV_CMD_COMPONENT_ARM_DISARM,
            result: MavResult::MAV_RESULT_ACCEPTED,
            progress: 0,
            result_param2: 0,
            target_system: 245,
            target_component: 190,
        });

        assert!(state.handle_message(&header(1, 1), &ack, now));
        assert_eq!(state.take_ack(MavCmd::MAV_CMD_NAV_LAND), None);
        assert_eq!(
            state.take_ack(MavCmd::MAV_CMD_COMPONENT_ARM_DISARM),
            Some(MavResult::MAV_RESULT_ACCEPTED)
        );
        assert_eq!(state.take_ack(MavCmd::MAV_CMD_COMPONENT_ARM_DISARM), None);

        state.handle_message(&header(1, 1), &ack, now);
        state.clear_acks(MavCmd::MAV_CMD_COMPONENT_ARM_DISARM);
        assert_eq!(state.take_ack(MavCmd::MAV_CMD_COMPONENT_ARM_DISARM), None);
    }
}
