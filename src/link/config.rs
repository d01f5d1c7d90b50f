use std::time::Duration;

/// MAVLink link parameters.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Our MAVLink system ID
    pub system_id: u8,
    /// Our MAVLink component ID
    pub component_id: u8,
    /// GCS heartbeat period
    pub heartbeat_interval: Duration,
    /// Vehicle is considered lost after this long without a heartbeat
    pub heartbeat_timeout: Duration,
    /// Offboard setpoint re-send rate while streaming
    pub setpoint_rate_hz: u32,
    /// Wait per COMMAND_LONG attempt for its COMMAND_ACK
    pub ack_timeout: Duration,
    /// Retransmissions after the first attempt
    pub command_retries: u8,
    /// Log period while waiting for the first heartbeat
    pub discovery_interval: Duration,
    /// Give up discovery after this long. `None` waits forever.
    pub discovery_timeout: Option<Duration>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            system_id: 245,
            component_id: 190, // MAV_COMP_ID_MISSIONPLANNER
            heartbeat_interval: Duration::from_secs(1),
            heartbeat_timeout: Duration::from_secs(3),
            setpoint_rate_hz: 20,
            ack_timeout: Duration::from_millis(500),
            command_retries: 3,
            discovery_interval: Duration::from_secs(1),
            discovery_timeout: None,
        }
    }
}

impl LinkConfig {
    /// Streamer thread tick
    pub fn setpoint_period(&self) -> Duration {
        Duration::from_secs(1) / self.setpoint_rate_hz.max(1)
    }
}
