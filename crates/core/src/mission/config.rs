//! Sequencer timing and descent parameters.

use core::time::Duration;

use super::DEFAULT_HOVER_HEIGHT_M;

/// Tunables for [`MissionSequencer`](super::MissionSequencer).
///
/// Override individual fields with struct update syntax:
///
/// ```
/// use core::time::Duration;
/// use offboard_pilot_core::mission::SequencerConfig;
///
/// let config = SequencerConfig {
///     landing_timeout: Some(Duration::from_secs(30)),
///     ..Default::default()
/// };
/// assert_eq!(config.ramp_steps, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerConfig {
    /// Ramp start height when the script has no position step (meters)
    pub hover_height_m: f32,
    /// Number of interpolated descent setpoints
    pub ramp_steps: u32,
    /// Clearance added to every ramp setpoint (meters)
    pub ramp_offset_m: f32,
    /// Delay between descent setpoints
    pub ramp_step_delay: Duration,
    /// In-air poll interval while landing
    pub grounded_poll_interval: Duration,
    /// Abort if still in air after this long. `None` waits forever.
    pub landing_timeout: Option<Duration>,
    /// Abort before arming if the gyrometer is not calibrated
    pub require_gyro_calibration: bool,
    /// Pause after a healthy gyrometer report
    pub preflight_settle: Duration,
    /// Time to keep watching after disarm while auto-disarm settles
    pub post_disarm_watch: Duration,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            hover_height_m: DEFAULT_HOVER_HEIGHT_M,
            ramp_steps: 5,
            ramp_offset_m: 0.15,
            ramp_step_delay: Duration::from_millis(400),
            grounded_poll_interval: Duration::from_secs(1),
            landing_timeout: None,
            require_gyro_calibration: false,
            preflight_settle: Duration::from_secs(1),
            post_disarm_watch: Duration::from_secs(3),
        }
    }
}
