//! Setpoint Model
//!
//! Position and velocity targets expressed in a local tangent frame.

use core::fmt;

/// How the three linear components of a [`Setpoint`] are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SetpointFrame {
    /// Position in the local NED frame (meters)
    #[default]
    PositionNed,
    /// Velocity in the local NED frame (m/s)
    VelocityNed,
    /// Velocity in the body frame, forward/right/down (m/s)
    VelocityBody,
}

/// One target sent to the external-control gateway.
///
/// `north`/`east`/`down` are meters for [`SetpointFrame::PositionNed`] and
/// m/s for the velocity frames (forward/right/down in the body frame).
/// `yaw_deg` is an absolute heading in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Setpoint {
    pub north: f32,
    pub east: f32,
    pub down: f32,
    pub yaw_deg: f32,
    pub frame: SetpointFrame,
}

impl Setpoint {
    /// Zero NED velocity, used to satisfy the offboard watchdog before start.
    pub const ZERO_VELOCITY: Setpoint = Setpoint {
        north: 0.0,
        east: 0.0,
        down: 0.0,
        yaw_deg: 0.0,
        frame: SetpointFrame::VelocityNed,
    };

    /// Local NED position target.
    pub const fn position_ned(north: f32, east: f32, down: f32, yaw_deg: f32) -> Self {
        Self {
            north,
            east,
            down,
            yaw_deg,
            frame: SetpointFrame::PositionNed,
        }
    }

    /// Local NED velocity target.
    pub const fn velocity_ned(north: f32, east: f32, down: f32, yaw_deg: f32) -> Self {
        Self {
            north,
            east,
            down,
            yaw_deg,
            frame: SetpointFrame::VelocityNed,
        }
    }

    /// Body-frame velocity target (forward, right, down).
    pub const fn velocity_body(forward: f32, right: f32, down: f32, yaw_deg: f32) -> Self {
        Self {
            north: forward,
            east: right,
            down,
            yaw_deg,
            frame: SetpointFrame::VelocityBody,
        }
    }

    /// Same horizontal target and yaw, different down component.
    pub const fn with_down(self, down: f32) -> Self {
        Self { down, ..self }
    }

    pub fn is_position(&self) -> bool {
        self.frame == SetpointFrame::PositionNed
    }
}

impl fmt::Display for Setpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.north, self.east, self.down)?;
        if self.yaw_deg != 0.0 {
            write!(f, " (yaw {} deg)", self.yaw_deg)?;
        }
        Ok(())
    }
}
