//! Descent Ramp
//!
//! Linear interpolation of setpoints for a smooth final glide before the
//! explicit land command. Step `i` of `steps` commands
//!
//! ```text
//! down_i = -height + height / steps * i + offset      for i in 0..steps
//! ```
//!
//! The interval is half-open: the last ramp setpoint still carries the
//! clearance `offset`, and the zero-altitude target is sent separately via
//! [`DescentRamp::final_setpoint`].

use core::time::Duration;

use crate::setpoint::Setpoint;

/// Lazily generated sequence of descent setpoints, consumed once in order.
#[derive(Debug, Clone)]
pub struct DescentRamp {
    anchor: Setpoint,
    height: f32,
    offset: f32,
    steps: u32,
    step_delay: Duration,
    next: u32,
}

impl DescentRamp {
    /// Ramp down from `anchor` (a position hold at `-height`).
    ///
    /// North, east and yaw are taken from `anchor`; the height is the
    /// magnitude of its down component.
    pub fn from_hold(anchor: Setpoint, steps: u32, offset: f32, step_delay: Duration) -> Self {
        let height = if anchor.down < 0.0 { -anchor.down } else { 0.0 };
        Self {
            anchor,
            height,
            offset,
            steps,
            step_delay,
            next: 0,
        }
    }

    /// Hold altitude magnitude the ramp starts from (meters)
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Delay between ramp setpoints
    pub fn step_delay(&self) -> Duration {
        self.step_delay
    }

    /// Interpolated height profile at step `i`, before the clearance offset.
    ///
    /// `None` past the last step, which also covers an empty ramp.
    pub fn profile_at(&self, i: u32) -> Option<f32> {
        (i < self.steps).then(|| -self.height + self.height / self.steps as f32 * i as f32)
    }

    /// Commanded down component of step `i`; only called for `i < steps`.
    fn down_at(&self, i: u32) -> f32 {
        self.profile_at(i).unwrap_or(0.0) + self.offset
    }

    /// Ground-level target sent after the ramp, before landing.
    pub fn final_setpoint(&self) -> Setpoint {
        Setpoint::position_ned(self.anchor.north, self.anchor.east, 0.0, self.anchor.yaw_deg)
    }
}

impl Iterator for DescentRamp {
    type Item = Setpoint;

    fn next(&mut self) -> Option<Setpoint> {
        if self.next >= self.steps {
            return None;
        }
        let i = self.next;
        self.next += 1;
        Some(Setpoint::position_ned(
            self.anchor.north,
            self.anchor.east,
            self.down_at(i),
            self.anchor.yaw_deg,
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.steps - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DescentRamp {}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;

    fn ramp(height: f32, steps: u32, offset: f32) -> DescentRamp {
        DescentRamp::from_hold(
            Setpoint::position_ned(0.0, 0.0, -height, 0.0),
            steps,
            offset,
            Duration::from_millis(400),
        )
    }

    #[test]
    fn test_default_ramp_values() {
        let downs: Vec<f32> = ramp(0.75, 5, 0.15).map(|sp| sp.down).collect();
        let expected = [-0.6, -0.45, -0.3, -0.15, 0.0];

        assert_eq!(downs.len(), 5);
        for (down, want) in downs.iter().zip(expected) {
            assert!((down - want).abs() < 1e-6, "{} != {}", down, want);
        }
    }

    #[test]
    fn test_ramp_is_monotonically_climbing_toward_zero() {
        let downs: Vec<f32> = ramp(2.0, 8, 0.0).map(|sp| sp.down).collect();
        for pair in downs.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        // Half-open: the full ground-level state is not part of the ramp
        assert!(downs.last().unwrap() < &0.0);
    }

    #[test]
    fn test_ramp_keeps_anchor_position_and_yaw() {
        let anchor = Setpoint::position_ned(1.5, -0.5, -1.0, 30.0);
        let ramp = DescentRamp::from_hold(anchor, 4, 0.1, Duration::from_millis(100));
        let final_sp = ramp.final_setpoint();

        for sp in ramp {
            assert!(sp.is_position());
            assert_eq!(sp.north, 1.5);
            assert_eq!(sp.east, -0.5);
            assert_eq!(sp.yaw_deg, 30.0);
        }
        assert_eq!(final_sp, Setpoint::position_ned(1.5, -0.5, 0.0, 30.0));
    }

    #[test]
    fn test_profile_excludes_offset() {
        let ramp = ramp(0.75, 5, 0.15);
        let expected = [-0.75, -0.6, -0.45, -0.3, -0.15];
        for (i, want) in expected.into_iter().enumerate() {
            let profile = ramp.profile_at(i as u32).unwrap();
            assert!((profile - want).abs() < 1e-6, "{} != {}", profile, want);
        }
        assert_eq!(ramp.profile_at(5), None);
    }

    #[test]
    fn test_zero_steps_is_empty() {
        let mut ramp = ramp(0.75, 0, 0.15);
        assert_eq!(ramp.len(), 0);
        assert_eq!(ramp.profile_at(0), None);
        assert!(ramp.next().is_none());
    }

    #[test]
    fn test_exact_size() {
        let mut ramp = ramp(0.75, 5, 0.15);
        assert_eq!(ramp.len(), 5);
        ramp.next();
        assert_eq!(ramp.len(), 4);
        assert_eq!(ramp.height(), 0.75);
    }
}
