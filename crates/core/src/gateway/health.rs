//! Vehicle health flags reported by the telemetry gateway.

use bitflags::bitflags;

bitflags! {
    /// Pre-flight health checks, set when the corresponding check passes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct HealthFlags: u8 {
        /// Gyrometer present, enabled and calibrated
        const GYROMETER_CALIBRATION_OK = 0b0000_0001;
        /// Accelerometer present, enabled and calibrated
        const ACCELEROMETER_CALIBRATION_OK = 0b0000_0010;
        /// Magnetometer present, enabled and calibrated
        const MAGNETOMETER_CALIBRATION_OK = 0b0000_0100;
        /// Local position estimate available
        const LOCAL_POSITION_OK = 0b0000_1000;
        /// Global position estimate available
        const GLOBAL_POSITION_OK = 0b0001_0000;
        /// Home position has been set
        const HOME_POSITION_OK = 0b0010_0000;
    }
}

impl HealthFlags {
    pub fn gyrometer_calibration_ok(self) -> bool {
        self.contains(HealthFlags::GYROMETER_CALIBRATION_OK)
    }

    /// Every check passes.
    pub fn all_ok(self) -> bool {
        self.is_all()
    }
}
