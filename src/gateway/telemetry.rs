use offboard_pilot_core::{HealthFlags, TelemetryGateway};

use crate::link::MavLink;

/// [`TelemetryGateway`] reading the link's cached state.
pub struct TelemetryMonitor<'a> {
    link: &'a MavLink,
}

impl<'a> TelemetryMonitor<'a> {
    pub fn new(link: &'a MavLink) -> Self {
        Self { link }
    }
}

impl TelemetryGateway for TelemetryMonitor<'_> {
    fn health(&self) -> HealthFlags {
        self.link.health()
    }

    fn in_air(&self) -> bool {
        self.link.in_air()
    }
}
