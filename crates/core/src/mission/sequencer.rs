//! Mission Sequencer
//!
//! Single-threaded, blocking state machine that flies a [`MissionScript`]
//! in offboard mode:
//!
//! ```text
//! Init -> Preflight -> Arm -> StartOffboard -> Waypoints -> Descent
//!      -> Land -> WaitGrounded -> Disarm -> Done
//! ```
//!
//! Any failed arm, offboard start or land moves straight to `Aborted` and
//! returns the error; nothing of a later phase is issued. Disarm is
//! best-effort and never aborts.
//!
//! The sequencer does not know about MAVLink or any transport. It drives the
//! vehicle through the gateway traits and waits through [`Clock`].

use log::{info, warn};

use crate::error::{CommandOp, MissionError, ModeOp};
use crate::gateway::{ActionResult, CommandGateway, OffboardGateway, TelemetryGateway};
use crate::policy::{ensure_action, ensure_offboard};
use crate::setpoint::Setpoint;
use crate::traits::Clock;

use super::config::SequencerConfig;
use super::descent::DescentRamp;
use super::state::{MissionPhase, VehicleState};
use super::MissionScript;

/// Gateway handles for one mission run.
pub struct Vehicle<'a> {
    pub command: &'a mut dyn CommandGateway,
    pub offboard: &'a mut dyn OffboardGateway,
    pub telemetry: &'a dyn TelemetryGateway,
}

/// Summary of a completed mission.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MissionReport {
    /// Script steps flown
    pub waypoints_flown: usize,
    /// Descent setpoints sent, excluding the final ground-level target
    pub ramp_setpoints: usize,
    /// In-air polls issued while waiting to land
    pub in_air_polls: u32,
    /// What the vehicle answered to disarm
    pub disarm_result: Option<ActionResult>,
    /// Wall time from priming to completion (ms)
    pub elapsed_ms: u64,
}

/// Offboard mission state machine.
pub struct MissionSequencer<'s, C: Clock> {
    clock: C,
    script: &'s MissionScript,
    config: SequencerConfig,
    phase: MissionPhase,
    report: MissionReport,
}

impl<'s, C: Clock> MissionSequencer<'s, C> {
    pub fn new(clock: C, script: &'s MissionScript, config: SequencerConfig) -> Self {
        Self {
            clock,
            script,
            config,
            phase: MissionPhase::Init,
            report: MissionReport::default(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> MissionPhase {
        self.phase
    }

    /// Vehicle state implied by the current phase.
    pub fn vehicle_state(&self) -> Option<VehicleState> {
        self.phase.vehicle_state()
    }

    /// Progress so far.
    pub fn report(&self) -> MissionReport {
        self.report
    }

    /// Fly the whole mission.
    ///
    /// Returns the report on completion, or the first fatal error. On error
    /// the phase is left at [`MissionPhase::Aborted`].
    pub fn run(&mut self, vehicle: &mut Vehicle<'_>) -> Result<MissionReport, MissionError> {
        let started_us = self.clock.now_us();

        match self.run_phases(vehicle) {
            Ok(()) => {
                self.phase = MissionPhase::Done;
                self.report.elapsed_ms = self.clock.elapsed_since(started_us) / 1000;
                info!("[{}] Finished...", self.phase);
                Ok(self.report)
            }
            Err(e) => {
                warn!("[{}] Aborting mission: {}", self.phase, e);
                self.phase = MissionPhase::Aborted;
                Err(e)
            }
        }
    }

    fn run_phases(&mut self, vehicle: &mut Vehicle<'_>) -> Result<(), MissionError> {
        self.prime(vehicle.offboard);
        self.preflight(vehicle.telemetry)?;
        self.arm(vehicle.command)?;
        self.start_offboard(vehicle.offboard)?;
        self.fly_script(vehicle.offboard);
        self.descend(vehicle.offboard);
        self.land(vehicle.command)?;
        self.wait_grounded(vehicle.telemetry)?;
        self.disarm(vehicle.command);
        Ok(())
    }

    /// Send one zero setpoint so offboard mode can be started.
    pub fn prime(&mut self, offboard: &mut dyn OffboardGateway) {
        self.phase = MissionPhase::Init;
        offboard.send_setpoint(Setpoint::ZERO_VELOCITY);
        info!("[{}] Setpoint stream primed", self.phase);
    }

    /// Report gyrometer calibration; optionally require it.
    pub fn preflight(&mut self, telemetry: &dyn TelemetryGateway) -> Result<(), MissionError> {
        self.phase = MissionPhase::Preflight;
        let health = telemetry.health();

        if health.gyrometer_calibration_ok() {
            info!("[{}] Gyro is calibrated", self.phase);
            self.clock.sleep(self.config.preflight_settle);
        } else if self.config.require_gyro_calibration {
            return Err(MissionError::Preflight {
                reason: "gyrometer not calibrated",
            });
        } else {
            warn!("[{}] Gyro calibration not reported", self.phase);
        }

        if !health.all_ok() {
            info!("[{}] Health flags: {:?}", self.phase, health);
        }
        Ok(())
    }

    pub fn arm(&mut self, command: &mut dyn CommandGateway) -> Result<(), MissionError> {
        self.phase = MissionPhase::Arm;
        ensure_action(CommandOp::Arm, command.arm())?;
        info!("[{}] Armed", self.phase);
        Ok(())
    }

    pub fn start_offboard(
        &mut self,
        offboard: &mut dyn OffboardGateway,
    ) -> Result<(), MissionError> {
        self.phase = MissionPhase::StartOffboard;
        ensure_offboard(ModeOp::StartOffboard, offboard.start())?;
        info!("[{}] Offboard started", self.phase);
        Ok(())
    }

    /// Stream each script target and hold it. Sends are not checked.
    pub fn fly_script(&mut self, offboard: &mut dyn OffboardGateway) {
        self.phase = MissionPhase::Waypoints;
        let script = self.script;
        for step in script.steps() {
            info!("[{}] Going to {}", self.phase, step.target);
            offboard.send_setpoint(step.target);
            self.clock.sleep(step.hold);
            self.report.waypoints_flown += 1;
        }
    }

    /// Stream the interpolated descent, then the ground-level target.
    pub fn descend(&mut self, offboard: &mut dyn OffboardGateway) {
        self.phase = MissionPhase::Descent;
        let ramp = self.descent_ramp();
        let final_setpoint = ramp.final_setpoint();
        let delay = ramp.step_delay();
        let profile = ramp.clone();

        for (i, setpoint) in ramp.enumerate() {
            offboard.send_setpoint(setpoint);
            let height = profile.profile_at(i as u32).unwrap_or(setpoint.down);
            info!("[{}] {}", self.phase, height);
            self.clock.sleep(delay);
            self.report.ramp_setpoints += 1;
        }

        info!("[{}] Going to {}", self.phase, final_setpoint);
        offboard.send_setpoint(final_setpoint);
    }

    pub fn land(&mut self, command: &mut dyn CommandGateway) -> Result<(), MissionError> {
        self.phase = MissionPhase::Land;
        ensure_action(CommandOp::Land, command.land())?;
        info!("[{}] Landing", self.phase);
        Ok(())
    }

    /// Poll in-air until the vehicle reports on ground.
    ///
    /// Issues exactly one more poll than the number of in-air reports.
    pub fn wait_grounded(&mut self, telemetry: &dyn TelemetryGateway) -> Result<(), MissionError> {
        self.phase = MissionPhase::WaitGrounded;
        let started_us = self.clock.now_us();

        loop {
            self.report.in_air_polls += 1;
            if !telemetry.in_air() {
                break;
            }

            if let Some(timeout) = self.config.landing_timeout {
                let waited_us = self.clock.elapsed_since(started_us);
                if waited_us >= timeout.as_micros() as u64 {
                    return Err(MissionError::LandingTimeout {
                        waited_ms: waited_us / 1000,
                    });
                }
            }

            info!("[{}] Vehicle is landing...", self.phase);
            self.clock.sleep(self.config.grounded_poll_interval);
        }

        info!("[{}] Landed!", self.phase);
        Ok(())
    }

    /// Best-effort disarm. The vehicle may already have auto-disarmed.
    pub fn disarm(&mut self, command: &mut dyn CommandGateway) {
        self.phase = MissionPhase::Disarm;
        let result = command.disarm();
        self.report.disarm_result = Some(result);

        match ensure_action(CommandOp::Disarm, result) {
            Ok(()) => info!("[{}] Disarmed", self.phase),
            Err(e) => warn!("[{}] {} (relying on auto-disarm)", self.phase, e),
        }

        self.clock.sleep(self.config.post_disarm_watch);
    }

    fn descent_ramp(&self) -> DescentRamp {
        let anchor = self.script.last_position().unwrap_or(Setpoint::position_ned(
            0.0,
            0.0,
            -self.config.hover_height_m,
            0.0,
        ));
        DescentRamp::from_hold(
            anchor,
            self.config.ramp_steps,
            self.config.ramp_offset_m,
            self.config.ramp_step_delay,
        )
    }
}
