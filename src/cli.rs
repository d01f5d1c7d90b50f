//! Command-line entry point for the `offboard_position` binary.
//!
//! ```text
//! offboard_position <connection_url>
//! ```
//!
//! Exits 0 when the mission completes, 1 on a usage error, a connection
//! failure or any mission abort.

use std::thread;
use std::time::Duration;

use log::info;
use offboard_pilot_core::{
    MissionReport, MissionScript, MissionSequencer, SequencerConfig, Vehicle,
};

use crate::clock::SystemClock;
use crate::connection::ConnectionUrl;
use crate::error::AppError;
use crate::gateway::{ActionGateway, OffboardControl, TelemetryMonitor};
use crate::link::{LinkConfig, MavLink};
use crate::logging;

/// Pause between discovery and the first telemetry read.
const DISCOVERY_SETTLE: Duration = Duration::from_secs(1);

/// Usage text for `bin_name`.
pub fn usage(bin_name: &str) -> String {
    format!(
        "Usage : {bin_name} <connection_url>\n\
         Connection URL format should be :\n \
         For TCP : tcp://[server_host][:server_port]\n \
         For UDP : udp://[bind_host][:bind_port]\n \
         For Serial : serial:///path/to/serial/dev[:baudrate]\n\
         For example, to connect to the simulator use URL: udp://:14540"
    )
}

/// Extract the connection URL from `args` (program name first).
pub fn parse_args(args: &[String]) -> Result<ConnectionUrl, AppError> {
    match args {
        [_, url] => url.parse(),
        _ => Err(AppError::Usage),
    }
}

/// Run the binary and return its exit code.
pub fn run(args: &[String]) -> u8 {
    let url = match parse_args(args) {
        Ok(url) => url,
        Err(AppError::Usage) => {
            let bin_name = args.first().map_or("offboard_position", String::as_str);
            println!("{}", usage(bin_name));
            return 1;
        }
        Err(e) => {
            logging::report_failure(&e);
            return 1;
        }
    };

    match fly(&url, LinkConfig::default(), SequencerConfig::default()) {
        Ok(_) => 0,
        Err(e) => {
            logging::report_failure(&e);
            1
        }
    }
}

/// Connect to `url` and fly the default offboard mission.
pub fn fly(
    url: &ConnectionUrl,
    link_config: LinkConfig,
    config: SequencerConfig,
) -> Result<MissionReport, AppError> {
    let link = MavLink::open(url, link_config)?;
    link.wait_for_heartbeat()?;
    thread::sleep(DISCOVERY_SETTLE);

    let mut command = ActionGateway::new(&link);
    let mut offboard = OffboardControl::new(&link);
    let telemetry = TelemetryMonitor::new(&link);
    let mut vehicle = Vehicle {
        command: &mut command,
        offboard: &mut offboard,
        telemetry: &telemetry,
    };

    let script = MissionScript::offboard_position(config.hover_height_m);
    let mut sequencer = MissionSequencer::new(SystemClock::new(), &script, config);
    let report = sequencer.run(&mut vehicle)?;

    info!(
        "Flew {} waypoints in {:.1} s",
        report.waypoints_flown,
        report.elapsed_ms as f64 / 1000.0
    );
    Ok(report)
}
