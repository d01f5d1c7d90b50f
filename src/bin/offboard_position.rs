//! Offboard position-control demo.
//!
//! Usage:
//!   offboard_position <connection_url>
//!
//! For example, to connect to the simulator: `offboard_position udp://:14540`

use std::env;
use std::process::ExitCode;

use offboard_pilot::{cli, logging};

fn main() -> ExitCode {
    logging::init();
    let args: Vec<String> = env::args().collect();
    ExitCode::from(cli::run(&args))
}
