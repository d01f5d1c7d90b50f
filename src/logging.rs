//! Console logging
//!
//! Progress goes to stdout as plain lines through the `log` facade
//! (`env_logger`, level `info` unless `RUST_LOG` says otherwise). Fatal
//! errors go to stderr, in red when stderr is a terminal.

use std::fmt::Display;
use std::io::{IsTerminal, Write};

use env_logger::{Builder, Env, Target};
use log::Level;

/// Turn text on console red
pub const ERROR_CONSOLE_TEXT: &str = "\x1b[31m";
/// Restore normal console colour
pub const NORMAL_CONSOLE_TEXT: &str = "\x1b[0m";

/// Install the stdout logger. Safe to call more than once.
pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stdout)
        .format(|buf, record| match record.level() {
            Level::Info => writeln!(buf, "{}", record.args()),
            level => writeln!(buf, "{level}: {}", record.args()),
        })
        .try_init();
}

/// Print a fatal error to stderr.
pub fn report_failure(error: &dyn Display) {
    let mut stderr = std::io::stderr();
    let _ = if stderr.is_terminal() {
        writeln!(stderr, "{ERROR_CONSOLE_TEXT}{error}{NORMAL_CONSOLE_TEXT}")
    } else {
        writeln!(stderr, "{error}")
    };
}
