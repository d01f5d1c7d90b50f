//! MAVLink link to one vehicle.
//!
//! [`MavLink::open`] connects and spawns two background threads:
//!
//! - **receiver**: folds every incoming message into a shared [`LinkState`]
//!   and wakes command senders when an ACK arrives
//! - **streamer**: re-sends the current offboard setpoint at the configured
//!   rate and emits our GCS heartbeat
//!
//! Everything else is a synchronous call that reads the cached state or
//! blocks on a command acknowledgement. The receiver owns the read half of
//! the transport, so sends never wait on an inbound frame.

pub mod config;
pub mod message;
pub mod state;
pub mod transport;

pub use config::LinkConfig;
pub use state::{LinkState, Target};

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use mavlink::common::{MavCmd, MavLandedState, MavMessage, MavResult};
use mavlink::MavHeader;
use offboard_pilot_core::{HealthFlags, Setpoint};

use transport::{MessageSink, MessageSource};

use crate::connection::ConnectionUrl;
use crate::error::AppError;

/// Back-off after a transport error in the receiver.
const RECEIVE_ERROR_BACKOFF: Duration = Duration::from_millis(10);

/// How a COMMAND_LONG exchange ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandOutcome {
    /// The vehicle answered with this result
    Ack(MavResult),
    /// No vehicle discovered yet
    NoSystem,
    /// Transport refused the message
    SendFailed,
    /// No final ACK after every retry
    Timeout,
}

struct Shared {
    sink: Mutex<Box<dyn MessageSink>>,
    config: LinkConfig,
    state: Mutex<LinkState>,
    /// Signalled on discovery and on every COMMAND_ACK
    changed: Condvar,
    sequence: AtomicU8,
    stream: Mutex<Option<Setpoint>>,
    setpoint_sent: AtomicBool,
    running: AtomicBool,
    started: Instant,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, LinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_stream(&self) -> MutexGuard<'_, Option<Setpoint>> {
        self.stream.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn send(&self, msg: &MavMessage) -> io::Result<()> {
        let header = MavHeader {
            system_id: self.config.system_id,
            component_id: self.config.component_id,
            sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
        };
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .send(header, msg)
    }

    fn time_boot_ms(&self) -> u32 {
        self.started.elapsed().as_millis() as u32
    }

    fn send_setpoint(&self, setpoint: &Setpoint) {
        let Some(target) = self.lock_state().target() else {
            return;
        };
        let msg = message::setpoint_message(setpoint, target, self.time_boot_ms());
        match self.send(&msg) {
            Ok(()) => self.setpoint_sent.store(true, Ordering::Release),
            Err(e) => debug!("Setpoint send failed: {e}"),
        }
    }
}

/// Connected MAVLink endpoint.
///
/// Dropping it stops both background threads and waits for them, which
/// closes the transport.
pub struct MavLink {
    shared: Arc<Shared>,
    threads: Vec<JoinHandle<()>>,
}

impl MavLink {
    /// Open `url` and start the receiver and streamer threads.
    pub fn open(url: &ConnectionUrl, config: LinkConfig) -> Result<Self, AppError> {
        let (source, sink) =
            transport::open(url).map_err(|e| AppError::Connection(format!("{url}: {e}")))?;

        let shared = Arc::new(Shared {
            sink: Mutex::new(sink),
            config,
            state: Mutex::new(LinkState::new()),
            changed: Condvar::new(),
            sequence: AtomicU8::new(0),
            stream: Mutex::new(None),
            setpoint_sent: AtomicBool::new(false),
            running: AtomicBool::new(true),
            started: Instant::now(),
        });

        let mut link = Self {
            shared,
            threads: Vec::with_capacity(2),
        };
        let rx_shared = Arc::clone(&link.shared);
        link.threads
            .push(spawn("mavlink-rx", move || receive_loop(rx_shared, source))?);
        let stream_shared = Arc::clone(&link.shared);
        link.threads
            .push(spawn("mavlink-stream", move || stream_loop(stream_shared))?);
        debug!("Link open on {url}");

        Ok(link)
    }

    /// Block until an autopilot heartbeat has been seen.
    pub fn wait_for_heartbeat(&self) -> Result<Target, AppError> {
        let config = &self.shared.config;
        let started = Instant::now();
        let mut state = self.shared.lock_state();
        loop {
            if let Some(target) = state.target() {
                info!(
                    "Discovered system {} component {}",
                    target.system_id, target.component_id
                );
                return Ok(target);
            }
            if let Some(limit) = config.discovery_timeout {
                if started.elapsed() >= limit {
                    return Err(AppError::Timeout("vehicle heartbeat"));
                }
            }
            info!("Wait for system to connect via heartbeat");
            state = self
                .shared
                .changed
                .wait_timeout(state, config.discovery_interval)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    pub fn target(&self) -> Option<Target> {
        self.shared.lock_state().target()
    }

    /// Heartbeat received within the configured timeout.
    pub fn is_connected(&self) -> bool {
        self.shared
            .lock_state()
            .is_connected(Instant::now(), self.shared.config.heartbeat_timeout)
    }

    pub fn armed(&self) -> bool {
        self.shared.lock_state().armed()
    }

    pub fn health(&self) -> HealthFlags {
        self.shared.lock_state().health()
    }

    pub fn in_air(&self) -> bool {
        self.shared.lock_state().in_air()
    }

    pub fn landed_state(&self) -> Option<MavLandedState> {
        self.shared.lock_state().landed_state()
    }

    /// Send a COMMAND_LONG and wait for its ACK.
    ///
    /// Each attempt waits `ack_timeout`; unanswered attempts are retransmitted
    /// with an incremented confirmation field. `IN_PROGRESS` restarts the
    /// wait without retransmitting.
    pub fn send_command(&self, command: MavCmd, params: [f32; 7]) -> CommandOutcome {
        let Some(target) = self.target() else {
            return CommandOutcome::NoSystem;
        };
        let config = &self.shared.config;
        self.shared.lock_state().clear_acks(command);

        for confirmation in 0..=config.command_retries {
            let msg = message::command_long(target, command, confirmation, params);
            if let Err(e) = self.shared.send(&msg) {
                warn!("Failed to send {command:?}: {e}");
                return CommandOutcome::SendFailed;
            }

            let mut deadline = Instant::now() + config.ack_timeout;
            let mut state = self.shared.lock_state();
            loop {
                match state.take_ack(command) {
                    Some(MavResult::MAV_RESULT_IN_PROGRESS) => {
                        deadline = Instant::now() + config.ack_timeout;
                        continue;
                    }
                    Some(result) => return CommandOutcome::Ack(result),
                    None => {}
                }
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                state = self
                    .shared
                    .changed
                    .wait_timeout(state, deadline - now)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
            debug!("No ACK for {command:?} (attempt {})", confirmation + 1);
        }
        CommandOutcome::Timeout
    }

    /// Send `setpoint` now and keep re-sending it until replaced or cleared.
    pub fn send_setpoint(&self, setpoint: Setpoint) {
        *self.shared.lock_stream() = Some(setpoint);
        self.shared.send_setpoint(&setpoint);
    }

    /// At least one setpoint has reached the transport.
    pub fn has_setpoint(&self) -> bool {
        self.shared.setpoint_sent.load(Ordering::Acquire)
    }

    /// Stop re-sending setpoints.
    pub fn clear_stream(&self) {
        *self.shared.lock_stream() = None;
    }
}

impl Drop for MavLink {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Relaxed);
        // Each loop checks `running` at least once per read timeout or
        // setpoint period
        for handle in self.threads.drain(..) {
            if handle.join().is_err() {
                warn!("Link thread panicked");
            }
        }
    }
}

fn spawn<F>(name: &str, body: F) -> io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new().name(name.to_string()).spawn(body)
}

fn receive_loop(shared: Arc<Shared>, mut source: Box<dyn MessageSource>) {
    while shared.running.load(Ordering::Relaxed) {
        match source.recv() {
            Ok(None) => {}
            Ok(Some((header, msg))) => {
                let mut state = shared.lock_state();
                let had_target = state.target().is_some();
                let got_ack = state.handle_message(&header, &msg, Instant::now());
                let discovered = !had_target && state.target().is_some();
                drop(state);
                if got_ack || discovered {
                    shared.changed.notify_all();
                }
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                warn!("Link closed by the remote end");
                break;
            }
            Err(e) => {
                debug!("Receive error: {e}");
                thread::sleep(RECEIVE_ERROR_BACKOFF);
            }
        }
    }
}

fn stream_loop(shared: Arc<Shared>) {
    let period = shared.config.setpoint_period();
    let mut next_heartbeat = Instant::now();
    while shared.running.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= next_heartbeat {
            if let Err(e) = shared.send(&message::gcs_heartbeat()) {
                debug!("Heartbeat send failed: {e}");
            }
            next_heartbeat = now + shared.config.heartbeat_interval;
        }

        let setpoint = *shared.lock_stream();
        if let Some(setpoint) = setpoint {
            shared.send_setpoint(&setpoint);
        }
        thread::sleep(period);
    }
}
