//! Link tests against a scripted autopilot on loopback UDP and TCP sockets.

use std::io;
use std::net::{TcpListener, UdpSocket};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use mavlink::common::{
    MavAutopilot, MavCmd, MavLandedState, MavMessage, MavModeFlag, MavResult, MavState, MavType,
    MavVtolState, COMMAND_ACK_DATA, COMMAND_LONG_DATA, EXTENDED_SYS_STATE_DATA, HEARTBEAT_DATA,
};
use mavlink::error::MessageReadError;
use mavlink::peek_reader::PeekReader;
use mavlink::{MavConnection, MavHeader};
use offboard_pilot::{CommandOutcome, ConnectionUrl, LinkConfig, MavLink};
use offboard_pilot_core::Setpoint;

type Connection = Box<dyn MavConnection<MavMessage> + Send + Sync>;

/// What the scripted autopilot has received.
#[derive(Default)]
struct Received {
    commands: Vec<COMMAND_LONG_DATA>,
    setpoints: usize,
}

const AUTOPILOT: MavHeader = MavHeader {
    system_id: 1,
    component_id: 1,
    sequence: 0,
};

fn autopilot_heartbeat() -> MavMessage {
    MavMessage::HEARTBEAT(HEARTBEAT_DATA {
        custom_mode: 0,
        mavtype: MavType::MAV_TYPE_QUADROTOR,
        autopilot: MavAutopilot::MAV_AUTOPILOT_PX4,
        base_mode: MavModeFlag::MAV_MODE_FLAG_CUSTOM_MODE_ENABLED,
        system_status: MavState::MAV_STATE_STANDBY,
        mavlink_version: 3,
    })
}

/// Start an autopilot that heartbeats at 10 Hz and answers every
/// COMMAND_LONG with `reply` (or stays silent).
fn spawn_autopilot(
    port: u16,
    reply: Option<MavResult>,
) -> (Arc<Connection>, Arc<Mutex<Received>>) {
    let conn: Arc<Connection> = Arc::new(
        mavlink::connect::<MavMessage>(&format!("udpout:127.0.0.1:{port}"))
            .expect("autopilot socket"),
    );
    let received = Arc::new(Mutex::new(Received::default()));

    let hb_conn = Arc::clone(&conn);
    thread::spawn(move || loop {
        let _ = hb_conn.send(&AUTOPILOT, &autopilot_heartbeat());
        thread::sleep(Duration::from_millis(100));
    });

    let rx_conn = Arc::clone(&conn);
    let rx_received = Arc::clone(&received);
    thread::spawn(move || loop {
        let Ok((_, msg)) = rx_conn.recv() else {
            continue;
        };
        match msg {
            MavMessage::COMMAND_LONG(cmd) => {
                rx_received.lock().unwrap().commands.push(cmd.clone());
                if let Some(result) = reply {
                    let ack = MavMessage::COMMAND_ACK(COMMAND_ACK_DATA {
                        command: cmd.command,
                        result,
                        progress: 0,
                        result_param2: 0,
                        target_system: 245,
                        target_component: 190,
                    });
                    let _ = rx_conn.send(&AUTOPILOT, &ack);
                }
            }
            MavMessage::SET_POSITION_TARGET_LOCAL_NED(_) => {
                rx_received.lock().unwrap().setpoints += 1;
            }
            _ => {}
        }
    });

    (conn, received)
}

fn open_link(port: u16, config: LinkConfig) -> MavLink {
    let url = ConnectionUrl::Udp {
        host: "127.0.0.1".into(),
        port,
    };
    MavLink::open(&url, config).expect("link opens")
}

fn fast_config() -> LinkConfig {
    LinkConfig {
        ack_timeout: Duration::from_millis(100),
        command_retries: 2,
        discovery_interval: Duration::from_millis(50),
        discovery_timeout: Some(Duration::from_secs(5)),
        ..LinkConfig::default()
    }
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

#[test]
fn test_discovery_and_acknowledged_command() {
    let link = open_link(24601, fast_config());
    let _autopilot = spawn_autopilot(24601, Some(MavResult::MAV_RESULT_ACCEPTED));

    let target = link.wait_for_heartbeat().unwrap();
    assert_eq!((target.system_id, target.component_id), (1, 1));
    assert!(link.is_connected());

    let outcome = link.send_command(
        MavCmd::MAV_CMD_COMPONENT_ARM_DISARM,
        [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    );
    assert_eq!(outcome, CommandOutcome::Ack(MavResult::MAV_RESULT_ACCEPTED));
}

#[test]
fn test_unanswered_command_is_retried_then_times_out() {
    let link = open_link(24602, fast_config());
    let (_conn, received) = spawn_autopilot(24602, None);
    link.wait_for_heartbeat().unwrap();

    let outcome = link.send_command(MavCmd::MAV_CMD_NAV_LAND, [0.0; 7]);
    assert_eq!(outcome, CommandOutcome::Timeout);

    assert!(wait_until(Duration::from_secs(1), || {
        received.lock().unwrap().commands.len() == 3
    }));
    let confirmations: Vec<u8> = received
        .lock()
        .unwrap()
        .commands
        .iter()
        .map(|cmd| cmd.confirmation)
        .collect();
    assert_eq!(confirmations, vec![0, 1, 2]);
}

#[test]
fn test_command_without_vehicle_reports_no_system() {
    let link = open_link(24603, fast_config());
    assert_eq!(
        link.send_command(MavCmd::MAV_CMD_NAV_LAND, [0.0; 7]),
        CommandOutcome::NoSystem
    );
    assert!(!link.is_connected());
}

#[test]
fn test_setpoint_is_streamed() {
    let link = open_link(24604, fast_config());
    let (_conn, received) = spawn_autopilot(24604, None);
    link.wait_for_heartbeat().unwrap();

    assert!(!link.has_setpoint());
    link.send_setpoint(Setpoint::ZERO_VELOCITY);
    assert!(link.has_setpoint());

    // 20 Hz re-send keeps the vehicle's offboard watchdog fed
    assert!(wait_until(Duration::from_secs(2), || {
        received.lock().unwrap().setpoints >= 5
    }));

    link.clear_stream();
    thread::sleep(Duration::from_millis(200));
    let settled = received.lock().unwrap().setpoints;
    thread::sleep(Duration::from_millis(300));
    assert_eq!(received.lock().unwrap().setpoints, settled);
}

#[test]
fn test_landed_state_from_telemetry() {
    let link = open_link(24605, fast_config());
    let (conn, _received) = spawn_autopilot(24605, None);
    link.wait_for_heartbeat().unwrap();
    assert!(!link.in_air());

    let in_air = MavMessage::EXTENDED_SYS_STATE(EXTENDED_SYS_STATE_DATA {
        vtol_state: MavVtolState::MAV_VTOL_STATE_UNDEFINED,
        landed_state: MavLandedState::MAV_LANDED_STATE_IN_AIR,
    });
    conn.send(&AUTOPILOT, &in_air).unwrap();
    assert!(wait_until(Duration::from_secs(1), || link.in_air()));
}

/// Autopilot behind a TCP server that sends `heartbeats` heartbeats and then
/// goes silent while keeping the connection open and counting what arrives.
fn spawn_silent_autopilot(heartbeats: usize) -> (u16, Arc<Mutex<Received>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("autopilot listener");
    let port = listener.local_addr().unwrap().port();
    let received = Arc::new(Mutex::new(Received::default()));

    let rx_received = Arc::clone(&received);
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("link connects");
        for _ in 0..heartbeats {
            mavlink::write_v2_msg(&mut stream, AUTOPILOT, &autopilot_heartbeat()).unwrap();
        }

        let mut reader = PeekReader::new(stream.try_clone().unwrap());
        loop {
            match mavlink::read_v2_msg::<MavMessage, _>(&mut reader) {
                Ok((_, MavMessage::COMMAND_LONG(cmd))) => {
                    rx_received.lock().unwrap().commands.push(cmd);
                }
                Ok((_, MavMessage::SET_POSITION_TARGET_LOCAL_NED(_))) => {
                    rx_received.lock().unwrap().setpoints += 1;
                }
                Ok(_) => {}
                Err(MessageReadError::Io(e)) if e.kind() != io::ErrorKind::Interrupted => break,
                Err(_) => {}
            }
        }
        drop(stream);
    });

    (port, received)
}

#[test]
fn test_silent_vehicle_does_not_block_sends() {
    let (port, received) = spawn_silent_autopilot(3);
    let url = ConnectionUrl::Tcp {
        host: "127.0.0.1".into(),
        port,
    };
    let config = fast_config();
    let link = MavLink::open(&url, config.clone()).expect("link opens");
    link.wait_for_heartbeat().unwrap();

    link.send_setpoint(Setpoint::ZERO_VELOCITY);

    let started = Instant::now();
    let outcome = link.send_command(MavCmd::MAV_CMD_NAV_LAND, [0.0; 7]);
    let elapsed = started.elapsed();
    assert_eq!(outcome, CommandOutcome::Timeout);
    let budget = config.ack_timeout * (u32::from(config.command_retries) + 1);
    assert!(elapsed >= budget, "gave up early after {elapsed:?}");
    assert!(
        elapsed < budget + Duration::from_millis(500),
        "blocked for {elapsed:?}"
    );

    assert!(wait_until(Duration::from_secs(1), || {
        received.lock().unwrap().commands.len() == 3
    }));
    let confirmations: Vec<u8> = received
        .lock()
        .unwrap()
        .commands
        .iter()
        .map(|cmd| cmd.confirmation)
        .collect();
    assert_eq!(confirmations, vec![0, 1, 2]);

    // Setpoints keep their 20 Hz rate with nothing inbound
    let before = received.lock().unwrap().setpoints;
    thread::sleep(Duration::from_secs(1));
    let streamed = received.lock().unwrap().setpoints - before;
    assert!(streamed >= 10, "only {streamed} setpoints in 1 s");
}

#[test]
fn test_drop_releases_transport() {
    let link = open_link(24606, fast_config());

    let started = Instant::now();
    drop(link);
    assert!(started.elapsed() < Duration::from_secs(1));

    // The receiver has exited and the socket is closed
    UdpSocket::bind("127.0.0.1:24606").expect("port is free after drop");
}
