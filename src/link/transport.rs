//! Raw MAVLink v2 transports with independent read and write halves.
//!
//! The receiver thread owns the [`MessageSource`]; senders share the
//! [`MessageSink`]. Sources return after [`READ_TIMEOUT`] without a frame so
//! the receiver can notice shutdown, and a pending read never blocks a write.

use std::io::{self, Cursor, Read, Write};
use std::net::{SocketAddr, TcpStream, UdpSocket};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::debug;
use mavlink::common::MavMessage;
use mavlink::error::MessageReadError;
use mavlink::peek_reader::PeekReader;
use mavlink::MavHeader;

use crate::connection::ConnectionUrl;

/// Longest a source blocks waiting for data.
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Largest MAVLink v2 frame
const MAX_FRAME_LEN: usize = 280;

/// Incoming half of a transport.
pub trait MessageSource: Send {
    /// Next message, or `None` if no complete frame arrived within the read
    /// timeout.
    fn recv(&mut self) -> io::Result<Option<(MavHeader, MavMessage)>>;
}

/// Outgoing half of a transport.
pub trait MessageSink: Send {
    fn send(&mut self, header: MavHeader, msg: &MavMessage) -> io::Result<()>;
}

pub type Halves = (Box<dyn MessageSource>, Box<dyn MessageSink>);

/// Open `url` and split it into a source and a sink.
///
/// TCP connects out, UDP binds and answers the first peer heard from,
/// serial opens the device at the given baud rate.
pub fn open(url: &ConnectionUrl) -> io::Result<Halves> {
    match url {
        ConnectionUrl::Tcp { host, port } => {
            let stream = TcpStream::connect((host.as_str(), *port))?;
            stream.set_nodelay(true)?;
            stream.set_read_timeout(Some(READ_TIMEOUT))?;
            let writer = stream.try_clone()?;
            Ok((
                Box::new(StreamSource::new(stream)),
                Box::new(StreamSink::new(writer)),
            ))
        }
        ConnectionUrl::Udp { host, port } => {
            let socket = UdpSocket::bind((host.as_str(), *port))?;
            socket.set_read_timeout(Some(READ_TIMEOUT))?;
            let peer = Arc::new(Mutex::new(None));
            let sink = DatagramSink {
                socket: socket.try_clone()?,
                peer: Arc::clone(&peer),
            };
            let source = DatagramSource {
                socket,
                peer,
                buf: vec![0u8; MAX_FRAME_LEN],
            };
            Ok((Box::new(source), Box::new(sink)))
        }
        ConnectionUrl::Serial { path, baud } => {
            let port = serialport::new(path.as_str(), *baud)
                .timeout(READ_TIMEOUT)
                .open()?;
            let writer = port.try_clone()?;
            Ok((
                Box::new(StreamSource::new(port)),
                Box::new(StreamSink::new(writer)),
            ))
        }
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}

fn encode(header: MavHeader, msg: &MavMessage) -> io::Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::with_capacity(MAX_FRAME_LEN));
    mavlink::write_v2_msg(&mut buf, header, msg)
        .map_err(|e| io::Error::other(format!("{e:?}")))?;
    Ok(buf.into_inner())
}

/// Frames read from a byte stream (TCP or serial).
pub struct StreamSource<R: Read> {
    reader: PeekReader<R>,
}

impl<R: Read> StreamSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: PeekReader::new(reader),
        }
    }
}

impl<R: Read + Send> MessageSource for StreamSource<R> {
    fn recv(&mut self) -> io::Result<Option<(MavHeader, MavMessage)>> {
        match mavlink::read_v2_msg::<MavMessage, _>(&mut self.reader) {
            Ok(frame) => Ok(Some(frame)),
            Err(MessageReadError::Io(e)) if is_timeout(&e) => Ok(None),
            Err(MessageReadError::Io(e)) => Err(e),
            Err(e) => {
                debug!("Dropped unparseable message: {e}");
                Ok(None)
            }
        }
    }
}

/// Frames written to a byte stream (TCP or serial).
pub struct StreamSink<W: Write> {
    writer: W,
}

impl<W: Write> StreamSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> MessageSink for StreamSink<W> {
    fn send(&mut self, header: MavHeader, msg: &MavMessage) -> io::Result<()> {
        self.writer.write_all(&encode(header, msg)?)?;
        self.writer.flush()
    }
}

/// One frame per datagram; remembers the first sender as the peer.
struct DatagramSource {
    socket: UdpSocket,
    peer: Arc<Mutex<Option<SocketAddr>>>,
    buf: Vec<u8>,
}

impl MessageSource for DatagramSource {
    fn recv(&mut self) -> io::Result<Option<(MavHeader, MavMessage)>> {
        let (len, addr) = match self.socket.recv_from(&mut self.buf) {
            Ok(received) => received,
            Err(e) if is_timeout(&e) => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut peer = self.peer.lock().unwrap_or_else(PoisonError::into_inner);
        if peer.is_none() {
            debug!("Peer discovered at {addr}");
            *peer = Some(addr);
        }
        drop(peer);

        let mut reader = PeekReader::new(Cursor::new(&self.buf[..len]));
        Ok(mavlink::read_v2_msg::<MavMessage, _>(&mut reader).ok())
    }
}

/// Sends to the peer found by [`DatagramSource`]. Drops messages until then.
struct DatagramSink {
    socket: UdpSocket,
    peer: Arc<Mutex<Option<SocketAddr>>>,
}

impl MessageSink for DatagramSink {
    fn send(&mut self, header: MavHeader, msg: &MavMessage) -> io::Result<()> {
        let peer = *self.peer.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(addr) = peer else {
            return Ok(());
        };
        self.socket.send_to(&encode(header, msg)?, addr)?;
        Ok(())
    }
}
