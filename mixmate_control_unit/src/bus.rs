//! UDP emulation of the host bus.
//!
//! The bridge plays the bus-event context on its own thread:
//!
//! | Datagram  | Meaning        | Action                                   |
//! |-----------|----------------|------------------------------------------|
//! | non-empty | write frame    | `on_receive`, no reply                   |
//! | empty     | read request   | `on_request`, reply sent to the sender   |
//!
//! The socket uses a read timeout so the thread notices shutdown.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{info, trace, warn};

use crate::command::{BusResponse, CommandChannel};

/// Largest datagram accepted; longer frames are truncated by the socket.
const MAX_DATAGRAM: usize = 64;

/// Poll period for the shutdown flag.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// UDP endpoint feeding a [`CommandChannel`].
#[derive(Debug)]
pub struct BusBridge {
    socket: UdpSocket,
    channel: Arc<CommandChannel>,
}

impl BusBridge {
    /// Bind the bridge to `addr`.
    pub fn bind(addr: &str, channel: Arc<CommandChannel>) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(Some(READ_TIMEOUT))?;
        Ok(Self { socket, channel })
    }

    /// Bound address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Apply one datagram. Returns the reply for read requests.
    pub fn handle(&self, payload: &[u8]) -> Option<BusResponse> {
        if payload.is_empty() {
            Some(self.channel.on_request())
        } else {
            self.channel.on_receive(payload);
            None
        }
    }

    /// Serve datagrams on a dedicated thread until `running` clears.
    pub fn spawn(self, running: Arc<AtomicBool>) -> io::Result<JoinHandle<()>> {
        let addr = self.local_addr()?;
        info!(%addr, "Bus bridge listening");
        thread::Builder::new()
            .name("bus_bridge".into())
            .spawn(move || self.serve(&running))
    }

    fn serve(&self, running: &AtomicBool) {
        let mut buf = [0u8; MAX_DATAGRAM];
        while running.load(Ordering::Acquire) {
            let (len, peer) = match self.socket.recv_from(&mut buf) {
                Ok(received) => received,
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "bus receive failed");
                    thread::sleep(READ_TIMEOUT);
                    continue;
                }
            };
            trace!(%peer, len, "datagram");
            if let Some(reply) = self.handle(&buf[..len]) {
                if let Err(e) = self.socket.send_to(&reply, peer) {
                    warn!(%peer, error = %e, "bus reply failed");
                }
            }
        }
        info!("Bus bridge stopped");
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
