// Outbound side of the event gateway.
//
// Session logic never touches sockets. It hands each notification to a
// `Gateway`, which owns delivery. `TcpGateway` keeps one buffered write half
// per connection and writes framed JSON. Delivery is best effort: by the time
// a notification is sent the state change is already applied, so a failed
// write is logged and dropped.
//
// Writes happen on the event loop, so every attached socket gets a write
// timeout. A peer that stops reading fails its next write once the socket
// buffer is full; the gateway then drops and shuts down that connection, and
// its reader thread reports the disconnect as a leave.

use std::collections::BTreeMap;
use std::io::BufWriter;
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use duel_arena_protocol::{ConnectionId, ServerMessage, send_json};
use tracing::warn;

pub trait Gateway {
    /// Send `msg` to one connection. Must not fail the caller.
    fn deliver(&mut self, to: ConnectionId, msg: &ServerMessage);
}

/// How long one notification may block on a peer that is not reading.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Gateway writing to live TCP connections.
pub struct TcpGateway {
    writers: BTreeMap<ConnectionId, BufWriter<TcpStream>>,
    write_timeout: Duration,
}

impl Default for TcpGateway {
    fn default() -> Self {
        Self::with_write_timeout(WRITE_TIMEOUT)
    }
}

impl TcpGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_write_timeout(write_timeout: Duration) -> Self {
        Self {
            writers: BTreeMap::new(),
            write_timeout,
        }
    }

    /// Register the write half for a newly accepted connection.
    pub fn attach(&mut self, conn: ConnectionId, stream: TcpStream) {
        if let Err(e) = stream.set_write_timeout(Some(self.write_timeout)) {
            warn!(%conn, error = %e, "failed to set write timeout");
        }
        self.writers.insert(conn, BufWriter::new(stream));
    }

    pub fn detach(&mut self, conn: ConnectionId) {
        self.writers.remove(&conn);
    }

    pub fn connection_count(&self) -> usize {
        self.writers.len()
    }

    /// Close every connection in both directions, which unblocks the
    /// per-connection reader threads on shutdown.
    pub fn shutdown_all(&mut self) {
        for (_, writer) in std::mem::take(&mut self.writers) {
            let _ = writer.get_ref().shutdown(Shutdown::Both);
        }
    }
}

impl Gateway for TcpGateway {
    fn deliver(&mut self, to: ConnectionId, msg: &ServerMessage) {
        let Some(writer) = self.writers.get_mut(&to) else {
            warn!(%to, "dropping notification for unknown connection");
            return;
        };
        if let Err(e) = send_json(writer, msg) {
            warn!(%to, error = %e, "notification delivery failed, dropping connection");
            // A half-written frame leaves the stream unusable.
            if let Some(writer) = self.writers.remove(&to) {
                let (stream, _) = writer.into_parts();
                let _ = stream.shutdown(Shutdown::Both);
            }
        }
    }
}

/// Gateway that records deliveries, for driving sessions in unit tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingGateway {
    pub sent: Vec<(ConnectionId, ServerMessage)>,
}

#[cfg(test)]
impl RecordingGateway {
    /// Messages delivered to `conn`, in order.
    pub fn to(&self, conn: ConnectionId) -> Vec<&ServerMessage> {
        self.sent
            .iter()
            .filter(|(c, _)| *c == conn)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

#[cfg(test)]
impl Gateway for RecordingGateway {
    fn deliver(&mut self, to: ConnectionId, msg: &ServerMessage) {
        self.sent.push((to, msg.clone()));
    }
}

#[cfg(test)]
mod tests {
    use std::io::BufReader;
    use std::net::TcpListener;

    use duel_arena_protocol::recv_json;

    use super::*;

    /// Create a TCP pair: (client_stream, server_stream) on localhost.
    fn tcp_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn delivers_framed_json_to_attached_connection() {
        let (client, server) = tcp_pair();
        let mut gateway = TcpGateway::new();
        gateway.attach(ConnectionId(7), server);
        assert_eq!(gateway.connection_count(), 1);

        gateway.deliver(ConnectionId(7), &ServerMessage::Matched);

        let mut reader = BufReader::new(client);
        let msg: ServerMessage = recv_json(&mut reader).unwrap();
        assert_eq!(msg, ServerMessage::Matched);
    }

    #[test]
    fn unknown_connection_is_ignored() {
        let mut gateway = TcpGateway::new();
        gateway.deliver(ConnectionId(99), &ServerMessage::OpponentLeft);
        assert_eq!(gateway.connection_count(), 0);
    }

    #[test]
    fn detach_stops_delivery() {
        let (_client, server) = tcp_pair();
        let mut gateway = TcpGateway::new();
        gateway.attach(ConnectionId(1), server);
        gateway.detach(ConnectionId(1));
        assert_eq!(gateway.connection_count(), 0);
        gateway.deliver(ConnectionId(1), &ServerMessage::Matched);
    }

    #[test]
    fn attach_sets_write_timeout() {
        let (_client, server) = tcp_pair();
        let observer = server.try_clone().unwrap();
        let mut gateway = TcpGateway::new();
        gateway.attach(ConnectionId(3), server);
        assert_eq!(observer.write_timeout().unwrap(), Some(WRITE_TIMEOUT));
    }

    #[test]
    fn stalled_reader_is_dropped_instead_of_blocking() {
        let (_client, server) = tcp_pair();
        let mut gateway = TcpGateway::with_write_timeout(Duration::from_millis(50));
        gateway.attach(ConnectionId(4), server);

        // The client never reads, so the socket buffers eventually fill.
        let bulky = ServerMessage::Rejected {
            reason: "x".repeat(256 * 1024),
        };
        for _ in 0..2000 {
            gateway.deliver(ConnectionId(4), &bulky);
            if gateway.connection_count() == 0 {
                break;
            }
        }
        assert_eq!(gateway.connection_count(), 0);
    }

    #[test]
    fn shutdown_all_closes_peers() {
        let (client, server) = tcp_pair();
        let mut gateway = TcpGateway::new();
        gateway.attach(ConnectionId(1), server);
        gateway.shutdown_all();
        assert_eq!(gateway.connection_count(), 0);

        let mut reader = BufReader::new(client);
        let err = recv_json::<_, ServerMessage>(&mut reader).unwrap_err();
        assert!(err.is_eof());
    }
}
