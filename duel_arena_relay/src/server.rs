// TCP server and main event loop for the duel relay.
//
// Architecture: thread-per-reader with a central `mpsc` channel.
//
// - **Listener thread**: non-blocking `accept()` loop. Assigns each new
//   connection a `ConnectionId` in accept order and sends
//   `InternalEvent::NewConnection` to the main thread.
// - **Reader threads** (one per client): call `recv_json()` in a loop and
//   forward each `ClientMessage` as `InternalEvent::MessageFrom`. Goodbye,
//   EOF, or a malformed frame becomes `InternalEvent::Disconnected`.
// - **Main thread**: owns the `SessionRegistry` and the `TcpGateway` and
//   handles one event at a time. This is the only place session state
//   changes, so actions for a passcode are never interleaved with a turn
//   resolution for that passcode.
//
// The main thread is the only writer to client sockets (through the
// gateway); reader threads only read.
//
// Shutdown: `RelayHandle::stop` clears `keep_running`. The main loop notices
// within one poll interval, closes every client socket so the reader
// threads exit, and returns.

use std::io::BufReader;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use duel_arena_battle::BattleConfig;
use duel_arena_protocol::{ClientMessage, ConnectionId, recv_json};
use tracing::{debug, info, warn};

use crate::error::RelayError;
use crate::gateway::TcpGateway;
use crate::registry::SessionRegistry;

/// How often idle loops re-check `keep_running`.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Events sent from listener/reader threads to the main thread.
enum InternalEvent {
    NewConnection {
        conn: ConnectionId,
        stream: TcpStream,
    },
    MessageFrom {
        conn: ConnectionId,
        message: ClientMessage,
    },
    Disconnected {
        conn: ConnectionId,
    },
}

/// Handle returned by `start_relay` to control the running server.
pub struct RelayHandle {
    keep_running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl RelayHandle {
    /// Signal the relay to stop and wait for it to shut down.
    pub fn stop(mut self) {
        self.keep_running.store(false, Ordering::SeqCst);
        self.join();
    }

    /// Block until the relay exits on its own.
    pub fn wait(mut self) {
        self.join();
    }

    fn join(&mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Configuration for starting a relay server.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub bind_addr: String,
    pub port: u16,
    pub battle: BattleConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".into(),
            port: 3000,
            battle: BattleConfig::default(),
        }
    }
}

/// Start the relay on a background thread. Returns a handle for stopping it
/// and the bound address (useful with port 0).
pub fn start_relay(config: RelayConfig) -> Result<(RelayHandle, SocketAddr), RelayError> {
    config.battle.validate()?;
    let addr = format!("{}:{}", config.bind_addr, config.port);
    let listener = TcpListener::bind(&addr).map_err(|source| RelayError::Bind {
        addr: addr.clone(),
        source,
    })?;
    let local_addr = listener.local_addr()?;
    listener.set_nonblocking(true)?;
    info!(%local_addr, "relay listening");

    let keep_running = Arc::new(AtomicBool::new(true));
    let keep_running_clone = keep_running.clone();
    let thread = thread::spawn(move || {
        run_relay(listener, config.battle, keep_running_clone);
    });

    Ok((
        RelayHandle {
            keep_running,
            thread: Some(thread),
        },
        local_addr,
    ))
}

/// Main relay loop. Runs until `keep_running` is set to false.
fn run_relay(listener: TcpListener, battle: BattleConfig, keep_running: Arc<AtomicBool>) {
    let mut registry = SessionRegistry::new(battle);
    let mut gateway = TcpGateway::new();
    let (tx, rx): (Sender<InternalEvent>, Receiver<InternalEvent>) = mpsc::channel();

    let keep_running_listener = keep_running.clone();
    let tx_listener = tx.clone();
    thread::spawn(move || accept_loop(listener, tx_listener, keep_running_listener));

    while keep_running.load(Ordering::SeqCst) {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(event) => handle_event(&mut registry, &mut gateway, event, &tx),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    info!(
        sessions = registry.session_count(),
        connections = gateway.connection_count(),
        "relay shutting down"
    );
    gateway.shutdown_all();
}

fn accept_loop(listener: TcpListener, tx: Sender<InternalEvent>, keep_running: Arc<AtomicBool>) {
    let mut next_id = 0u32;
    while keep_running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => {
                let conn = ConnectionId(next_id);
                next_id = next_id.wrapping_add(1);
                info!(%conn, %peer, "connection accepted");
                if let Err(e) = stream.set_nonblocking(false) {
                    warn!(%conn, error = %e, "could not make stream blocking");
                    continue;
                }
                if tx.send(InternalEvent::NewConnection { conn, stream }).is_err() {
                    break;
                }
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                warn!(error = %e, "accept failed, listener stopping");
                break;
            }
        }
    }
}

/// Dispatch a single event.
fn handle_event(
    registry: &mut SessionRegistry,
    gateway: &mut TcpGateway,
    event: InternalEvent,
    tx: &Sender<InternalEvent>,
) {
    match event {
        InternalEvent::NewConnection { conn, stream } => {
            let reader = match stream.try_clone() {
                Ok(s) => BufReader::new(s),
                Err(e) => {
                    warn!(%conn, error = %e, "could not clone stream");
                    return;
                }
            };
            gateway.attach(conn, stream);
            let tx_reader = tx.clone();
            thread::spawn(move || reader_loop(reader, conn, tx_reader));
        }
        InternalEvent::MessageFrom { conn, message } => {
            debug!(%conn, ?message, "action received");
            registry.handle(conn, message, gateway);
        }
        InternalEvent::Disconnected { conn } => {
            let sessions = registry.remove(conn, gateway);
            gateway.detach(conn);
            info!(%conn, sessions, "connection closed");
        }
    }
}

/// Reader loop for a single client. Runs in its own thread.
fn reader_loop(mut reader: BufReader<TcpStream>, conn: ConnectionId, tx: Sender<InternalEvent>) {
    loop {
        match recv_json::<_, ClientMessage>(&mut reader) {
            Ok(ClientMessage::Goodbye) => break,
            Ok(message) => {
                if tx.send(InternalEvent::MessageFrom { conn, message }).is_err() {
                    return;
                }
            }
            Err(e) => {
                if !e.is_eof() {
                    debug!(%conn, error = %e, "dropping connection after bad frame");
                }
                break;
            }
        }
    }
    let _ = tx.send(InternalEvent::Disconnected { conn });
}
