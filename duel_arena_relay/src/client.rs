// TCP client for connecting to the duel relay.
//
// - `connect()` opens the TCP connection and spawns a background reader
//   thread that decodes `ServerMessage` frames into an `mpsc` channel.
// - The caller keeps a `BufWriter<TcpStream>` for sending actions.
// - `poll()` drains the inbox without blocking; `recv_timeout()` waits for
//   the next message, which is what the integration tests use.
//
// There is no handshake: the relay assigns a connection id on accept, and
// the first thing a player normally sends is `Join`.

use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use duel_arena_protocol::{ClientMessage, ServerMessage, recv_json, send_json};

use crate::error::ClientError;

/// TCP client for relay communication.
pub struct NetClient {
    writer: BufWriter<TcpStream>,
    inbox: Receiver<ServerMessage>,
    _reader_thread: JoinHandle<()>,
}

impl NetClient {
    pub fn connect(addr: SocketAddr) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).map_err(ClientError::Connect)?;
        let reader_stream = stream.try_clone().map_err(ClientError::Connect)?;

        let (tx, rx) = mpsc::channel();
        let reader_thread = thread::spawn(move || {
            reader_loop(BufReader::new(reader_stream), tx);
        });

        Ok(Self {
            writer: BufWriter::new(stream),
            inbox: rx,
            _reader_thread: reader_thread,
        })
    }

    pub fn join(&mut self, passcode: &str) -> Result<(), ClientError> {
        self.send(&ClientMessage::Join {
            passcode: passcode.into(),
        })
    }

    pub fn swap(&mut self, passcode: &str) -> Result<(), ClientError> {
        self.send(&ClientMessage::Swap {
            passcode: passcode.into(),
        })
    }

    /// Submit a hand. The string is sent as-is; the relay ignores anything
    /// other than "rock", "scissors" or "paper".
    pub fn submit_hand(&mut self, passcode: &str, hand: &str) -> Result<(), ClientError> {
        self.send(&ClientMessage::Hand {
            passcode: passcode.into(),
            hand: hand.into(),
        })
    }

    /// Send Goodbye. The relay then removes this connection from every
    /// session and closes it.
    pub fn disconnect(&mut self) {
        let _ = self.send(&ClientMessage::Goodbye);
    }

    /// Drain all queued server messages (non-blocking).
    pub fn poll(&self) -> Vec<ServerMessage> {
        self.inbox.try_iter().collect()
    }

    /// Wait up to `timeout` for the next server message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ServerMessage> {
        self.inbox.recv_timeout(timeout).ok()
    }

    fn send(&mut self, msg: &ClientMessage) -> Result<(), ClientError> {
        send_json(&mut self.writer, msg)?;
        Ok(())
    }
}

/// Reader thread: decode frames in a loop and push them to the channel.
fn reader_loop(mut reader: BufReader<TcpStream>, tx: mpsc::Sender<ServerMessage>) {
    while let Ok(msg) = recv_json::<_, ServerMessage>(&mut reader) {
        if tx.send(msg).is_err() {
            break; // Caller dropped the client
        }
    }
}
