// Length-delimited JSON framing over TCP.
//
// Wire format: a 4-byte big-endian length prefix followed by a JSON payload.
// `write_frame` / `read_frame` move raw bytes; `send_json` / `recv_json` wrap
// them with serde_json so callers on both ends deal only in message types.
//
// `MAX_FRAME_SIZE` bounds the allocation a peer can force with a bogus
// length prefix. The largest legitimate frame is a `TurnResult` carrying two
// roster snapshots, which is a few kilobytes.

use std::io::{self, Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Maximum accepted frame size (1 MB).
pub const MAX_FRAME_SIZE: u32 = 1024 * 1024;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame i/o failed")]
    Io(#[from] io::Error),

    #[error("frame payload is not a valid message")]
    Json(#[from] serde_json::Error),
}

impl FrameError {
    /// True when the peer closed the stream between or during frames.
    pub fn is_eof(&self) -> bool {
        matches!(self, FrameError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
    }
}

/// Write one frame and flush.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|&len| len <= MAX_FRAME_SIZE)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "frame too large: {} bytes (max {MAX_FRAME_SIZE})",
                    payload.len()
                ),
            )
        })?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(payload)?;
    writer.flush()
}

/// Read one frame. `UnexpectedEof` means the stream closed; `InvalidData`
/// means the length prefix exceeds `MAX_FRAME_SIZE`.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = u32::from_be_bytes(len_buf);
    if len > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame too large: {len} bytes (max {MAX_FRAME_SIZE})"),
        ));
    }
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

/// Serialize `msg` to JSON and write it as one frame.
pub fn send_json<W: Write, T: Serialize>(writer: &mut W, msg: &T) -> Result<(), FrameError> {
    let json = serde_json::to_vec(msg)?;
    write_frame(writer, &json)?;
    Ok(())
}

/// Read one frame and deserialize it.
pub fn recv_json<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<T, FrameError> {
    let bytes = read_frame(reader)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn frames_are_length_prefixed() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"duel").unwrap();
        assert_eq!(&buf[..4], &[0, 0, 0, 4]);
        assert_eq!(&buf[4..], b"duel");
    }

    #[test]
    fn empty_frame() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"").unwrap();
        let mut cursor = Cursor::new(&buf);
        assert!(read_frame(&mut cursor).unwrap().is_empty());
    }

    #[test]
    fn rejects_oversized_write() {
        let big = vec![0u8; MAX_FRAME_SIZE as usize + 1];
        let err = write_frame(&mut Vec::new(), &big).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn rejects_oversized_read() {
        let fake_len = (MAX_FRAME_SIZE + 1).to_be_bytes();
        let mut cursor = Cursor::new(fake_len.to_vec());
        let err = read_frame(&mut cursor).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_prefix_is_eof() {
        let mut cursor = Cursor::new(vec![0u8, 1]);
        let err = recv_json::<_, serde_json::Value>(&mut cursor).unwrap_err();
        assert!(err.is_eof());
    }

    #[test]
    fn garbage_payload_is_json_error() {
        let mut buf = Vec::new();
        write_frame(&mut buf, b"{oops").unwrap();
        let err = recv_json::<_, serde_json::Value>(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, FrameError::Json(_)));
        assert!(!err.is_eof());
    }

    #[test]
    fn sequential_frames() {
        let mut buf = Vec::new();
        for word in ["rock", "scissors", "paper"] {
            send_json(&mut buf, &word).unwrap();
        }
        let mut cursor = Cursor::new(&buf);
        for word in ["rock", "scissors", "paper"] {
            let got: String = recv_json(&mut cursor).unwrap();
            assert_eq!(got, word);
        }
    }
}
