/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

//! Frame I/O for the wire protocol.
//!
//! The transport's only framing duty is to delimit complete envelopes on a
//! byte stream; the envelope itself carries every discriminator the engine
//! needs, so the frame header is just a length prefix.
//!
//! # Wire Format
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ Frame Length (4 bytes, big-endian u32, excludes the prefix)   │
//! ├───────────────────────────────────────────────────────────────┤
//! │ Envelope (JSON, see crate::message::envelope)                 │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::message::{Envelope, NodeError};

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Maximum frame size (16 MiB hard limit).
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Reads one length-prefixed frame from the stream.
///
/// # Errors
///
/// * [`NodeError::ConnectionClosed`] — clean EOF at a frame boundary.
/// * [`NodeError::MalformedMessage`] — the prefix announces more than
///   `max_size` (or the hard limit) bytes, or the stream ends mid-frame.
/// * [`NodeError::Io`] — any other read failure.
pub async fn read_frame<R>(reader: &mut R, max_size: usize) -> Result<Vec<u8>, NodeError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    reader.read_exact(&mut prefix).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            NodeError::ConnectionClosed
        } else {
            NodeError::Io(e.to_string())
        }
    })?;

    let length = u32::from_be_bytes(prefix) as usize;
    if length > max_size {
        return Err(NodeError::MalformedMessage(format!(
            "frame size {length} exceeds maximum {max_size}"
        )));
    }
    if length > MAX_FRAME_SIZE {
        return Err(NodeError::MalformedMessage(format!(
            "frame size {length} exceeds hard limit {MAX_FRAME_SIZE}"
        )));
    }

    let mut frame = vec![0u8; length];
    reader.read_exact(&mut frame).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            NodeError::MalformedMessage("stream ended mid-frame".to_string())
        } else {
            NodeError::Io(e.to_string())
        }
    })?;

    Ok(frame)
}

/// Writes one length-prefixed frame to the stream and flushes it.
///
/// # Errors
///
/// Returns [`NodeError::MalformedMessage`] if `frame` exceeds the `u32`
/// range, or [`NodeError::Io`] on write failure.
pub async fn write_frame<W>(writer: &mut W, frame: &[u8]) -> Result<(), NodeError>
where
    W: AsyncWrite + Unpin,
{
    let length: u32 = frame
        .len()
        .try_into()
        .map_err(|_| NodeError::MalformedMessage("frame too large for u32 prefix".to_string()))?;

    writer
        .write_all(&length.to_be_bytes())
        .await
        .map_err(|e| NodeError::Io(e.to_string()))?;
    writer
        .write_all(frame)
        .await
        .map_err(|e| NodeError::Io(e.to_string()))?;
    writer
        .flush()
        .await
        .map_err(|e| NodeError::Io(e.to_string()))?;

    Ok(())
}

/// Reads and decodes one envelope.
pub async fn read_envelope<R>(reader: &mut R, max_size: usize) -> Result<Envelope, NodeError>
where
    R: AsyncRead + Unpin,
{
    let frame = read_frame(reader, max_size).await?;
    Envelope::decode(&frame)
}

/// Encodes and writes one envelope.
pub async fn write_envelope<W>(writer: &mut W, envelope: &Envelope) -> Result<(), NodeError>
where
    W: AsyncWrite + Unpin,
{
    let frame = envelope.encode()?;
    write_frame(writer, &frame).await
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[tokio::test]
    async fn frame_round_trip() {
        let mut buffer = Vec::new();
        write_frame(&mut buffer, b"test payload").await.unwrap();

        let mut reader = Cursor::new(buffer);
        let frame = read_frame(&mut reader, 1024).await.unwrap();
        assert_eq!(frame, b"test payload");
    }

    #[tokio::test]
    async fn envelope_round_trip() {
        let envelope = Envelope::service_request("echo", 42, b"hi".to_vec());
        let mut buffer = Vec::new();
        write_envelope(&mut buffer, &envelope).await.unwrap();

        let mut reader = Cursor::new(buffer);
        let decoded = read_envelope(&mut reader, 1024).await.unwrap();
        assert_eq!(decoded, envelope);
    }

    #[tokio::test]
    async fn oversized_frames_are_rejected() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&10_000u32.to_be_bytes());
        // No payload needed; the size check fires first.

        let mut reader = Cursor::new(buffer);
        let result = read_frame(&mut reader, 100).await;
        assert!(matches!(result, Err(NodeError::MalformedMessage(_))));
    }

    #[tokio::test]
    async fn truncated_frames_are_malformed() {
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&8u32.to_be_bytes());
        buffer.extend_from_slice(b"shrt");

        let mut reader = Cursor::new(buffer);
        let result = read_frame(&mut reader, 1024).await;
        assert!(matches!(result, Err(NodeError::MalformedMessage(_))));
    }

    #[tokio::test]
    async fn eof_at_a_frame_boundary_is_connection_closed() {
        let mut reader = Cursor::new(Vec::<u8>::new());
        let result = read_frame(&mut reader, 1024).await;
        assert!(matches!(result, Err(NodeError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn garbage_inside_an_intact_frame_is_malformed() {
        let mut buffer = Vec::new();
        write_frame(&mut buffer, b"{not an envelope").await.unwrap();

        let mut reader = Cursor::new(buffer);
        let result = read_envelope(&mut reader, 1024).await;
        assert!(matches!(result, Err(NodeError::MalformedMessage(_))));
    }
}
