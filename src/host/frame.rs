//! Native-messaging wire format: `[length:u32 native-endian][payload:length bytes of UTF-8 JSON]`

use crate::error::{GuardError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest frame the browser may send: 64 MiB
pub const MAX_INBOUND_SIZE: u32 = 64 * 1024 * 1024;
/// Largest frame the browser accepts from a host: 1 MiB
pub const MAX_OUTBOUND_SIZE: u32 = 1024 * 1024;
pub(crate) const HEADER_SIZE: usize = 4;

/// Encode a message as one outbound frame
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(message)?;
    if payload.len() > MAX_OUTBOUND_SIZE as usize {
        return Err(GuardError::Frame(format!(
            "Payload too large: {} bytes (max {})",
            payload.len(),
            MAX_OUTBOUND_SIZE
        )));
    }
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_ne_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Payload length announced by an inbound header
fn payload_len(header: [u8; HEADER_SIZE]) -> Result<usize> {
    let len = u32::from_ne_bytes(header);
    if len > MAX_INBOUND_SIZE {
        return Err(GuardError::Frame(format!(
            "Payload too large: {} bytes (max {})",
            len, MAX_INBOUND_SIZE
        )));
    }
    Ok(len as usize)
}

/// Read one raw frame payload.
///
/// Returns `None` on a clean EOF between frames. EOF inside a frame is an error.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut header = [0u8; HEADER_SIZE];
    let mut filled = 0;
    while filled < HEADER_SIZE {
        let n = reader.read(&mut header[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(GuardError::Frame(format!(
                "EOF after {} of {} header bytes",
                filled, HEADER_SIZE
            )));
        }
        filled += n;
    }

    let len = payload_len(header)?;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            GuardError::Frame(format!("EOF inside {} byte payload", len))
        } else {
            GuardError::Io(e)
        }
    })?;
    Ok(Some(payload))
}

/// Read and parse one message; `None` on a clean EOF
pub async fn read_message<R, T>(reader: &mut R) -> Result<Option<T>>
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
{
    match read_frame(reader).await? {
        Some(payload) => Ok(Some(serde_json::from_slice(&payload)?)),
        None => Ok(None),
    }
}

/// Encode and write one message, then flush
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let buf = encode(message)?;
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_encode_header() {
        let encoded = encode(&json!({"a": 1})).unwrap();
        let len = u32::from_ne_bytes([encoded[0], encoded[1], encoded[2], encoded[3]]);
        assert_eq!(len as usize, encoded.len() - HEADER_SIZE);
        assert_eq!(&encoded[HEADER_SIZE..], br#"{"a":1}"#);
    }

    #[tokio::test]
    async fn test_read_message_typed() {
        let encoded = encode(&json!({"type": "TOGGLE_PROTECTION"})).unwrap();
        let mut reader = encoded.as_slice();

        let value: Value = read_message(&mut reader).await.unwrap().unwrap();
        assert_eq!(value["type"], "TOGGLE_PROTECTION");
        assert!(read_message::<_, Value>(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_payload_too_large() {
        let header = (MAX_INBOUND_SIZE + 1).to_ne_bytes();
        let mut reader = &header[..];
        assert!(matches!(
            read_frame(&mut reader).await,
            Err(GuardError::Frame(_))
        ));
    }

    #[test]
    fn test_encode_payload_too_large() {
        let big = "x".repeat(MAX_OUTBOUND_SIZE as usize);
        assert!(matches!(encode(&json!({ "s": big })), Err(GuardError::Frame(_))));
    }

    #[tokio::test]
    async fn test_read_frames_until_eof() {
        let mut input = encode(&json!({"n": 1})).unwrap();
        input.extend(encode(&json!({"n": 2})).unwrap());
        let mut reader = input.as_slice();

        let first = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(serde_json::from_slice::<Value>(&first).unwrap()["n"], 1);
        let second = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(serde_json::from_slice::<Value>(&second).unwrap()["n"], 2);
        assert!(read_frame(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_frame_split_reads() {
        let encoded = encode(&json!({"n": 3})).unwrap();
        let mut reader = tokio_test::io::Builder::new()
            .read(&encoded[..1])
            .read(&encoded[1..HEADER_SIZE + 2])
            .read(&encoded[HEADER_SIZE + 2..])
            .build();

        let payload = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(serde_json::from_slice::<Value>(&payload).unwrap()["n"], 3);
        assert!(read_frame(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_frame_truncated() {
        let encoded = encode(&json!({"n": 1})).unwrap();

        let mut header_only = &encoded[..2];
        assert!(matches!(
            read_frame(&mut header_only).await,
            Err(GuardError::Frame(_))
        ));

        let mut short_payload = &encoded[..encoded.len() - 1];
        assert!(matches!(
            read_frame(&mut short_payload).await,
            Err(GuardError::Frame(_))
        ));
    }

    #[tokio::test]
    async fn test_write_message() {
        let mut out = Vec::new();
        write_message(&mut out, &json!({"ok": true})).await.unwrap();
        let value: Value = read_message(&mut out.as_slice()).await.unwrap().unwrap();
        assert_eq!(value["ok"], true);
    }
}
