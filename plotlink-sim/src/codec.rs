//! Device-side framing: CR-terminated commands in, newline-terminated
//! replies out.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::device::LineEnding;

/// Longest command line the firmware buffers.
pub const MAX_COMMAND_LENGTH: usize = 64;

#[derive(Debug, Default)]
pub struct DeviceCodec {
    ending: LineEnding,
}

impl DeviceCodec {
    pub fn new(ending: LineEnding) -> Self {
        Self { ending }
    }
}

impl Decoder for DeviceCodec {
    type Item = String;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(pos) = src.iter().position(|&b| b == b'\r') else {
            if src.len() > MAX_COMMAND_LENGTH {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "command line too long",
                ));
            }
            return Ok(None);
        };
        let line = src.split_to(pos);
        src.advance(1);
        let text = String::from_utf8_lossy(&line);
        Ok(Some(text.trim_matches('\n').to_owned()))
    }
}

impl Encoder<String> for DeviceCodec {
    type Error = std::io::Error;

    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let ending = self.ending.as_str();
        dst.reserve(item.len() + ending.len());
        dst.put_slice(item.as_bytes());
        dst.put_slice(ending.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_carriage_return() {
        let mut codec = DeviceCodec::default();
        let mut src = BytesMut::from(&b"M 1 2\rL 3"[..]);
        assert_eq!(codec.decode(&mut src).unwrap(), Some("M 1 2".to_string()));
        assert_eq!(codec.decode(&mut src).unwrap(), None);
        src.extend_from_slice(b" 4\r\n");
        assert_eq!(codec.decode(&mut src).unwrap(), Some("L 3 4".to_string()));
    }

    #[test]
    fn stray_line_feeds_are_ignored() {
        let mut codec = DeviceCodec::default();
        let mut src = BytesMut::from(&b"\nM 0 0\r"[..]);
        assert_eq!(codec.decode(&mut src).unwrap(), Some("M 0 0".to_string()));
    }

    #[test]
    fn overlong_line_is_rejected() {
        let mut codec = DeviceCodec::default();
        let mut src = BytesMut::from(&[b'9'; MAX_COMMAND_LENGTH + 1][..]);
        assert!(codec.decode(&mut src).is_err());
    }

    #[test]
    fn replies_use_configured_ending() {
        let mut codec = DeviceCodec::new(LineEnding::CrLf);
        let mut dst = BytesMut::new();
        codec.encode("OK".to_string(), &mut dst).unwrap();
        assert_eq!(&dst[..], b"OK\r\n");
    }
}
