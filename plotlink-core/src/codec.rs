//! `tokio_util` codec for async plotter streams.
//!
//! Decoding frames device output with a [`LineFramer`] and classifies each
//! line; encoding writes rendered [`Command`]s.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::encoder::Command;
use crate::error::PlotError;
use crate::framer::LineFramer;
use crate::message::DeviceMessage;

#[derive(Debug, Default)]
pub struct PlotterCodec {
    framer: LineFramer,
}

impl PlotterCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self {
            framer: LineFramer::with_max_line_length(max_line_length),
        }
    }
}

impl Decoder for PlotterCodec {
    type Item = DeviceMessage;
    type Error = PlotError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Bytes move into the framer as they are scanned, so `src` never
        // holds a partial line between calls.
        while src.has_remaining() {
            if let Some(line) = self.framer.push(src.get_u8()) {
                return Ok(Some(DeviceMessage::from(line)));
            }
        }
        Ok(None)
    }
}

impl Encoder<Command> for PlotterCodec {
    type Error = PlotError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.encode_into(dst);
        Ok(())
    }
}
