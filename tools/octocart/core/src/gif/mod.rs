//! Just enough GIF87a/89a to carry cartridges and screen recordings.
//!
//! Writing is deliberately naive: every frame is emitted as literal LZW codes
//! with a CLEAR before each sub-block, so nothing is ever compressed. Reading
//! is a full LZW decoder and accepts images from any other GIF producer,
//! except interlaced ones.

pub mod lzw;
pub mod reader;
pub mod writer;

use crate::color::Rgb;

pub use reader::decode;
pub use writer::GifWriter;

pub(crate) const IMAGE_DESCRIPTOR: u8 = 0x2C;
pub(crate) const EXTENSION: u8 = 0x21;
pub(crate) const TRAILER: u8 = 0x3B;

pub(crate) const PLAIN_TEXT: u8 = 0x01;
pub(crate) const GRAPHIC_CONTROL: u8 = 0xF9;
pub(crate) const COMMENT: u8 = 0xFE;
pub(crate) const APPLICATION: u8 = 0xFF;

/// One decoded frame. `pixels` always covers the whole logical screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub palette: Vec<Rgb>,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifImage {
    pub width: u16,
    pub height: u16,
    pub frames: Vec<Frame>,
}
