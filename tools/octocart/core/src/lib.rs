//! Octo cartridges: programs smuggled inside GIF images.
//!
//! The [`gif`] module is a small standalone GIF codec; [`cartridge`] layers
//! the payload format on top of it, and [`recording`] turns emulator ticks
//! into animated GIFs. [`standalone`] reads and writes the same payload as
//! the header of a single-page HTML export.

pub mod byte_sink;
pub mod cartridge;
pub mod color;
pub mod error;
pub mod gif;
pub mod label;
pub mod palette;
pub mod recording;
pub mod standalone;

pub use cartridge::options::{Options, OPTION_FLAGS};
pub use cartridge::{pack, pack_with_rng, unpack, Cartridge};
pub use color::Rgb;
pub use error::{CartError, FormatError, OverflowError};
pub use gif::{decode, Frame, GifImage, GifWriter};
pub use recording::Recorder;
