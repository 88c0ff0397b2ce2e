//! Animated GIF capture, one emulator tick at a time.

use log::{debug, trace};

use crate::color::Rgb;
use crate::error::{CartError, FormatError};
use crate::gif::GifWriter;

/// GIF delays count hundredths of a second; a tick at 60Hz is close enough to 2.
const CENTISECONDS_PER_TICK: u32 = 2;

struct Held {
    pixels: Vec<u8>,
    palette: Vec<Rgb>,
    ticks: u32,
}

/// Collapses runs of identical ticks into single frames with longer delays.
pub struct Recorder {
    gif: GifWriter,
    global: Vec<Rgb>,
    held: Option<Held>,
    frames: usize,
}

impl Recorder {
    pub fn start(width: u16, height: u16, palette: &[Rgb], comment: &str) -> Result<Self, CartError> {
        let mut gif = GifWriter::begin(width, height, palette)?;
        gif.comment(comment)?;
        gif.repeat(0);
        Ok(Self { gif, global: palette.to_vec(), held: None, frames: 0 })
    }

    pub fn tick(&mut self, pixels: &[u8], palette: &[Rgb]) -> Result<(), FormatError> {
        if let Some(held) = &mut self.held {
            if held.pixels == pixels && held.palette == palette {
                held.ticks += 1;
                return Ok(());
            }
        }
        self.flush()?;
        self.held = Some(Held { pixels: pixels.to_vec(), palette: palette.to_vec(), ticks: 1 });
        Ok(())
    }

    fn flush(&mut self) -> Result<(), FormatError> {
        let Some(held) = self.held.take() else {
            return Ok(());
        };
        let delay = (held.ticks * CENTISECONDS_PER_TICK).min(u16::MAX as u32) as u16;
        let local = (held.palette != self.global).then_some(held.palette.as_slice());
        trace!("frame {} held for {} ticks", self.frames, held.ticks);
        self.gif.frame(&held.pixels, delay, local)?;
        self.frames += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Result<Vec<u8>, FormatError> {
        self.flush()?;
        debug!("recorded {} frames", self.frames);
        Ok(self.gif.finish())
    }
}
