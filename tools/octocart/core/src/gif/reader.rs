use log::{debug, warn};

use crate::color::Rgb;
use crate::error::FormatError;
use crate::gif::lzw::decompress;
use crate::gif::{
    Frame, GifImage, APPLICATION, COMMENT, EXTENSION, GRAPHIC_CONTROL, IMAGE_DESCRIPTOR, PLAIN_TEXT, TRAILER,
};
use crate::palette::composite;

/// Cursor over the raw stream. Running off the end is an error rather than
/// a stream of zeros.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn byte(&mut self) -> Result<u8, FormatError> {
        let b = *self.bytes.get(self.pos).ok_or(FormatError::Truncated(self.pos))?;
        self.pos += 1;
        Ok(b)
    }

    fn short(&mut self) -> Result<u16, FormatError> {
        Ok(self.byte()? as u16 | (self.byte()? as u16) << 8)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        let slice = self.bytes.get(self.pos..self.pos + len).ok_or(FormatError::Truncated(self.bytes.len()))?;
        self.pos += len;
        Ok(slice)
    }

    fn color_table(&mut self, packed: u8) -> Result<Vec<Rgb>, FormatError> {
        let len = 1usize << ((packed & 0x07) + 1);
        let raw = self.take(len * 3)?;
        Ok(raw.chunks_exact(3).map(|c| Rgb::new(c[0], c[1], c[2])).collect())
    }

    /// Concatenated contents of a sub-block chain, terminator consumed.
    fn sub_blocks(&mut self) -> Result<Vec<u8>, FormatError> {
        let mut data = Vec::new();
        loop {
            let len = self.byte()? as usize;
            if len == 0 {
                return Ok(data);
            }
            data.extend_from_slice(self.take(len)?);
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}

/// Parses a GIF87a/89a stream into full-canvas frames.
///
/// Frames smaller than the canvas, or offset into it, are drawn over a copy
/// of the previous frame; see [`composite`].
pub fn decode(bytes: &[u8]) -> Result<GifImage, FormatError> {
    if !bytes.starts_with(b"GIF") {
        return Err(FormatError::BadMagic);
    }
    let mut r = Cursor { bytes, pos: 6 };

    let width = r.short()?;
    let height = r.short()?;
    let packed = r.byte()?;
    r.short()?; // background index, aspect ratio
    let global = if packed & 0x80 != 0 { Some(r.color_table(packed)?) } else { None };

    let mut frames: Vec<Frame> = Vec::new();
    let mut terminated = false;

    while !r.at_end() {
        let offset = r.pos;
        match r.byte()? {
            TRAILER => {
                terminated = true;
                break;
            }
            IMAGE_DESCRIPTOR => {
                let left = r.short()?;
                let top = r.short()?;
                let w = r.short()?;
                let h = r.short()?;
                let flags = r.byte()?;
                let local = if flags & 0x80 != 0 { Some(r.color_table(flags)?) } else { None };
                if flags & 0x40 != 0 {
                    return Err(FormatError::Interlaced);
                }

                let min_code_size = r.byte()?;
                let data = r.sub_blocks()?;
                let mut pixels = decompress(min_code_size, &data)?;

                let palette = local.or_else(|| global.clone()).ok_or(FormatError::MissingPalette(frames.len()))?;

                if w != width || h != height || left != 0 || top != 0 {
                    let Some(previous) = frames.last() else {
                        return Err(FormatError::PartialFirstFrame { left, top, width: w, height: h });
                    };
                    // short data leaves the rest of the rectangle untouched
                    let mut canvas = previous.pixels.clone();
                    composite(&mut canvas, width as usize, height as usize, &pixels, w as usize, h as usize, left as i32, top as i32);
                    pixels = canvas;
                } else if pixels.len() != width as usize * height as usize {
                    warn!("frame {} decoded to {} pixels, expected {}", frames.len(), pixels.len(), width as usize * height as usize);
                    pixels.resize(width as usize * height as usize, 0);
                }

                debug!("frame {}: {}x{} at ({},{}), {} colors", frames.len(), w, h, left, top, palette.len());
                frames.push(Frame { palette, pixels });
            }
            EXTENSION => {
                let label = r.byte()?;
                match label {
                    PLAIN_TEXT | GRAPHIC_CONTROL | COMMENT | APPLICATION => {
                        let skipped = r.sub_blocks()?;
                        debug!("skipped extension {:#04X} ({} bytes)", label, skipped.len());
                    }
                    _ => return Err(FormatError::UnknownExtension { label, offset }),
                }
            }
            block => return Err(FormatError::UnknownBlock { block, offset }),
        }
    }

    if !terminated {
        warn!("gif stream ended without a trailer");
    }

    Ok(GifImage { width, height, frames })
}
