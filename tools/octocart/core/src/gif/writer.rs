use log::debug;

use crate::byte_sink::ByteSink;
use crate::color::{table_depth, Rgb};
use crate::error::{FormatError, OverflowError};
use crate::gif::{APPLICATION, COMMENT, EXTENSION, GRAPHIC_CONTROL, IMAGE_DESCRIPTOR, TRAILER};

/// Incrementally builds a GIF89a stream. Each writer owns its own buffer;
/// nothing is shared between recordings or cartridges.
#[derive(Debug)]
pub struct GifWriter {
    sink: ByteSink,
    width: u16,
    height: u16,
    global_depth: u8,
    frames: usize,
}

impl GifWriter {
    /// Header, logical screen descriptor and global color table.
    ///
    /// `colors` is padded with black up to the next power of two.
    pub fn begin(width: u16, height: u16, colors: &[Rgb]) -> Result<Self, FormatError> {
        let depth = table_depth(colors.len())?;
        let mut sink = ByteSink::new();

        sink.text("GIF89a");
        sink.short(width);
        sink.short(height);
        sink.byte(0xF0 | (depth - 1)); // global table, 8 bits per channel
        sink.byte(0); // background color index
        sink.byte(0); // square pixels
        write_color_table(&mut sink, colors, depth);

        Ok(Self {
            sink,
            width,
            height,
            global_depth: depth,
            frames: 0,
        })
    }

    /// A comment extension holding `text` as one sub-block.
    pub fn comment(&mut self, text: &str) -> Result<(), OverflowError> {
        let len = text.len();
        if len > 255 {
            return Err(OverflowError::Comment(len));
        }
        self.sink.byte(EXTENSION);
        self.sink.byte(COMMENT);
        if len > 0 {
            self.sink.byte(len as u8);
            self.sink.text(text);
        }
        self.sink.byte(0);
        Ok(())
    }

    /// NETSCAPE2.0 looping extension, 0 repeats forever.
    pub fn repeat(&mut self, count: u16) {
        self.sink.byte(EXTENSION);
        self.sink.byte(APPLICATION);
        self.sink.byte(11);
        self.sink.text("NETSCAPE2.0");
        self.sink.byte(3);
        self.sink.byte(1); // loop sub-block id
        self.sink.short(count);
        self.sink.byte(0);
    }

    /// Appends a full-screen frame shown for `delay` hundredths of a second.
    ///
    /// With `colors` the frame carries its own local color table, otherwise
    /// its indices refer to the global table.
    pub fn frame(&mut self, pixels: &[u8], delay: u16, colors: Option<&[Rgb]>) -> Result<(), FormatError> {
        let expected = self.width as usize * self.height as usize;
        if pixels.len() != expected {
            return Err(FormatError::FrameSize { expected, actual: pixels.len() });
        }

        let depth = match colors {
            Some(c) => table_depth(c.len())?,
            None => self.global_depth,
        };
        let table_len = 1usize << depth;
        if let Some(&index) = pixels.iter().find(|&&p| p as usize >= table_len) {
            return Err(FormatError::PixelOutOfRange { index, colors: table_len });
        }

        self.sink.byte(EXTENSION);
        self.sink.byte(GRAPHIC_CONTROL);
        self.sink.byte(4);
        self.sink.byte(0b000_001_0_0); // do not dispose, no transparency
        self.sink.short(delay);
        self.sink.byte(0);
        self.sink.byte(0);

        self.sink.byte(IMAGE_DESCRIPTOR);
        self.sink.short(0);
        self.sink.short(0);
        self.sink.short(self.width);
        self.sink.short(self.height);
        match colors {
            Some(c) => {
                self.sink.byte(0x80 | (depth - 1));
                write_color_table(&mut self.sink, c, depth);
            }
            None => self.sink.byte(0),
        }

        write_literal_codes(&mut self.sink, pixels, min_code_size(depth));
        self.frames += 1;
        Ok(())
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.sink.byte(TRAILER);
        debug!("gif finished: {} frames, {} bytes", self.frames, self.sink.len());
        self.sink.into_bytes()
    }
}

fn write_color_table(sink: &mut ByteSink, colors: &[Rgb], depth: u8) {
    for i in 0..1usize << depth {
        let c = colors.get(i).copied().unwrap_or(Rgb::BLACK);
        sink.byte(c.r());
        sink.byte(c.g());
        sink.byte(c.b());
    }
}

/// 7 gives 8-bit codes, so every pixel is one byte. A 256 color table
/// can't fit under CLEAR at that width and steps up to 9-bit codes.
pub(crate) fn min_code_size(depth: u8) -> u8 {
    if depth <= 7 { 7 } else { 8 }
}

/// Pixels per sub-block. The block must end on a byte boundary and the
/// decoder's table must never grow past the starting code width.
fn pixels_per_block(code_size: u8) -> usize {
    if code_size == 7 { 64 } else { 63 }
}

/// Emits `pixels` as an uncompressed LZW stream: each sub-block is a CLEAR
/// followed by raw indices.
fn write_literal_codes(sink: &mut ByteSink, pixels: &[u8], code_size: u8) {
    let width = code_size as u32 + 1;
    let clear = 1u32 << code_size;

    sink.byte(code_size);
    let mut block = Vec::with_capacity(255);
    for chunk in pixels.chunks(pixels_per_block(code_size)) {
        let mut acc = 0u32;
        let mut bits = 0u32;
        for code in std::iter::once(clear).chain(chunk.iter().map(|&p| p as u32)) {
            acc |= code << bits;
            bits += width;
            while bits >= 8 {
                block.push(acc as u8);
                acc >>= 8;
                bits -= 8;
            }
        }
        if bits > 0 {
            block.push(acc as u8);
        }
        sink.byte(block.len() as u8);
        sink.bytes(&block);
        block.clear();
    }
    sink.byte(0);
}
