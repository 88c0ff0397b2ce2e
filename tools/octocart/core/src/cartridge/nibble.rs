//! Hiding payload nibbles in the low bits of palette colors.
//!
//! Every base color is fanned out into 16 near-identical variants: bit 3 of
//! the nibble lands in the red LSB, bits 1-2 in the two green LSBs and bit 0
//! in the blue LSB. A pixel's index becomes `base * 16 + nibble`, so two
//! pixels carry one byte, high nibble first.

use crate::color::Rgb;
use crate::error::{CartError, FormatError, OverflowError};
use crate::gif::Frame;

pub const VARIANTS: usize = 16;

/// Bits of each channel left untouched by embedding.
const CARRIER_MASK: u32 = 0xFE_FC_FE;

pub fn embed(base: Rgb, nibble: u8) -> Rgb {
    let v = (nibble & 0x0F) as u32;
    Rgb((base.0 & CARRIER_MASK) | ((v & 0x8) << 13) | ((v & 0x6) << 7) | (v & 0x1))
}

pub fn extract(color: Rgb) -> u8 {
    let x = color.0;
    (((x >> 13) & 0x8) | ((x >> 7) & 0x6) | (x & 0x1)) as u8
}

/// The 16x palette: entry `base * 16 + v` is `colors[base]` carrying `v`.
pub fn expand(colors: &[Rgb]) -> Vec<Rgb> {
    colors
        .iter()
        .flat_map(|&c| (0..VARIANTS as u8).map(move |v| embed(c, v)))
        .collect()
}

/// Re-indexes `pixels` into the expanded palette with `data` layered on top.
/// Pixels past the end of `data` carry zero nibbles. Every pixel must index
/// one of the 16 base colors.
pub fn encode(pixels: &[u8], data: &[u8]) -> Result<Vec<u8>, CartError> {
    let capacity = pixels.len() / 2;
    if data.len() > capacity {
        return Err(OverflowError::Frame { needed: data.len(), capacity }.into());
    }
    pixels
        .iter()
        .enumerate()
        .map(|(i, &p)| -> Result<u8, CartError> {
            if p as usize >= VARIANTS {
                return Err(FormatError::PixelOutOfRange { index: p, colors: VARIANTS }.into());
            }
            let byte = data.get(i / 2).copied().unwrap_or(0);
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0F };
            Ok((p << 4) | nibble)
        })
        .collect()
}

/// Walks embedded bytes across frames in order. A frame's trailing odd
/// pixel holds no data and is skipped.
pub struct NibbleReader<'a> {
    frames: &'a [Frame],
    frame: usize,
    pos: usize,
    read: usize,
}

impl<'a> NibbleReader<'a> {
    pub fn new(frames: &'a [Frame]) -> Self {
        Self { frames, frame: 0, pos: 0, read: 0 }
    }

    /// Bytes still available from the current position on.
    pub fn remaining(&self) -> usize {
        let current = self.frames.get(self.frame).map_or(0, |f| (f.pixels.len().saturating_sub(self.pos)) / 2);
        let rest: usize = self.frames.iter().skip(self.frame + 1).map(|f| f.pixels.len() / 2).sum();
        current + rest
    }

    pub fn byte(&mut self) -> Result<u8, FormatError> {
        loop {
            let frame = self.frames.get(self.frame).ok_or(FormatError::ShortPayload {
                expected: self.read + 1,
                found: self.read,
            })?;
            if self.pos + 1 < frame.pixels.len() {
                let hi = Self::nibble(frame, self.pos)?;
                let lo = Self::nibble(frame, self.pos + 1)?;
                self.pos += 2;
                self.read += 1;
                return Ok((hi << 4) | lo);
            }
            self.frame += 1;
            self.pos = 0;
        }
    }

    fn nibble(frame: &Frame, i: usize) -> Result<u8, FormatError> {
        let index = frame.pixels[i];
        let color = frame.palette.get(index as usize).ok_or(FormatError::PixelOutOfRange {
            index,
            colors: frame.palette.len(),
        })?;
        Ok(extract(*color))
    }

    /// The big-endian length header that opens every cartridge.
    pub fn length(&mut self) -> Result<u32, FormatError> {
        let mut be = [0u8; 4];
        for b in be.iter_mut() {
            *b = self.byte()?;
        }
        Ok(u32::from_be_bytes(be))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: [Rgb; 4] = [Rgb(0x000000), Rgb(0x806650), Rgb(0xF6E39F), Rgb(0xFFFFFF)];

    #[test]
    fn nibbles_survive_any_base_color() {
        for c in BASE.iter().copied().chain([Rgb(0x123456), Rgb(0xFEFCFE), Rgb(0x010301)]) {
            for v in 0..16 {
                let e = embed(c, v);
                assert_eq!(extract(e), v, "{c:?} {v}");
                // only the low bits move
                assert!((e.r() as i32 - c.r() as i32).abs() <= 1);
                assert!((e.g() as i32 - c.g() as i32).abs() <= 3);
                assert!((e.b() as i32 - c.b() as i32).abs() <= 1);
            }
        }
    }

    #[test]
    fn bit_placement() {
        assert_eq!(embed(Rgb::BLACK, 0b1000), Rgb(0x010000));
        assert_eq!(embed(Rgb::BLACK, 0b0110), Rgb(0x000300));
        assert_eq!(embed(Rgb::BLACK, 0b0001), Rgb(0x000001));
        assert_eq!(embed(Rgb(0xFFFFFF), 0), Rgb(0xFEFCFE));
    }

    #[test]
    fn expanded_index_recovers_base() {
        let palette = expand(&BASE);
        assert_eq!(palette.len(), 64);
        for (i, &c) in palette.iter().enumerate() {
            assert_eq!(extract(c) as usize, i % 16);
            assert_eq!(c.0 & CARRIER_MASK, BASE[i / 16].0 & CARRIER_MASK);
        }
    }

    #[test]
    fn encode_puts_high_nibble_first() {
        let out = encode(&[1, 2, 3, 0, 1], &[0xAB, 0x4C]).unwrap();
        assert_eq!(out, vec![0x1A, 0x2B, 0x34, 0x0C, 0x10]);
    }

    #[test]
    fn encode_overflow() {
        assert!(matches!(
            encode(&[0; 5], &[1, 2, 3]),
            Err(CartError::Overflow(OverflowError::Frame { needed: 3, capacity: 2 }))
        ));
    }

    #[test]
    fn encode_rejects_pixels_outside_the_base_palette() {
        assert!(matches!(
            encode(&[0, 15, 16, 1], &[0xFF]),
            Err(CartError::Format(FormatError::PixelOutOfRange { index: 16, colors: 16 }))
        ));
    }

    fn frame(pixels: &[u8], data: &[u8]) -> Frame {
        Frame { palette: expand(&BASE), pixels: encode(pixels, data).unwrap() }
    }

    #[test]
    fn length_prefix_is_exact() {
        for len in [0u32, 1, 0xFF, 0x1234, 0x00FF_FF00, u32::MAX] {
            let frames = [frame(&[0, 1, 2, 3, 3, 2, 1, 0], &len.to_be_bytes())];
            assert_eq!(NibbleReader::new(&frames).length().unwrap(), len);
        }
    }

    #[test]
    fn reader_crosses_frames_and_skips_odd_pixels() {
        let frames = [frame(&[1; 5], &[0x11, 0x22]), frame(&[2; 4], &[0x33, 0x44])];
        let mut r = NibbleReader::new(&frames);
        assert_eq!(r.remaining(), 4);
        let bytes: Vec<u8> = (0..4).map(|_| r.byte().unwrap()).collect();
        assert_eq!(bytes, vec![0x11, 0x22, 0x33, 0x44]);
        assert_eq!(r.byte(), Err(FormatError::ShortPayload { expected: 5, found: 4 }));
    }
}
