//! Variable width LZW decoding, GIF flavour.

use log::warn;

use crate::error::FormatError;

const MAX_CODES: usize = 4096;
const MAX_WIDTH: u32 = 12;

/// Reads little-endian, LSB-first codes out of the concatenated sub-block data.
struct BitReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    acc: u32,
    bits: u32,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0, acc: 0, bits: 0 }
    }

    /// None once the input can't supply a whole code.
    fn read(&mut self, width: u32) -> Option<u16> {
        while self.bits < width {
            let byte = *self.bytes.get(self.pos)?;
            self.acc |= (byte as u32) << self.bits;
            self.pos += 1;
            self.bits += 8;
        }
        let code = self.acc & ((1 << width) - 1);
        self.acc >>= width;
        self.bits -= width;
        Some(code as u16)
    }

    fn exhausted(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}

/// Decoder state. Entries below `clear` are the roots and never change.
pub struct LzwDecoder {
    min_code_size: u8,
    clear: u16,
    end: u16,
    prefix: Vec<u16>,
    suffix: Vec<u8>,
    width: u32,
    next: u16,
    previous: Option<u16>,
    first: u8,
    scratch: Vec<u8>,
}

impl LzwDecoder {
    pub fn new(min_code_size: u8) -> Result<Self, FormatError> {
        if !(1..=11).contains(&min_code_size) {
            return Err(FormatError::BadCodeSize(min_code_size));
        }
        let clear = 1u16 << min_code_size;
        let mut decoder = Self {
            min_code_size,
            clear,
            end: clear + 1,
            prefix: vec![0; MAX_CODES],
            suffix: (0..MAX_CODES).map(|c| c as u8).collect(),
            width: 0,
            next: 0,
            previous: None,
            first: 0,
            scratch: Vec::new(),
        };
        decoder.reset();
        Ok(decoder)
    }

    fn reset(&mut self) {
        self.width = self.min_code_size as u32 + 1;
        self.next = self.clear + 2;
        self.previous = None;
    }

    /// Decodes every code in `bytes`, stopping at end-of-information or when
    /// the input runs dry.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<Vec<u8>, FormatError> {
        let mut reader = BitReader::new(bytes);
        let mut out = Vec::with_capacity(bytes.len() * 2);

        while let Some(code) = reader.read(self.width) {
            if code == self.clear {
                self.reset();
                continue;
            }
            if code == self.end {
                if !reader.exhausted() {
                    warn!("{} bytes of image data after end-of-information", bytes.len() - reader.pos);
                }
                break;
            }

            let Some(previous) = self.previous else {
                if code >= self.clear {
                    return Err(FormatError::BadCode { code, next: self.next });
                }
                out.push(code as u8);
                self.first = code as u8;
                self.previous = Some(code);
                continue;
            };

            if code > self.next || (code == self.next && self.next as usize >= MAX_CODES) {
                return Err(FormatError::BadCode { code, next: self.next });
            }
            self.expand(code, previous, &mut out);
            self.previous = Some(code);
        }

        Ok(out)
    }

    /// Writes the string for `code` and records `previous + first symbol`.
    fn expand(&mut self, code: u16, previous: u16, out: &mut Vec<u8>) {
        self.scratch.clear();
        let mut c = code;
        // KwKwK: the code being defined right now ends with its own first symbol
        if c == self.next {
            self.scratch.push(self.first);
            c = previous;
        }
        while c > self.clear {
            self.scratch.push(self.suffix[c as usize]);
            c = self.prefix[c as usize];
        }
        self.first = self.suffix[c as usize];
        out.push(self.first);
        out.extend(self.scratch.iter().rev());

        if (self.next as usize) < MAX_CODES {
            self.prefix[self.next as usize] = previous;
            self.suffix[self.next as usize] = self.first;
            self.next += 1;
            if self.next as usize == 1 << self.width && self.width < MAX_WIDTH {
                self.width += 1;
            }
        }
    }
}

/// One-shot decode of a whole image's data.
pub fn decompress(min_code_size: u8, bytes: &[u8]) -> Result<Vec<u8>, FormatError> {
    LzwDecoder::new(min_code_size)?.decode(bytes)
}
