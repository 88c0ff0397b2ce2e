//! Cartridges: GIF images with a JSON payload hidden in their palette bits.
//!
//! A cartridge starts from a fixed template picture, optionally decorated
//! with a label or a screenshot. The payload is a 4-byte big-endian length
//! followed by that many bytes of JSON, spread two pixels per byte over as
//! many frames as it needs. See [`nibble`] for the bit layout.

pub mod nibble;
pub mod options;

use log::{debug, info, warn};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CartError, FormatError, OverflowError};
use crate::gif::{self, Frame, GifImage, GifWriter};
use crate::label::print_label;
use crate::palette::{adapt, composite};
use nibble::NibbleReader;

/// The blank cartridge every pack starts from.
pub static TEMPLATE: &[u8] = include_bytes!("../../assets/cartridge.gif");

const SCREENSHOT_X: i32 = 16;
const SCREENSHOT_Y: i32 = 21;
/// Template colors a screenshot is quantized to. Compositing shifts indices
/// up by one, so these land on template entries 1 through 4.
const SCREENSHOT_COLORS: std::ops::Range<usize> = 1..5;
const LABEL_PEN: u8 = 1;
const LENGTH_BYTES: usize = 4;

/// What the tools put in a cartridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cartridge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub program: String,
    #[serde(default)]
    pub options: Map<String, Value>,
    #[serde(default)]
    pub rom: Vec<u8>,
}

/// Decodes the template and paints either `screenshot` or `label` onto it.
pub fn decorate<R: Rng>(label: &str, screenshot: Option<&[u8]>, rng: &mut R) -> Result<GifImage, CartError> {
    let mut image = gif::decode(TEMPLATE)?;
    let (width, height) = (image.width as usize, image.height as usize);
    let frame = image.frames.first_mut().ok_or(OverflowError::EmptyTemplate)?;

    match screenshot {
        Some(bytes) => {
            let shot = gif::decode(bytes)?;
            let Some(source) = shot.frames.first() else {
                warn!("screenshot has no frames, leaving the cartridge blank");
                return Ok(image);
            };
            let end = SCREENSHOT_COLORS.end.min(frame.palette.len());
            let target = frame.palette.get(SCREENSHOT_COLORS.start..end).unwrap_or_default();
            let pixels = adapt(&source.pixels, &source.palette, target);
            debug!("compositing {}x{} screenshot at ({SCREENSHOT_X},{SCREENSHOT_Y})", shot.width, shot.height);
            composite(
                &mut frame.pixels,
                width,
                height,
                &pixels,
                shot.width as usize,
                shot.height as usize,
                SCREENSHOT_X,
                SCREENSHOT_Y,
            );
        }
        None => print_label(&mut frame.pixels, width, height, LABEL_PEN, label, rng),
    }
    Ok(image)
}

/// Packs `payload` into a new cartridge GIF.
pub fn pack<T: Serialize>(label: &str, payload: &T, screenshot: Option<&[u8]>) -> Result<Vec<u8>, CartError> {
    pack_with_rng(label, payload, screenshot, &mut rand::thread_rng())
}

/// [`pack`] with the label's hand-drawn wobble driven by `rng`.
pub fn pack_with_rng<T: Serialize, R: Rng>(
    label: &str,
    payload: &T,
    screenshot: Option<&[u8]>,
    rng: &mut R,
) -> Result<Vec<u8>, CartError> {
    let image = decorate(label, screenshot, rng)?;
    let base = image.frames.first().ok_or(OverflowError::EmptyTemplate)?;
    if base.palette.len() > nibble::VARIANTS {
        return Err(FormatError::TemplateTooColorful(base.palette.len()).into());
    }
    if let Some(&index) = base.pixels.iter().find(|&&p| p as usize >= base.palette.len()) {
        return Err(FormatError::PixelOutOfRange { index, colors: base.palette.len() }.into());
    }

    let json = serde_json::to_vec(payload)?;
    let len = u32::try_from(json.len()).map_err(|_| OverflowError::Payload(json.len()))?;
    let mut data = Vec::with_capacity(LENGTH_BYTES + json.len());
    data.extend_from_slice(&len.to_be_bytes());
    data.extend_from_slice(&json);

    let per_frame = base.pixels.len() / 2;
    if per_frame == 0 {
        return Err(OverflowError::EmptyTemplate.into());
    }

    let palette = nibble::expand(&base.palette);
    let mut out = GifWriter::begin(image.width, image.height, &palette)?;
    let mut frames = 0;
    for chunk in data.chunks(per_frame) {
        out.frame(&nibble::encode(&base.pixels, chunk)?, 0, None)?;
        frames += 1;
    }
    info!("packed {} payload bytes into {} frame(s)", json.len(), frames);
    Ok(out.finish())
}

/// The raw JSON bytes hidden in a cartridge.
pub fn payload(bytes: &[u8]) -> Result<Vec<u8>, CartError> {
    let image = gif::decode(bytes)?;
    payload_from_frames(&image.frames)
}

fn payload_from_frames(frames: &[Frame]) -> Result<Vec<u8>, CartError> {
    let mut reader = NibbleReader::new(frames);
    let len = reader.length()? as usize;
    let available = reader.remaining();
    if len > available {
        return Err(FormatError::ShortPayload { expected: len, found: available }.into());
    }
    debug!("cartridge claims {len} payload bytes");

    let mut json = Vec::with_capacity(len);
    for _ in 0..len {
        json.push(reader.byte()?);
    }
    Ok(json)
}

/// Recovers and parses the payload of a cartridge.
pub fn unpack<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CartError> {
    Ok(serde_json::from_slice(&payload(bytes)?)?)
}
