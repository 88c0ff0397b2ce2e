//! Error types for GIF decoding and cartridge packing.

/// The input is not a GIF (or standalone page) this crate understands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("bad magic number")]
    BadMagic,

    #[error("interlaced GIFs are not supported")]
    Interlaced,

    #[error("unrecognized block type {block:#04X} at offset {offset}")]
    UnknownBlock { block: u8, offset: usize },

    #[error("unrecognized extension type {label:#04X} at offset {offset}")]
    UnknownExtension { label: u8, offset: usize },

    #[error("unexpected end of stream at offset {0}")]
    Truncated(usize),

    /// Image block with neither a local nor a global color table.
    #[error("frame {0} has no color table")]
    MissingPalette(usize),

    #[error("first frame is {width}x{height} at ({left},{top}), expected the full canvas")]
    PartialFirstFrame { left: u16, top: u16, width: u16, height: u16 },

    #[error("invalid LZW minimum code size {0}")]
    BadCodeSize(u8),

    #[error("malformed LZW stream: code {code} referenced before definition (next free {next})")]
    BadCode { code: u16, next: u16 },

    #[error("pixel index {index} outside a {colors}-entry palette")]
    PixelOutOfRange { index: u8, colors: usize },

    #[error("color table of {0} entries exceeds 256")]
    TooManyColors(usize),

    /// Nibble expansion multiplies the palette by 16, so the base may hold at most 16 colors.
    #[error("template palette has {0} colors, at most 16 can be expanded")]
    TemplateTooColorful(usize),

    #[error("cartridge ends after {found} of {expected} payload bytes")]
    ShortPayload { expected: usize, found: usize },

    #[error("not a standalone page: {0}")]
    NotStandalone(&'static str),

    #[error("frame has {actual} pixels, expected {expected}")]
    FrameSize { expected: usize, actual: usize },
}

/// Data does not fit the container it is being written into.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverflowError {
    #[error("comment of {0} bytes does not fit a single 255 byte sub-block")]
    Comment(usize),

    #[error("payload chunk of {needed} bytes exceeds frame capacity of {capacity} bytes")]
    Frame { needed: usize, capacity: usize },

    #[error("payload of {0} bytes cannot be described by a 32-bit length")]
    Payload(usize),

    #[error("template has no room for payload data")]
    EmptyTemplate,
}

#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("overflow error: {0}")]
    Overflow(#[from] OverflowError),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
