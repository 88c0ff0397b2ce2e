//! Standalone HTML pages: a program shipped as a single web page.
//!
//! The page opens with a marker comment followed by a script tag assigning
//! the cartridge JSON to `data`. Everything after that first script (the
//! emulator runtime) is ignored here.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CartError, FormatError};

pub const MAGIC: &str = "<!-- Standalone Generated By Octo (octo-ide.com) -->\n";

const SCRIPT_END: &str = "</script>";

pub fn is_standalone(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC.as_bytes())
}

/// The marker and data script that open a standalone page.
///
/// `</` is escaped inside the JSON so program text can never close the
/// script early.
pub fn header<T: Serialize>(payload: &T) -> Result<String, CartError> {
    let json = serde_json::to_string(payload)?.replace("</", "<\\/");
    Ok(format!("{MAGIC}<script>data={json}{SCRIPT_END}\n"))
}

/// Parses the payload out of a standalone page.
pub fn parse<T: DeserializeOwned>(text: &str) -> Result<T, CartError> {
    let body = text.strip_prefix(MAGIC).ok_or(FormatError::NotStandalone("missing marker"))?;
    let end = body.find(SCRIPT_END).ok_or(FormatError::NotStandalone("unterminated data script"))?;
    let script = &body[..end];
    let start = script.find('=').ok_or(FormatError::NotStandalone("no data assignment"))?;
    Ok(serde_json::from_str(&script[start + 1..])?)
}
