//! Response envelope decoding.
//!
//! # Design
//! JSON responses wrap the payload as `{"responseCode", "message", "content"}`.
//! The envelope is decoded once into a typed struct with `content` held as a
//! `RawValue`; only that field is then re-serialized, compactly and with
//! sorted object keys. XML responses are only checked for well-formedness
//! and handed back untouched.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::Value;

use crate::error::{ApiError, Result};

/// The JSON wrapper around every API payload.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub content: Option<Box<RawValue>>,
    #[serde(rename = "responseCode", default)]
    pub response_code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Envelope {
    pub fn parse(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub fn is_success(&self) -> bool {
        self.response_code.map_or(true, |code| (200..300).contains(&code))
    }

    /// Compact serialization of `content`, or `null` when the field is absent.
    pub fn into_content(self) -> Result<Vec<u8>> {
        let Some(raw) = self.content else {
            return Ok(b"null".to_vec());
        };
        let value: Value = serde_json::from_str(raw.get()).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(serde_json::to_vec(&value)?)
    }
}

/// Unwrap the `content` field of a JSON envelope.
pub fn decode_json(body: &[u8]) -> Result<Vec<u8>> {
    let envelope = Envelope::parse(body)?;
    if !envelope.is_success() {
        return Err(ApiError::Api {
            code: envelope.response_code.unwrap_or_default(),
            message: envelope.message.unwrap_or_default(),
        });
    }
    envelope.into_content()
}

/// Check that `body` is a single well-formed XML document and return it as is.
pub fn validate_xml(body: &[u8]) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(body);
    let mut buf = Vec::new();
    let mut depth: usize = 0;
    let mut roots: usize = 0;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| ApiError::Decode(format!("malformed XML at byte {}: {e}", reader.buffer_position())))?;
        match event {
            Event::Start(_) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Event::Empty(_) if depth == 0 => roots += 1,
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ApiError::Decode("unexpected closing tag".into()))?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth != 0 {
        return Err(ApiError::Decode("unclosed XML element".into()));
    }
    if roots != 1 {
        return Err(ApiError::Decode(format!("expected one root element, found {roots}")));
    }
    Ok(body.to_vec())
}
