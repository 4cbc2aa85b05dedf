//! Cover image codec.
//!
//! The book form submits its cover as a JSON document `{"type": "...", "data": "<base64>"}`
//! (extra keys such as `name` or `size` are ignored). Decoding never aborts the
//! surrounding write: every [`CoverError`] means "continue without a new cover".

use std::fmt;
use std::str::FromStr;

use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD},
        DecodePaddingMode,
    },
    Engine as _,
};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Allowed cover image MIME types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverMime {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/gif")]
    Gif,
}

impl CoverMime {
    pub const ALL: [CoverMime; 3] = [CoverMime::Jpeg, CoverMime::Png, CoverMime::Gif];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoverMime::Jpeg => "image/jpeg",
            CoverMime::Png => "image/png",
            CoverMime::Gif => "image/gif",
        }
    }
}

impl FromStr for CoverMime {
    type Err = CoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoverMime::ALL
            .into_iter()
            .find(|mime| mime.as_str() == s)
            .ok_or_else(|| CoverError::UnsupportedType(s.to_string()))
    }
}

impl fmt::Display for CoverMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary cover image together with its MIME type.
///
/// Image bytes and type only ever travel together, so a book can not carry
/// one without the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cover {
    #[serde(rename = "type")]
    pub mime: CoverMime,
    #[serde(serialize_with = "serialize_base64")]
    pub data: Vec<u8>,
}

impl Cover {
    pub fn new(mime: CoverMime, data: Vec<u8>) -> Self {
        Self { mime, data }
    }

    /// `data:` URL suitable for an `<img src>` attribute
    pub fn data_url(&self) -> String {
        format!(
            "data:{};charset=utf-8;base64,{}",
            self.mime,
            STANDARD.encode(&self.data)
        )
    }
}

fn serialize_base64<S: Serializer, T: AsRef<[u8]>>(data: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(data.as_ref()))
}

/// Reasons a submitted cover payload is ignored
#[derive(Error, Debug)]
pub enum CoverError {
    #[error("cover payload is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("cover type {0:?} is not an accepted image type")]
    UnsupportedType(String),

    #[error("cover payload has no type")]
    MissingType,

    #[error("cover payload has no data")]
    MissingData,

    #[error("cover data is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Standard alphabet; padding optional, trailing bits ignored
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Wire shape of the client-side encoded cover
#[derive(Debug, Deserialize)]
struct CoverPayload {
    #[serde(rename = "type")]
    mime: Option<String>,
    data: Option<String>,
}

/// Decode a submitted cover payload.
///
/// `Ok(None)` means nothing was submitted (absent field or JSON `null`).
pub fn decode(encoded: Option<&str>) -> Result<Option<Cover>, CoverError> {
    let Some(encoded) = encoded else {
        return Ok(None);
    };

    let Some(payload) = serde_json::from_str::<Option<CoverPayload>>(encoded)? else {
        return Ok(None);
    };

    let mime: CoverMime = payload.mime.ok_or(CoverError::MissingType)?.parse()?;
    let data = decode_data(&payload.data.ok_or(CoverError::MissingData)?)?;

    Ok(Some(Cover::new(mime, data)))
}

/// Base64 body with line breaks and other ASCII whitespace removed
fn decode_data(data: &str) -> Result<Vec<u8>, CoverError> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(LENIENT.decode(compact)?)
}

/// Decode a payload, logging and discarding anything that can not be used
pub fn decode_or_skip(encoded: Option<&str>) -> Option<Cover> {
    match decode(encoded) {
        Ok(cover) => cover,
        Err(e) => {
            tracing::warn!("Ignoring submitted cover image: {}", e);
            None
        }
    }
}
