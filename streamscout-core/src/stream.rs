//! Playable stream types produced by embed scrapers.
//!
//! Known stream types are typed; fields this crate does not model are carried
//! in `extra` and streams of an unknown `type` are kept as raw JSON, so a
//! provider's output reaches clients unchanged.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Quality label used by scrapers when they cannot tell the resolution.
pub const UNKNOWN_QUALITY: &str = "unknown";

/// A playable media reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Stream {
    /// HLS playlist
    Hls(HlsStream),
    /// Direct file download, one URL per quality
    File(FileStream),
    /// Any other stream type, kept verbatim
    Other(Map<String, Value>),
}

/// HLS stream pointing at a master playlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HlsStream {
    pub id: String,
    pub playlist: String,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub captions: Vec<Caption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_headers: Option<BTreeMap<String, String>>,
    /// Provider fields not modelled above, e.g. `thumbnailTrack`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// File stream keyed by quality label (`"360"`, `"720"`, `"4k"`, `"unknown"`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStream {
    pub id: String,
    #[serde(default)]
    pub flags: Vec<String>,
    pub qualities: BTreeMap<String, StreamFile>,
    #[serde(default)]
    pub captions: Vec<Caption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_headers: Option<BTreeMap<String, String>>,
    /// Provider fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One downloadable file of a [`FileStream`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFile {
    #[serde(rename = "type")]
    pub file_type: String,
    pub url: String,
}

/// Subtitle track attached to a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caption {
    pub id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub format: CaptionFormat,
    #[serde(default)]
    pub has_cors_restrictions: bool,
    pub language: String,
}

/// Subtitle file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionFormat {
    Srt,
    Vtt,
}

/// Wire form of the typed variants.
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum KnownStream {
    Hls(HlsStream),
    File(FileStream),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum KnownStreamRef<'a> {
    Hls(&'a HlsStream),
    File(&'a FileStream),
}

impl Serialize for Stream {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Stream::Hls(hls) => KnownStreamRef::Hls(hls).serialize(serializer),
            Stream::File(file) => KnownStreamRef::File(file).serialize(serializer),
            Stream::Other(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Stream {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;

        match raw.get("type").and_then(Value::as_str) {
            Some("hls" | "file") => {
                let known =
                    KnownStream::deserialize(Value::Object(raw)).map_err(D::Error::custom)?;
                Ok(match known {
                    KnownStream::Hls(hls) => Stream::Hls(hls),
                    KnownStream::File(file) => Stream::File(file),
                })
            }
            Some(_) => Ok(Stream::Other(raw)),
            None => Err(D::Error::missing_field("type")),
        }
    }
}

impl Stream {
    /// Scraper-assigned stream identifier.
    pub fn id(&self) -> &str {
        match self {
            Stream::Hls(hls) => &hls.id,
            Stream::File(file) => &file.id,
            Stream::Other(raw) => raw.get("id").and_then(Value::as_str).unwrap_or_default(),
        }
    }

    /// Wire name of the stream type.
    pub fn type_name(&self) -> &str {
        match self {
            Stream::Hls(_) => "hls",
            Stream::File(_) => "file",
            Stream::Other(raw) => raw.get("type").and_then(Value::as_str).unwrap_or_default(),
        }
    }

    /// Checks if this is a file stream whose only quality is `unknown`.
    ///
    /// Such streams are not worth offering to clients. A file stream that has
    /// `unknown` alongside a real quality is kept.
    pub fn has_only_unknown_quality(&self) -> bool {
        match self {
            Stream::File(file) => {
                file.qualities.len() == 1 && file.qualities.contains_key(UNKNOWN_QUALITY)
            }
            Stream::Hls(_) | Stream::Other(_) => false,
        }
    }
}
