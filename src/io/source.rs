// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image source references.
//!
//! Uploaded files, template URLs, file paths and `data:` URLs all become an
//! [`ImageSource`] before they reach the loader.

use crate::error::ImageLoadError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A decodable image reference.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ImageSource {
    /// Raw encoded image bytes supplied by the user.
    Bytes(Vec<u8>),
    /// Local file.
    Path(PathBuf),
    /// Remote image, usually a template.
    Url(String),
}

impl ImageSource {
    /// Normalize a textual reference.
    ///
    /// `data:` URLs are decoded to bytes, `http(s)://` references stay URLs,
    /// anything else is a filesystem path.
    pub fn parse(reference: &str) -> Result<Self, ImageLoadError> {
        let reference = reference.trim();
        if let Some(rest) = reference.strip_prefix("data:") {
            return decode_data_url(rest).map(Self::Bytes);
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(Self::Url(reference.to_string()));
        }
        Ok(Self::Path(PathBuf::from(reference)))
    }

    /// Resolve the reference to encoded image bytes. Blocks on file and
    /// network I/O.
    pub fn read(&self) -> Result<Vec<u8>, ImageLoadError> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::Path(path) => std::fs::read(path).map_err(|source| ImageLoadError::Read {
                path: path.clone(),
                source,
            }),
            Self::Url(url) => fetch(url),
        }
    }

    /// Encode as a `data:` URL. Only meaningful for [`ImageSource::Bytes`].
    fn to_data_url(bytes: &[u8]) -> String {
        let mime = image::guess_format(bytes)
            .map(|format| format.to_mime_type())
            .unwrap_or("application/octet-stream");
        format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
    }
}

fn decode_data_url(rest: &str) -> Result<Vec<u8>, ImageLoadError> {
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ImageLoadError::InvalidDataUrl("no payload".into()))?;
    if !header.ends_with(";base64") {
        return Err(ImageLoadError::InvalidDataUrl(
            "only base64 payloads are supported".into(),
        ));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| ImageLoadError::InvalidDataUrl(e.to_string()))
}

fn fetch(url: &str) -> Result<Vec<u8>, ImageLoadError> {
    let wrap = |source| ImageLoadError::Fetch {
        url: url.to_string(),
        source,
    };
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(wrap)?;
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(wrap)?;
    let bytes = response.bytes().map_err(wrap)?;
    log::debug!("Fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}

impl TryFrom<String> for ImageSource {
    type Error = ImageLoadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ImageSource> for String {
    fn from(source: ImageSource) -> Self {
        match source {
            ImageSource::Bytes(bytes) => ImageSource::to_data_url(&bytes),
            ImageSource::Path(path) => path.to_string_lossy().into_owned(),
            ImageSource::Url(url) => url,
        }
    }
}

// Keep logs readable when the source is a multi-megabyte upload.
impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => write!(f, "Bytes(<{} bytes>)", bytes.len()),
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => write!(f, "uploaded image ({} bytes)", bytes.len()),
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_classifies_references() {
        assert_eq!(
            ImageSource::parse("https://i.imgflip.com/30b1gx.jpg").unwrap(),
            ImageSource::Url("https://i.imgflip.com/30b1gx.jpg".into())
        );
        assert_eq!(
            ImageSource::parse("pics/cat.png").unwrap(),
            ImageSource::Path(PathBuf::from("pics/cat.png"))
        );
        assert_eq!(
            ImageSource::parse("data:image/png;base64,AQID").unwrap(),
            ImageSource::Bytes(vec![1, 2, 3])
        );
    }

    #[test]
    fn malformed_data_urls_are_rejected() {
        assert!(matches!(
            ImageSource::parse("data:image/png;base64"),
            Err(ImageLoadError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            ImageSource::parse("data:text/plain,hello"),
            Err(ImageLoadError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            ImageSource::parse("data:image/png;base64,!!!"),
            Err(ImageLoadError::InvalidDataUrl(_))
        ));
    }

    #[test]
    fn bytes_serialize_as_data_url() {
        let source = ImageSource::Bytes(vec![9, 8, 7]);
        let encoded: String = source.clone().into();
        assert_eq!(encoded, "data:application/octet-stream;base64,CQgH");
        assert_eq!(ImageSource::try_from(encoded).unwrap(), source);
    }

    #[test]
    fn read_missing_file_reports_path() {
        let source = ImageSource::Path(PathBuf::from("/definitely/not/here.png"));
        match source.read() {
            Err(ImageLoadError::Read { path, .. }) => {
                assert_eq!(path, PathBuf::from("/definitely/not/here.png"))
            }
            other => panic!("unexpected result: {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn debug_hides_payload() {
        let source = ImageSource::Bytes(vec![0; 4096]);
        assert_eq!(format!("{:?}", source), "Bytes(<4096 bytes>)");
    }
}
