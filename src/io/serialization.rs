// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Composition document serialization and deserialization.
//!
//! This module handles saving and opening compositions in YAML and JSON
//! formats. The format is chosen by file extension.

use crate::models::composition::CompositionDocument;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// On-disk document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Pick the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Some(Self::Yaml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Export a composition to YAML format.
pub fn export_yaml(doc: &CompositionDocument, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(doc)?;
    std::fs::write(path, yaml)?;
    Ok(())
}

/// Export a composition to JSON format.
pub fn export_json(doc: &CompositionDocument, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Import a composition from YAML format.
pub fn import_yaml(path: &Path) -> Result<CompositionDocument> {
    let yaml = std::fs::read_to_string(path)?;
    let doc = serde_yaml::from_str(&yaml)?;
    Ok(doc)
}

/// Import a composition from JSON format.
pub fn import_json(path: &Path) -> Result<CompositionDocument> {
    let json = std::fs::read_to_string(path)?;
    let doc = serde_json::from_str(&json)?;
    Ok(doc)
}

/// Save a composition, choosing the format by extension.
pub fn save_composition(doc: &CompositionDocument, path: &Path) -> Result<()> {
    match Format::from_path(path) {
        Some(Format::Yaml) => export_yaml(doc, path),
        Some(Format::Json) => export_json(doc, path),
        None => bail!("Unsupported file extension: {}", path.display()),
    }
    .with_context(|| format!("Failed to save composition {}", path.display()))?;
    log::info!(
        "Saved composition with {} captions to {}",
        doc.overlays.len(),
        path.display()
    );
    Ok(())
}

/// Open a composition, choosing the format by extension.
pub fn open_composition(path: &Path) -> Result<CompositionDocument> {
    let doc = match Format::from_path(path) {
        Some(Format::Yaml) => import_yaml(path),
        Some(Format::Json) => import_json(path),
        None => bail!("Unsupported file extension: {}", path.display()),
    }
    .with_context(|| format!("Failed to open composition {}", path.display()))?;
    log::info!(
        "Opened composition with {} captions from {}",
        doc.overlays.len(),
        path.display()
    );
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::source::ImageSource;
    use crate::models::overlay::{NormalizedPoint, Overlay, OverlayId};

    fn sample() -> CompositionDocument {
        let mut doc = CompositionDocument::new(ImageSource::Url(
            "https://i.imgflip.com/1g8my4.jpg".into(),
        ));
        doc.default_font_size = 48;
        doc.overlays.push(Overlay {
            id: OverlayId(3),
            text: "Two buttons".into(),
            position: NormalizedPoint::new(30.0, 12.5),
            font_size: 25,
            font_pinned: true,
        });
        doc
    }

    #[test]
    fn yaml_and_json_both_reopen() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["meme.yaml", "meme.json"] {
            let path = dir.path().join(name);
            save_composition(&sample(), &path).unwrap();
            assert_eq!(open_composition(&path).unwrap(), sample());
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meme.txt");
        assert!(save_composition(&sample(), &path).is_err());
        assert!(open_composition(&path).is_err());
    }

    #[test]
    fn uploaded_images_are_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.json");
        let doc = CompositionDocument::new(ImageSource::Bytes(vec![1, 2, 3, 4]));
        save_composition(&doc, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("data:application/octet-stream;base64,"));
        assert_eq!(open_composition(&path).unwrap(), doc);
    }
}
