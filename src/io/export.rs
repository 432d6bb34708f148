// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! PNG export of rendered frames.

use crate::error::ExportError;
use crate::render::Frame;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::path::Path;

/// Default file name offered for downloads.
pub const EXPORT_FILE_NAME: &str = "meme.png";

/// Encode a frame as PNG. Fails with [`ExportError::NoSurface`] when there is
/// no frame because no image was ever loaded.
pub fn export_png(frame: Option<&Frame>) -> Result<Vec<u8>, ExportError> {
    let frame = frame.ok_or(ExportError::NoSurface)?;
    let rgba = frame.to_rgba_image();
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        rgba.as_raw(),
        rgba.width(),
        rgba.height(),
        ExtendedColorType::Rgba8,
    )?;
    log::info!(
        "Exported {}x{} PNG ({} bytes)",
        frame.width(),
        frame.height(),
        bytes.len()
    );
    Ok(bytes)
}

/// Write encoded PNG bytes to disk.
pub fn write_png(bytes: &[u8], path: &Path) -> Result<(), ExportError> {
    std::fs::write(path, bytes).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Saved PNG to {}", path.display());
    Ok(())
}
