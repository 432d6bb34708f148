// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Read from a YAML or JSON file; every field has a default so an empty or
//! missing file yields a working setup.

use crate::error::{ConfigError, RenderError};
use crate::io::publish::{GalleryDir, StaticAuth};
use crate::io::serialization::Format;
use crate::io::source::ImageSource;
use crate::models::store::{DEFAULT_FONT_SIZE, FONT_SIZE_RANGE};
use crate::render::{CaptionFont, Renderer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "memecanvas.yaml";

/// Global application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Initial session default font size.
    pub default_font_size: u32,

    /// Caption font file. The bundled font is a light face; the classic
    /// meme look wants a bold sans such as Arial Bold or DejaVu Sans Bold.
    pub font_path: Option<PathBuf>,

    /// Log filter (e.g. "info", "memecanvas=debug").
    pub log_level: String,

    /// Preset template images.
    pub templates: Vec<Template>,

    /// Local gallery used by "Post".
    pub gallery: GalleryConfig,
}

/// A preset template image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub url: String,
}

impl Template {
    fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    pub fn source(&self) -> ImageSource {
        ImageSource::Url(self.url.clone())
    }
}

/// Gallery publishing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Directory published memes are written to.
    pub dir: PathBuf,

    /// Signed-in user; publishing is disabled when unset.
    pub user: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_font_size: DEFAULT_FONT_SIZE,
            font_path: None,
            log_level: "info".to_string(),
            templates: default_templates(),
            gallery: GalleryConfig::default(),
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("gallery"),
            user: None,
        }
    }
}

/// The classic template catalog.
pub fn default_templates() -> Vec<Template> {
    vec![
        Template::new("Drake", "https://i.imgflip.com/30b1gx.jpg"),
        Template::new("Distracted Boyfriend", "https://i.imgflip.com/1ur9b0.jpg"),
        Template::new("Expanding Brain", "https://i.imgflip.com/1jhl7s.jpg"),
        Template::new("Two Buttons", "https://i.imgflip.com/1g8my4.jpg"),
        Template::new("Change My Mind", "https://i.imgflip.com/24y43o.jpg"),
        Template::new("Woman Yelling at Cat", "https://i.imgflip.com/345v97.jpg"),
    ]
}

impl AppConfig {
    /// Load configuration from a YAML or JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let format = Format::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };
        let mut config: Self = match format {
            Format::Yaml if text.trim().is_empty() => Self::default(),
            Format::Yaml => serde_yaml::from_str(&text).map_err(|e| parse_error(e.to_string()))?,
            Format::Json => serde_json::from_str(&text).map_err(|e| parse_error(e.to_string()))?,
        };
        config.default_font_size = config
            .default_font_size
            .clamp(*FONT_SIZE_RANGE.start(), *FONT_SIZE_RANGE.end());
        Ok(config)
    }

    /// Load `explicit` if given, else [`DEFAULT_CONFIG_FILE`] if it exists,
    /// else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Renderer using the configured caption font.
    pub fn renderer(&self) -> Result<Renderer, RenderError> {
        let font = match &self.font_path {
            Some(path) => CaptionFont::from_file(path)?,
            None => {
                log::info!("No caption font configured, using the bundled light face");
                CaptionFont::bundled()?
            }
        };
        Ok(Renderer::new(font))
    }

    pub fn auth(&self) -> StaticAuth {
        StaticAuth::new(self.gallery.user.clone())
    }

    pub fn gallery(&self) -> GalleryDir {
        GalleryDir::new(self.gallery.dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::publish::AuthProvider;

    #[test]
    fn defaults_ship_six_templates() {
        let config = AppConfig::default();
        assert_eq!(config.templates.len(), 6);
        assert_eq!(config.default_font_size, 40);
        assert!(!config.auth().is_authenticated());
        assert_eq!(
            config.templates[0].source(),
            ImageSource::Url("https://i.imgflip.com/30b1gx.jpg".into())
        );
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memecanvas.yaml");
        std::fs::write(&path, "default_font_size: 250\ngallery:\n  user: ann\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.default_font_size, 100);
        assert_eq!(config.gallery.user.as_deref(), Some("ann"));
        assert_eq!(config.gallery.dir, PathBuf::from("gallery"));
        assert_eq!(config.templates, default_templates());
        assert!(config.auth().is_authenticated());
    }

    #[test]
    fn json_and_empty_files_load() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("c.json");
        std::fs::write(&json, r#"{ "log_level": "debug", "templates": [] }"#).unwrap();
        let config = AppConfig::load(&json).unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(config.templates.is_empty());

        let empty = dir.path().join("empty.yml");
        std::fs::write(&empty, "").unwrap();
        assert_eq!(AppConfig::load(&empty).unwrap(), AppConfig::default());
    }

    #[test]
    fn bad_files_report_errors() {
        let dir = tempfile::tempdir().unwrap();
        let toml = dir.path().join("c.toml");
        assert!(matches!(
            AppConfig::load(&toml),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            AppConfig::load(&dir.path().join("missing.yaml")),
            Err(ConfigError::Read { .. })
        ));
        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ nope").unwrap();
        assert!(matches!(
            AppConfig::load(&broken),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn unset_font_path_falls_back_to_bundled_font() {
        let config = AppConfig::default();
        assert!(config.font_path.is_none());
        let renderer = config.renderer().unwrap();
        let (width, height) = renderer.font().measure("MEME", 40.0);
        assert!(width > 0.0 && height > 0.0);
    }

    #[test]
    fn missing_font_file_is_a_render_error() {
        let config = AppConfig {
            font_path: Some(PathBuf::from("/no/such/font.ttf")),
            ..AppConfig::default()
        };
        assert!(matches!(config.renderer(), Err(RenderError::Font(_))));
    }
}
