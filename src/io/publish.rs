// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Publishing finished compositions.
//!
//! Account management and remote storage live outside this crate. The
//! engine only needs to ask whether a user is signed in and to hand the PNG
//! bytes plus that user's opaque id to whatever stores them.

use crate::error::PublishError;
use crate::session::EditorSession;
use anyhow::Context;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Authentication collaborator.
pub trait AuthProvider {
    fn is_authenticated(&self) -> bool;

    /// Opaque id of the signed-in user.
    fn user_id(&self) -> Option<String>;
}

/// Persistence collaborator for published compositions.
pub trait PublishSink {
    /// Store `png` for `user_id`. Returns a human readable location.
    fn publish(&self, png: &[u8], user_id: &str) -> anyhow::Result<String>;
}

/// Publish the session's current composition.
///
/// Authentication is a hard precondition: when it fails the sink is never
/// called.
pub fn publish(
    session: &mut EditorSession,
    auth: &dyn AuthProvider,
    sink: &dyn PublishSink,
) -> Result<String, PublishError> {
    let user = match auth.user_id() {
        Some(user) if auth.is_authenticated() => user,
        _ => return Err(PublishError::NotAuthenticated),
    };
    let png = session.export_png()?;
    let location = sink.publish(&png, &user)?;
    log::info!("Published meme for {} to {}", user, location);
    Ok(location)
}

/// Auth provider with a fixed, locally configured user.
#[derive(Debug, Clone, Default)]
pub struct StaticAuth {
    user: Option<String>,
}

impl StaticAuth {
    pub fn new(user: Option<String>) -> Self {
        Self {
            user: user.filter(|u| !u.trim().is_empty()),
        }
    }
}

impl AuthProvider for StaticAuth {
    fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    fn user_id(&self) -> Option<String> {
        self.user.clone()
    }
}

/// Writes published memes into a local gallery directory.
#[derive(Debug, Clone)]
pub struct GalleryDir {
    dir: PathBuf,
}

impl GalleryDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl PublishSink for GalleryDir {
    fn publish(&self, png: &[u8], user_id: &str) -> anyhow::Result<String> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let safe_user: String = user_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let path = self.dir.join(format!("{}-{}.png", safe_user, millis));
        std::fs::write(&path, png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExportError;
    use crate::io::media::tests::png_bytes;
    use crate::io::source::ImageSource;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingSink {
        calls: Cell<usize>,
    }

    impl PublishSink for CountingSink {
        fn publish(&self, png: &[u8], _user_id: &str) -> anyhow::Result<String> {
            assert!(!png.is_empty());
            self.calls.set(self.calls.get() + 1);
            Ok("memory".into())
        }
    }

    fn loaded_session() -> EditorSession {
        let mut session = EditorSession::with_bundled_font(40).unwrap();
        session
            .load_blocking(ImageSource::Bytes(png_bytes(32, 32, [0, 0, 0, 255])))
            .unwrap();
        session
    }

    #[test]
    fn signed_out_users_cannot_publish() {
        let mut session = loaded_session();
        let sink = CountingSink::default();
        let result = publish(&mut session, &StaticAuth::new(None), &sink);
        assert!(matches!(result, Err(PublishError::NotAuthenticated)));
        assert_eq!(sink.calls.get(), 0);

        let blank = StaticAuth::new(Some("  ".into()));
        assert!(!blank.is_authenticated());
    }

    #[test]
    fn publish_requires_a_surface() {
        let mut session = EditorSession::with_bundled_font(40).unwrap();
        let sink = CountingSink::default();
        let result = publish(&mut session, &StaticAuth::new(Some("ann".into())), &sink);
        assert!(matches!(
            result,
            Err(PublishError::Export(ExportError::NoSurface))
        ));
        assert_eq!(sink.calls.get(), 0);
    }

    #[test]
    fn gallery_dir_stores_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = loaded_session();
        let gallery = GalleryDir::new(dir.path().join("gallery"));

        let auth = StaticAuth::new(Some("a/b".into()));
        let location = publish(&mut session, &auth, &gallery).unwrap();

        let path = PathBuf::from(location);
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("a_b-"));
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
