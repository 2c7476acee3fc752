//! `requirements.txt` handling: presence, package list, content hash.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::EnvError;
use crate::handle::EnvironmentHandle;

/// Stamp file inside the environment recording the last installed manifest hash.
pub const INSTALL_STAMP: &str = ".g1launch-manifest.sha256";

/// A dependency manifest that exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyManifest {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl DependencyManifest {
    /// Load `<base>/<name>`. `Ok(None)` when the file does not exist.
    pub fn locate(base: &Path, name: &str) -> Result<Option<Self>, EnvError> {
        let path = base.join(name);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(&path).map_err(|source| EnvError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Some(Self { path, bytes }))
    }

    /// Manifest text. pip accepts BOM-marked UTF-8 and UTF-16 files, so decode
    /// those; anything else is read lossily.
    pub fn text(&self) -> String {
        let b = self.bytes.as_slice();
        if let Some(rest) = b.strip_prefix(b"\xEF\xBB\xBF") {
            return String::from_utf8_lossy(rest).into_owned();
        }
        if let Some(rest) = b.strip_prefix(b"\xFF\xFE") {
            return decode_utf16(rest, u16::from_le_bytes);
        }
        if let Some(rest) = b.strip_prefix(b"\xFE\xFF") {
            return decode_utf16(rest, u16::from_be_bytes);
        }
        String::from_utf8_lossy(b).into_owned()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Requirement lines, without blanks, comments and pip options (`-r`, `--index-url`, ...).
    pub fn packages(&self) -> Vec<String> {
        self.text()
            .lines()
            .map(|l| match l.find(" #") {
                Some(pos) => &l[..pos],
                None => l,
            })
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('-'))
            .map(String::from)
            .collect()
    }

    /// SHA-256 hex of the raw manifest bytes
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        hex::encode(hasher.finalize())
    }

    /// Whether `env` already holds an install of exactly this content
    pub fn is_installed_in(&self, env: &EnvironmentHandle) -> bool {
        std::fs::read_to_string(env.root().join(INSTALL_STAMP))
            .map(|s| s.trim() == self.hash())
            .unwrap_or(false)
    }

    /// Record a successful install in `env`
    pub fn mark_installed_in(&self, env: &EnvironmentHandle) -> Result<(), EnvError> {
        let stamp = env.root().join(INSTALL_STAMP);
        std::fs::write(&stamp, self.hash()).map_err(|source| EnvError::Io {
            path: stamp,
            source,
        })
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| unit([c[0], c[1]])).collect();
    String::from_utf16_lossy(&units)
}
