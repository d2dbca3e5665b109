use std::fs;
use std::path::{Component, Path, PathBuf};

use super::{SecretError, SecretStore};

/// Secret store reading one file per secret under a root directory;
/// registered as `FILESYSTEM`.
///
/// `secret://db/password` reads `{root}/db/password`, which is the layout
/// Kubernetes and Docker use for mounted secrets. Contents are trimmed.
/// Hidden components (`.resolved`, `..data`) are never read.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    root: PathBuf,
}

impl FileSecretStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, locator: &str) -> Result<PathBuf, SecretError> {
        let relative = Path::new(locator);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(SecretError::backend(
                locator,
                "locator must be a relative path inside the secrets directory",
            ));
        }
        let hidden = relative.components().any(|c| match c {
            Component::Normal(name) => name.to_string_lossy().starts_with('.'),
            _ => false,
        });
        if hidden {
            return Err(SecretError::backend(
                locator,
                "locator must not name a hidden file or directory",
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl SecretStore for FileSecretStore {
    fn resolve(&self, locator: &str) -> Result<String, SecretError> {
        let path = self.path_for(locator)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(contents.trim().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SecretError::not_found(locator))
            }
            Err(e) => Err(SecretError::Io {
                locator: locator.to_string(),
                source: e,
            }),
        }
    }
}
