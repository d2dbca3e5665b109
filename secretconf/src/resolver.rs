//! Mutator that replaces `secret://` references with their plaintext

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::field::FieldSpec;
use crate::mutate::{MutateError, Mutator, Value};
use crate::secrets::{SecretReference, SecretStore, SecretTarget};

/// Subdirectory of the secrets directory that receives `?target=file`
/// secrets. `FileSecretStore` never reads hidden components, so written
/// files cannot shadow stored secrets.
pub const RESOLVED_DIR: &str = ".resolved";

/// Resolves [`Value::Secret`] values through a secret store.
///
/// Plain values pass through untouched. Resolution is synchronous, one
/// field at a time, in decode order.
#[derive(Debug, Clone)]
pub struct SecretResolver {
    store: Arc<dyn SecretStore>,
    secrets_dir: PathBuf,
}

impl SecretResolver {
    /// Files for `?target=file` references go to `{secrets_dir}/.resolved`.
    pub fn new(store: Arc<dyn SecretStore>, secrets_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            secrets_dir: secrets_dir.into(),
        }
    }

    fn resolve(&self, field: &FieldSpec, reference: &SecretReference) -> Result<Value, MutateError> {
        let locator = reference.locator();
        debug!(key = %field.key, locator = %locator, "resolving secret reference");

        let plaintext =
            self.store
                .resolve(locator)
                .map_err(|source| MutateError::SecretResolution {
                    locator: locator.to_string(),
                    source,
                })?;

        match reference.target() {
            SecretTarget::Value => Ok(Value::Plain(plaintext)),
            SecretTarget::File => {
                let path = self.write_secret_file(locator, &plaintext)?;
                Ok(Value::Plain(path.to_string_lossy().into_owned()))
            }
        }
    }

    fn write_secret_file(&self, locator: &str, plaintext: &str) -> Result<PathBuf, MutateError> {
        let dir = self.secrets_dir.join(RESOLVED_DIR);
        let path = dir.join(file_name_for(locator));
        let io_error = |source| MutateError::SecretFile {
            locator: locator.to_string(),
            path: path.display().to_string(),
            source,
        };

        fs::create_dir_all(&dir).map_err(io_error)?;
        let mut file = open_private(&path).map_err(io_error)?;
        file.write_all(plaintext.as_bytes()).map_err(io_error)?;
        debug!(locator = %locator, path = %path.display(), "wrote secret file");
        Ok(path)
    }
}

impl Mutator for SecretResolver {
    fn mutate(&self, field: &FieldSpec, value: Value) -> Result<Value, MutateError> {
        match value {
            Value::Secret(reference) => self.resolve(field, &reference),
            plain => Ok(plain),
        }
    }
}

/// Flatten a locator into a single file name.
///
/// ASCII letters, digits and `-` are kept; every other byte, `_` included,
/// becomes `_XX`. Distinct locators always get distinct names.
fn file_name_for(locator: &str) -> String {
    let mut name = String::with_capacity(locator.len());
    for byte in locator.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            name.push(char::from(byte));
        } else {
            name.push_str(&format!("_{byte:02X}"));
        }
    }
    name
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;
    use crate::secrets::{InMemorySecretStore, SecretError};
    use tempfile::TempDir;

    fn spec() -> FieldSpec {
        FieldSpec::new("TOKEN_SIGNING_KEY", "token_signing_key", FieldKind::String)
    }

    fn resolver(dir: &Path) -> SecretResolver {
        let store = InMemorySecretStore::new()
            .with_secret("projects/p/secrets/s", "abc123")
            .with_secret("tls/cert", "-----BEGIN CERTIFICATE-----");
        SecretResolver::new(Arc::new(store), dir)
    }

    #[test]
    fn test_plain_value_passes_through() {
        let dir = TempDir::new().unwrap();
        let value = Value::Plain("literal".to_string());
        let out = resolver(dir.path()).mutate(&spec(), value.clone()).unwrap();
        assert_eq!(out, value);
    }

    #[test]
    fn test_reference_is_replaced_by_plaintext() {
        let dir = TempDir::new().unwrap();
        let value = Value::classify("secret://projects/p/secrets/s".to_string());
        let out = resolver(dir.path()).mutate(&spec(), value).unwrap();
        assert_eq!(out, Value::Plain("abc123".to_string()));
    }

    #[test]
    fn test_failure_carries_locator_only() {
        let dir = TempDir::new().unwrap();
        let value = Value::classify("secret://projects/p/secrets/missing".to_string());
        let err = resolver(dir.path()).mutate(&spec(), value).unwrap_err();
        match err {
            MutateError::SecretResolution { locator, source } => {
                assert_eq!(locator, "projects/p/secrets/missing");
                assert!(matches!(source, SecretError::NotFound { .. }));
            }
            other => panic!("expected SecretResolution, got {other:?}"),
        }
    }

    #[test]
    fn test_file_target_writes_secret() {
        let dir = TempDir::new().unwrap();
        let secrets_dir = dir.path().join("secrets");
        let value = Value::classify("secret://tls/cert?target=file".to_string());
        let out = resolver(&secrets_dir).mutate(&spec(), value).unwrap();

        let expected = secrets_dir.join(RESOLVED_DIR).join("tls_2Fcert");
        assert_eq!(out, Value::Plain(expected.to_string_lossy().into_owned()));
        assert_eq!(
            fs::read_to_string(&expected).unwrap(),
            "-----BEGIN CERTIFICATE-----"
        );

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&expected).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_file_name_for() {
        assert_eq!(file_name_for("projects/p/secrets/s"), "projects_2Fp_2Fsecrets_2Fs");
        assert_eq!(file_name_for("plain"), "plain");
        assert_eq!(file_name_for("tls_cert"), "tls_5Fcert");
        assert_eq!(file_name_for(".."), "_2E_2E");
    }

    #[test]
    fn test_similar_locators_get_separate_files() {
        let dir = TempDir::new().unwrap();
        let store = InMemorySecretStore::new()
            .with_secret("tls/cert", "CERT-A")
            .with_secret("tls_cert", "CERT-B");
        let resolver = SecretResolver::new(Arc::new(store), dir.path());

        let a = resolver
            .mutate(&spec(), Value::classify("secret://tls/cert?target=file".to_string()))
            .unwrap()
            .into_raw();
        let b = resolver
            .mutate(&spec(), Value::classify("secret://tls_cert?target=file".to_string()))
            .unwrap()
            .into_raw();

        assert_ne!(a, b);
        assert_eq!(fs::read_to_string(&a).unwrap(), "CERT-A");
        assert_eq!(fs::read_to_string(&b).unwrap(), "CERT-B");
    }

    #[test]
    fn test_written_files_do_not_shadow_stored_secrets() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("db_password"), "stored").unwrap();
        let store = InMemorySecretStore::new().with_secret("db/password", "resolved");
        let resolver = SecretResolver::new(Arc::new(store), dir.path());

        let path = resolver
            .mutate(&spec(), Value::classify("secret://db/password?target=file".to_string()))
            .unwrap()
            .into_raw();

        assert!(Path::new(&path).starts_with(dir.path().join(RESOLVED_DIR)));
        assert_eq!(fs::read_to_string(dir.path().join("db_password")).unwrap(), "stored");
    }
}
