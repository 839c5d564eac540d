//! Credential material referenced by outputs

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

/// Root under which the collector finds mounted secrets at runtime
pub const SECRET_MOUNT_ROOT: &str = "/var/run/ocp-collector/secrets";

/// Field names recognized in a secret
pub mod keys {
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const TLS_KEY: &str = "tls.key";
    pub const TLS_CRT: &str = "tls.crt";
    pub const CA_BUNDLE: &str = "ca-bundle.crt";
}

/// A resolved secret with one optional slot per credential kind
///
/// Values are only inspected for presence; generated configuration refers
/// to the mounted files, never to the bytes themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretBundle {
    /// Secret name, which is also its directory under the mount root
    pub name: String,
    pub username: Option<Vec<u8>>,
    pub password: Option<Vec<u8>>,
    pub tls_key: Option<Vec<u8>>,
    pub tls_crt: Option<Vec<u8>>,
    pub ca_bundle: Option<Vec<u8>>,
}

impl SecretBundle {
    /// Create an empty bundle for the named secret
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build a bundle from raw secret data; unknown fields are ignored
    pub fn from_data(name: impl Into<String>, data: &BTreeMap<String, Vec<u8>>) -> Self {
        let field = |key: &str| data.get(key).cloned();
        Self {
            name: name.into(),
            username: field(keys::USERNAME),
            password: field(keys::PASSWORD),
            tls_key: field(keys::TLS_KEY),
            tls_crt: field(keys::TLS_CRT),
            ca_bundle: field(keys::CA_BUNDLE),
        }
    }

    pub fn with_username(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.username = Some(value.into());
        self
    }

    pub fn with_password(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.password = Some(value.into());
        self
    }

    pub fn with_tls_key(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.tls_key = Some(value.into());
        self
    }

    pub fn with_tls_crt(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.tls_crt = Some(value.into());
        self
    }

    pub fn with_ca_bundle(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.ca_bundle = Some(value.into());
        self
    }

    /// Runtime path of one field of this secret
    pub fn mount_path(&self, field: &str) -> String {
        mount_path(&self.name, field)
    }
}

/// `<mount-root>/<secret-name>/<field>`
pub fn mount_path(secret_name: &str, field: &str) -> String {
    format!("{}/{}/{}", SECRET_MOUNT_ROOT, secret_name, field)
}

/// Lookup of secret bundles by secret name
#[derive(Debug, Clone, Default)]
pub struct SecretStore {
    bundles: HashMap<String, SecretBundle>,
}

impl SecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bundle, replacing any bundle with the same name
    pub fn insert(&mut self, bundle: SecretBundle) {
        self.bundles.insert(bundle.name.clone(), bundle);
    }

    /// Get a bundle by secret name
    pub fn get(&self, name: &str) -> Option<&SecretBundle> {
        self.bundles.get(name)
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    /// Load secrets from a directory laid out like the runtime mount:
    /// one subdirectory per secret, one file per field.
    pub fn from_dir<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        let mut store = Self::new();

        let entries = std::fs::read_dir(root)
            .with_context(|| format!("Failed to read secrets directory {}", root.display()))?;

        for entry in entries {
            let entry = entry?;
            let secret_name = entry.file_name().to_string_lossy().into_owned();
            if is_mount_internal(&secret_name) || !std::fs::metadata(entry.path())?.is_dir() {
                continue;
            }

            let mut data = BTreeMap::new();
            for field in std::fs::read_dir(entry.path())? {
                let field = field?;
                let field_name = field.file_name().to_string_lossy().into_owned();
                // Mounted fields are symlinks into `..data/`, so follow them
                if is_mount_internal(&field_name) || !std::fs::metadata(field.path())?.is_file() {
                    continue;
                }
                let bytes = std::fs::read(field.path())
                    .with_context(|| format!("Failed to read secret field {}", field.path().display()))?;
                data.insert(field_name, bytes);
            }

            debug!("Loaded secret {} with {} fields", secret_name, data.len());
            store.insert(SecretBundle::from_data(secret_name, &data));
        }

        Ok(store)
    }
}

/// Bookkeeping entries of a projected volume (`..data`, `..2024_01_01...`)
fn is_mount_internal(name: &str) -> bool {
    name.starts_with("..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_data_recognized_fields() {
        let mut data = BTreeMap::new();
        data.insert("username".to_string(), b"user".to_vec());
        data.insert("ca-bundle.crt".to_string(), b"bundle".to_vec());
        data.insert("unrelated".to_string(), b"x".to_vec());

        let bundle = SecretBundle::from_data("my-es-secret", &data);
        assert_eq!(bundle.name, "my-es-secret");
        assert_eq!(bundle.username.as_deref(), Some(&b"user"[..]));
        assert_eq!(bundle.ca_bundle.as_deref(), Some(&b"bundle"[..]));
        assert!(bundle.password.is_none());
        assert!(bundle.tls_key.is_none());
        assert!(bundle.tls_crt.is_none());
    }

    #[test]
    fn test_mount_path() {
        let bundle = SecretBundle::new("my-es-secret");
        assert_eq!(
            bundle.mount_path(keys::PASSWORD),
            "/var/run/ocp-collector/secrets/my-es-secret/password"
        );
    }

    #[test]
    fn test_store_lookup_missing() {
        let mut store = SecretStore::new();
        store.insert(SecretBundle::new("a").with_username("u"));
        assert!(store.get("a").is_some());
        assert!(store.get("b").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        let secret_dir = dir.path().join("es-secret");
        std::fs::create_dir(&secret_dir).unwrap();
        std::fs::write(secret_dir.join("username"), "admin").unwrap();
        std::fs::write(secret_dir.join("tls.crt"), "crt").unwrap();
        std::fs::write(dir.path().join("stray-file"), "ignored").unwrap();

        let store = SecretStore::from_dir(dir.path()).unwrap();
        assert_eq!(store.len(), 1);

        let bundle = store.get("es-secret").unwrap();
        assert_eq!(bundle.username.as_deref(), Some(&b"admin"[..]));
        assert_eq!(bundle.tls_crt.as_deref(), Some(&b"crt"[..]));
        assert!(bundle.password.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_from_dir_follows_projected_volume_links() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let secret_dir = dir.path().join("es-secret");
        let version_dir = secret_dir.join("..2024_01_01");
        std::fs::create_dir_all(&version_dir).unwrap();
        std::fs::write(version_dir.join("username"), "admin").unwrap();
        std::fs::write(version_dir.join("ca-bundle.crt"), "ca").unwrap();
        symlink("..2024_01_01", secret_dir.join("..data")).unwrap();
        symlink("..data/username", secret_dir.join("username")).unwrap();
        symlink("..data/ca-bundle.crt", secret_dir.join("ca-bundle.crt")).unwrap();

        let store = SecretStore::from_dir(dir.path()).unwrap();
        assert_eq!(store.len(), 1);

        let bundle = store.get("es-secret").unwrap();
        assert_eq!(bundle.username.as_deref(), Some(&b"admin"[..]));
        assert_eq!(bundle.ca_bundle.as_deref(), Some(&b"ca"[..]));
        assert!(bundle.password.is_none());
    }

    #[test]
    fn test_from_dir_missing_root() {
        assert!(SecretStore::from_dir("/tmp/nonexistent_secrets_dir_12345").is_err());
    }
}
