//! Object-store client implementation using Apache OpenDAL.

use atrium_shared::config::StorageProvider;
use opendal::{ErrorKind, Operator, services};
use uuid::Uuid;

use super::config::StorageConfig;
use super::error::StorageError;

/// Object-store client for profile photos.
pub struct ObjectStore {
    operator: Operator,
    config: StorageConfig,
}

impl ObjectStore {
    /// Create a new object store from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        let operator = match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
            StorageProvider::Memory => {
                let builder = services::Memory::default();

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
            }
        };

        Ok(operator)
    }

    /// Validate an upload against config constraints.
    ///
    /// # Errors
    ///
    /// Returns an error if file size or MIME type is invalid.
    pub fn validate_upload(&self, content_type: &str, size: u64) -> Result<(), StorageError> {
        if size > self.config.max_file_size {
            return Err(StorageError::file_too_large(
                size,
                self.config.max_file_size,
            ));
        }

        if !self.config.is_mime_type_allowed(content_type) {
            return Err(StorageError::invalid_mime_type(content_type));
        }

        Ok(())
    }

    /// Write an object under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UploadFailed`; the caller's record state must
    /// remain untouched when this surfaces.
    pub async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.operator
            .write_with(key, bytes)
            .content_type(content_type)
            .await
            .map_err(|e| StorageError::upload_failed(key, e.to_string()))?;

        Ok(())
    }

    /// Read an object's bytes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the key does not exist.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let buffer = self.operator.read(key).await.map_err(StorageError::from)?;
        Ok(buffer.to_vec())
    }

    /// Delete an object.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` (ignorable) or
    /// `StorageError::Unavailable` (hard failure).
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.operator.delete(key).await.map_err(StorageError::from)
    }

    /// Check if an object exists.
    pub async fn exists(&self, key: &str) -> bool {
        match self.operator.stat(key).await {
            Ok(_) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(_) => false,
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub const fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Deterministic storage key for an account's profile photo.
///
/// Format: `images/account_{account_id}_{sanitized_filename}`. Namespacing
/// by account id keeps keys from colliding across accounts.
#[must_use]
pub fn photo_key(account_id: Uuid, filename: &str) -> String {
    format!("images/account_{account_id}_{}", sanitize_filename(filename))
}

/// Sanitize filename for storage key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_store() -> ObjectStore {
        ObjectStore::from_config(StorageConfig::new(StorageProvider::Memory))
            .expect("memory store")
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("photo.jpg"), "photo.jpg");
        assert_eq!(sanitize_filename("my photo (1).png"), "my_photo__1_.png");
        assert_eq!(sanitize_filename("test@#$%.gif"), "test____.gif");
        assert_eq!(sanitize_filename("日本語.jpg"), "___.jpg");
    }

    #[test]
    fn test_photo_key_format() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").expect("valid uuid");
        let key = photo_key(id, "photo.jpg");
        assert_eq!(
            key,
            "images/account_550e8400-e29b-41d4-a716-446655440000_photo.jpg"
        );
    }

    #[test]
    fn test_photo_key_sanitizes() {
        let id = Uuid::new_v4();
        let key = photo_key(id, "my selfie!.png");
        assert!(key.starts_with("images/account_"));
        assert!(key.ends_with("my_selfie_.png"));
    }

    #[test]
    fn test_validate_upload_size() {
        let store = ObjectStore::from_config(
            StorageConfig::new(StorageProvider::Memory).with_max_file_size(1024),
        )
        .expect("memory store");

        assert!(store.validate_upload("image/png", 512).is_ok());

        let err = store.validate_upload("image/png", 2048).unwrap_err();
        assert!(matches!(err, StorageError::FileTooLarge { .. }));
    }

    #[test]
    fn test_validate_upload_mime_type() {
        let store = memory_store();

        assert!(store.validate_upload("image/jpeg", 1024).is_ok());

        let err = store.validate_upload("application/pdf", 1024).unwrap_err();
        assert!(matches!(err, StorageError::InvalidMimeType { .. }));
    }

    #[tokio::test]
    async fn test_put_read_delete_roundtrip() {
        let store = memory_store();

        store
            .put("images/account_x_photo.jpg", b"JPEGDATA".to_vec(), "image/jpeg")
            .await
            .unwrap();
        assert!(store.exists("images/account_x_photo.jpg").await);
        assert_eq!(
            store.read("images/account_x_photo.jpg").await.unwrap(),
            b"JPEGDATA"
        );

        store.delete("images/account_x_photo.jpg").await.unwrap();
        assert!(!store.exists("images/account_x_photo.jpg").await);
    }

    #[tokio::test]
    async fn test_read_missing_key() {
        let store = memory_store();
        let err = store.read("images/absent").await.unwrap_err();
        assert!(err.is_not_found());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Property: Sanitized filename only contains safe characters
    proptest! {
        #[test]
        fn prop_sanitized_filename_safe_chars(filename in ".*") {
            let sanitized = sanitize_filename(&filename);

            for c in sanitized.chars() {
                let is_safe = c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
                prop_assert!(is_safe, "Unexpected character in sanitized filename: {}", c);
            }
        }
    }

    // Property: Photo keys always live under the per-account images namespace
    proptest! {
        #[test]
        fn prop_photo_key_namespaced(filename in "[a-zA-Z0-9 !_-]{1,40}\\.[a-z]{2,4}") {
            let id = Uuid::new_v4();
            let key = photo_key(id, &filename);

            let expected_prefix = format!("images/account_{id}_");
            prop_assert!(key.starts_with(&expected_prefix));
            // No path separators may survive from the filename
            prop_assert_eq!(key.matches('/').count(), 1);
        }
    }
}
