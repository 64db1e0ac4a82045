//! Credential hashing.
//!
//! The user directory matches `(login, password_hash)` exactly, so every hasher here must be
//! deterministic: the same plaintext always yields the same string for a given deployment.
//! That rules out per-user random salts; the Argon2 variant uses one salt for the whole
//! deployment instead.

use argon2::{Algorithm, Argon2, Params, Version};
use md5::Md5;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::warn;

use crate::{
    config::{AuthConfig, HashAlgorithm},
    errors::Error,
};

/// Turns a plaintext password into the string stored in the user directory.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, Error>;
}

/// Unsalted MD5, lowercase hex.
///
/// Weak: kept so existing user directories provisioned with MD5 hashes keep working.
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Hex;

impl CredentialHasher for Md5Hex {
    fn hash(&self, plaintext: &str) -> Result<String, Error> {
        Ok(hex::encode(Md5::digest(plaintext.as_bytes())))
    }
}

/// Unsalted SHA-256, lowercase hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hex;

impl CredentialHasher for Sha256Hex {
    fn hash(&self, plaintext: &str) -> Result<String, Error> {
        Ok(hex::encode(Sha256::digest(plaintext.as_bytes())))
    }
}

/// Argon2 hashing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    /// Argon2id RFC recommendations
    fn default() -> Self {
        Self {
            memory_kib: 19456, // 19 MB
            iterations: 2,
            parallelism: 1,
        }
    }
}

const ARGON2_OUTPUT_LEN: usize = 32;

/// Argon2id with a deployment-wide salt, lowercase hex of a 32 byte output.
#[derive(Clone)]
pub struct Argon2Hex {
    argon2: Argon2<'static>,
    salt: Vec<u8>,
}

impl std::fmt::Debug for Argon2Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hex").field("salt", &"<redacted>").finish()
    }
}

impl Argon2Hex {
    pub fn new(params: Argon2Params, salt: impl Into<Vec<u8>>) -> Result<Self, Error> {
        let params = Params::new(params.memory_kib, params.iterations, params.parallelism, Some(ARGON2_OUTPUT_LEN))
            .map_err(|e| Error::Internal {
                operation: format!("create argon2 params: {e}"),
            })?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            salt: salt.into(),
        })
    }
}

impl CredentialHasher for Argon2Hex {
    fn hash(&self, plaintext: &str) -> Result<String, Error> {
        let mut out = [0u8; ARGON2_OUTPUT_LEN];
        self.argon2
            .hash_password_into(plaintext.as_bytes(), &self.salt, &mut out)
            .map_err(|e| Error::Internal {
                operation: format!("hash password: {e}"),
            })?;
        Ok(hex::encode(out))
    }
}

/// Hash on the blocking pool so slow hashers (Argon2) never stall a runtime worker.
pub async fn hash_off_runtime(hasher: Arc<dyn CredentialHasher>, plaintext: String) -> Result<String, Error> {
    tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })?
}

/// Build the hasher selected by configuration.
pub fn hasher_from_config(config: &AuthConfig) -> Result<Arc<dyn CredentialHasher>, Error> {
    match config.hasher {
        HashAlgorithm::Md5Hex => {
            warn!("Using unsalted MD5 password hashes; consider migrating to auth.hasher: argon2");
            Ok(Arc::new(Md5Hex))
        }
        HashAlgorithm::Sha256Hex => Ok(Arc::new(Sha256Hex)),
        HashAlgorithm::Argon2 => {
            let salt = config.argon2.salt.as_deref().ok_or_else(|| Error::Internal {
                operation: "configure argon2: auth.argon2.salt is not set".to_string(),
            })?;
            let params = Argon2Params {
                memory_kib: config.argon2.memory_kib,
                iterations: config.argon2.iterations,
                parallelism: config.argon2.parallelism,
            };
            Ok(Arc::new(Argon2Hex::new(params, salt.as_bytes())?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Argon2Config;

    fn fast_params() -> Argon2Params {
        Argon2Params {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_md5_known_vectors() {
        assert_eq!(Md5Hex.hash("password").unwrap(), "5f4dcc3b5aa765d61d8327deb882cf99");
        assert_eq!(Md5Hex.hash("").unwrap(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            Sha256Hex.hash("").unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_argon2_is_deterministic_per_salt() {
        let hasher = Argon2Hex::new(fast_params(), "deployment-salt").unwrap();
        let a = hasher.hash("hunter2").unwrap();
        let b = hasher.hash("hunter2").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), ARGON2_OUTPUT_LEN * 2);
        assert_ne!(a, hasher.hash("hunter3").unwrap());

        let other = Argon2Hex::new(fast_params(), "another-salt").unwrap();
        assert_ne!(a, other.hash("hunter2").unwrap());
    }

    #[test]
    fn test_argon2_rejects_short_salt() {
        let hasher = Argon2Hex::new(fast_params(), "short").unwrap();
        assert!(matches!(hasher.hash("pw"), Err(Error::Internal { .. })));
    }

    #[test]
    fn test_argon2_rejects_invalid_params() {
        let params = Argon2Params {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(Argon2Hex::new(params, "deployment-salt").is_err());
    }

    #[test_log::test(tokio::test)]
    async fn test_hash_off_runtime_matches_inline_hash() {
        let hasher = Arc::new(Argon2Hex::new(fast_params(), "deployment-salt").unwrap());
        let inline = hasher.hash("hunter2").unwrap();

        let offloaded = hash_off_runtime(hasher, "hunter2".to_string()).await.unwrap();
        assert_eq!(offloaded, inline);
    }

    #[test_log::test(tokio::test)]
    async fn test_hash_off_runtime_propagates_hasher_errors() {
        let hasher = Arc::new(Argon2Hex::new(fast_params(), "short").unwrap());
        let err = hash_off_runtime(hasher, "pw".to_string()).await.unwrap_err();
        assert!(matches!(err, Error::Internal { .. }));
    }

    #[test]
    fn test_hasher_from_config() {
        let md5 = hasher_from_config(&AuthConfig::default()).unwrap();
        assert_eq!(md5.hash("password").unwrap(), "5f4dcc3b5aa765d61d8327deb882cf99");

        let argon2 = AuthConfig {
            hasher: HashAlgorithm::Argon2,
            argon2: Argon2Config {
                memory_kib: 64,
                iterations: 1,
                parallelism: 1,
                salt: None,
            },
        };
        assert!(hasher_from_config(&argon2).is_err());
    }
}
