//! Shared-password gate for the results view

use crate::{Error, Result};
use subtle::ConstantTimeEq;

/// Holds the BLAKE3 digest of the admin password, never the password itself
#[derive(Clone)]
pub struct AdminGate {
    digest: [u8; 32],
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate").finish_non_exhaustive()
    }
}

impl AdminGate {
    /// Create a gate for a plaintext password
    pub fn new(password: &str) -> Self {
        Self {
            digest: blake3::hash(password.as_bytes()).into(),
        }
    }

    /// Create a gate from a hex-encoded BLAKE3 digest
    pub fn from_digest_hex(digest: &str) -> Result<Self> {
        let bytes = hex::decode(digest).map_err(|_| Error::internal("Admin digest is not hex"))?;
        let digest: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::internal("Admin digest must be 32 bytes"))?;
        Ok(Self { digest })
    }

    /// Hex BLAKE3 digest of a password, as stored in configuration
    pub fn digest_hex(password: &str) -> String {
        blake3::hash(password.as_bytes()).to_hex().to_string()
    }

    /// Check a candidate password in constant time
    pub fn verify(&self, password: &str) -> Result<()> {
        let attempt: [u8; 32] = blake3::hash(password.as_bytes()).into();
        if bool::from(attempt.ct_eq(&self.digest)) {
            Ok(())
        } else {
            tracing::warn!("🔐 Admin password rejected");
            Err(Error::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_password() {
        let gate = AdminGate::new("1234");
        assert!(gate.verify("1234").is_ok());
        assert!(matches!(gate.verify("4321"), Err(Error::Unauthorized)));
        assert!(gate.verify("").is_err());
    }

    #[test]
    fn test_digest_round_trip() {
        let digest = AdminGate::digest_hex("secret");
        let gate = AdminGate::from_digest_hex(&digest).unwrap();
        assert!(gate.verify("secret").is_ok());
    }

    #[test]
    fn test_bad_digest_rejected() {
        assert!(AdminGate::from_digest_hex("zz").is_err());
        assert!(AdminGate::from_digest_hex(&hex::encode([1u8; 8])).is_err());
    }

    #[test]
    fn test_debug_hides_digest() {
        let gate = AdminGate::new("1234");
        assert_eq!(format!("{gate:?}"), "AdminGate { .. }");
    }
}
