//! Credential verification
//!
//! The store only keeps a [`StoredCredential`]; how it is produced and
//! checked is up to the [`CredentialVerifier`] it was built with.

/// Opaque stored secret
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StoredCredential(String);

impl StoredCredential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StoredCredential(***)")
    }
}

/// Turns secrets into stored credentials and checks candidates against them
pub trait CredentialVerifier: Send + Sync {
    fn seal(&self, secret: &str) -> StoredCredential;

    fn verify(&self, stored: &StoredCredential, candidate: &str) -> bool;
}

/// Exact-match plaintext comparison.
///
/// Insecure; stands in until a hashing verifier is plugged in.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextVerifier;

impl CredentialVerifier for PlaintextVerifier {
    fn seal(&self, secret: &str) -> StoredCredential {
        StoredCredential::new(secret)
    }

    fn verify(&self, stored: &StoredCredential, candidate: &str) -> bool {
        stored.as_str() == candidate
    }
}
