//! AccountStore - Registered identities and credentials
//!
//! ## Responsibilities
//!
//! - Account registration (unique usernames, club name rule)
//! - Credential check via a pluggable [`CredentialVerifier`]
//! - Trust flag updates from an external process

mod credential;
mod types;

pub use credential::{CredentialVerifier, PlaintextVerifier, StoredCredential};
pub use types::*;

use crate::error::{Error, Result};
use crate::event_store::SEED_ACCOUNT;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Usernames owned by the system; nobody may register them
pub const RESERVED_USERNAMES: [&str; 1] = [SEED_ACCOUNT];

/// AccountStore instance
pub struct AccountStore {
    accounts: RwLock<HashMap<String, Account>>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl AccountStore {
    /// Create store with plaintext credentials
    pub fn new() -> Self {
        Self::with_verifier(Arc::new(PlaintextVerifier))
    }

    /// Create store with a custom credential verifier
    pub fn with_verifier(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            verifier,
        }
    }

    /// Register a new account (always unverified)
    pub async fn register(&self, req: RegisterRequest) -> Result<Account> {
        if req.username.is_empty() {
            return Err(Error::Validation("Username is required".to_string()));
        }

        let club_name = match req.kind {
            crate::models::AccountKind::Club => {
                let name = req
                    .club_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| {
                        Error::Validation("Club name is required for club accounts".to_string())
                    })?;
                Some(name.to_string())
            }
            crate::models::AccountKind::Student => None,
        };

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&req.username)
            || RESERVED_USERNAMES.contains(&req.username.as_str())
        {
            return Err(Error::DuplicateUsername(req.username));
        }

        let account = Account {
            username: req.username.clone(),
            credential: self.verifier.seal(&req.password),
            email: req.email,
            kind: req.kind,
            club_name,
            verified: false,
            created_at: Utc::now(),
        };
        accounts.insert(req.username, account.clone());

        tracing::info!(
            username = %account.username,
            kind = %account.kind,
            "Account registered"
        );

        Ok(account)
    }

    /// Check credentials (exact match, no normalization)
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Account> {
        let accounts = self.accounts.read().await;
        match accounts.get(username) {
            Some(account) if self.verifier.verify(&account.credential, password) => {
                Ok(account.clone())
            }
            _ => {
                tracing::debug!(username = %username, "Authentication failed");
                Err(Error::InvalidCredentials)
            }
        }
    }

    /// Get account by username
    pub async fn get(&self, username: &str) -> Option<Account> {
        self.accounts.read().await.get(username).cloned()
    }

    /// Set the trust flag (external trust-granting process only)
    pub async fn set_verified(&self, username: &str, verified: bool) -> Result<Account> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(username)
            .ok_or_else(|| Error::NotFound(format!("Account {} not found.", username)))?;
        account.verified = verified;

        tracing::info!(username = %username, verified = verified, "Account trust updated");

        Ok(account.clone())
    }

    /// Registered account count
    pub async fn count(&self) -> usize {
        self.accounts.read().await.len()
    }
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::new()
    }
}
