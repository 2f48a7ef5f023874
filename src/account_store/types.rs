//! Account Store data types

use super::credential::StoredCredential;
use crate::models::AccountKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered identity
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    /// Unique, case-sensitive, immutable
    pub username: String,
    #[serde(skip)]
    pub credential: StoredCredential,
    pub email: String,
    pub kind: AccountKind,
    /// Present iff `kind == Club`
    pub club_name: Option<String>,
    /// Only an external trust-granting process flips this
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Signup request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub kind: AccountKind,
    #[serde(default)]
    pub club_name: Option<String>,
}

impl RegisterRequest {
    pub fn student(username: &str, password: &str, email: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
            kind: AccountKind::Student,
            club_name: None,
        }
    }

    pub fn club(username: &str, password: &str, email: &str, club_name: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
            kind: AccountKind::Club,
            club_name: Some(club_name.to_string()),
        }
    }
}

/// The single currently-authenticated identity
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub session_id: Uuid,
    pub username: String,
    pub kind: AccountKind,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn for_account(account: &Account) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            username: account.username.clone(),
            kind: account.kind,
            started_at: Utc::now(),
        }
    }
}
