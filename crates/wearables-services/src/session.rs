//! Mock account sessions.
//!
//! There is no credential check: any well-formed email with a long enough
//! password signs in. Session state lives behind the [`SessionStore`] port so
//! hosts can decide where (or whether) it is kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Error, Debug, PartialEq)]
pub enum AuthError {
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("password must be at least 6 characters")]
    WeakPassword,
    #[error("name must not be empty")]
    EmptyName,
    #[error("not signed in")]
    NotSignedIn,
    #[error("session store: {0}")]
    Store(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: Uuid,
    pub issued_at: DateTime<Utc>,
}

/// Storage port for the current session.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, AuthError>;
    fn save(&self, session: &Session) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

/// Process-local session store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Session>>,
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<Session>, AuthError> {
        let slot = self.slot.lock().map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(slot.clone())
    }

    fn save(&self, session: &Session) -> Result<(), AuthError> {
        let mut slot = self.slot.lock().map_err(|e| AuthError::Store(e.to_string()))?;
        *slot = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        let mut slot = self.slot.lock().map_err(|e| AuthError::Store(e.to_string()))?;
        *slot = None;
        Ok(())
    }
}

/// Login / signup / logout over a [`SessionStore`].
pub struct AuthService<S: SessionStore> {
    store: S,
}

impl<S: SessionStore> AuthService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Sign in. The display name is taken from the email's local part.
    pub fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email)?;
        check_password(password)?;
        let name = email.split('@').next().unwrap_or_default().to_string();
        self.start_session(name, email)
    }

    /// Create an account and sign in.
    pub fn signup(&self, name: &str, email: &str, password: &str) -> Result<Session, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::EmptyName);
        }
        let email = normalize_email(email)?;
        check_password(password)?;
        self.start_session(name.to_string(), email)
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        if self.store.load()?.is_none() {
            return Err(AuthError::NotSignedIn);
        }
        self.store.clear()?;
        tracing::info!("signed out");
        Ok(())
    }

    pub fn current(&self) -> Result<Option<Session>, AuthError> {
        self.store.load()
    }

    fn start_session(&self, name: String, email: String) -> Result<Session, AuthError> {
        let now = Utc::now();
        let session = Session {
            user: User {
                id: Uuid::new_v4(),
                name,
                email,
                created_at: now,
            },
            token: Uuid::new_v4(),
            issued_at: now,
        };
        self.store.save(&session)?;
        tracing::info!(user = %session.user.id, "session started");
        Ok(session)
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_ascii_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(AuthError::InvalidEmail(email))
    }
}

fn check_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}
