//! Sign-up, sign-in and the access rules between screens.
//!
//! `LocalAuth` keeps profiles in the `profiles` table and remembers the
//! signed-in user in a small JSON session file in the data directory.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;
use tracing::{info, warn};

use crate::database::{Database, DatabaseError, ProfileRecord};
use crate::models::User;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Full name is required")]
    EmptyName,
    #[error("Enter a valid email address")]
    InvalidEmail,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("An account with email {0} already exists")]
    EmailTaken(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Not signed in")]
    NotSignedIn,
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Session file error: {0}")]
    Session(String),
}

impl AuthError {
    /// Validation problems the user can fix by editing the form.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AuthError::EmptyName | AuthError::InvalidEmail | AuthError::PasswordTooShort
        )
    }
}

/// Who is signed in, and how to change that.
pub trait SessionProvider {
    fn sign_up(&mut self, name: &str, email: &str, password: &str) -> Result<User, AuthError>;
    fn sign_in(&mut self, email: &str, password: &str) -> Result<User, AuthError>;
    fn sign_out(&mut self) -> Result<(), AuthError>;
    fn current_user(&self) -> Option<&User>;
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    user_id: String,
    signed_in_at: chrono::DateTime<Utc>,
}

pub struct LocalAuth {
    db: Rc<Database>,
    session_path: PathBuf,
    current: Option<User>,
}

impl LocalAuth {
    /// Restore the session stored at `session_path`, if it still names an
    /// existing profile.
    pub fn new(db: Rc<Database>, session_path: PathBuf) -> Result<Self, AuthError> {
        let mut auth = Self {
            db,
            session_path,
            current: None,
        };
        auth.current = auth.restore()?;
        Ok(auth)
    }

    fn restore(&self) -> Result<Option<User>, AuthError> {
        if !self.session_path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.session_path).map_err(|e| AuthError::Session(e.to_string()))?;
        let session: SessionFile = match serde_json::from_str(&contents) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable session file");
                return Ok(None);
            }
        };
        Ok(self.db.get_profile(&session.user_id)?.map(|record| record.user))
    }

    fn persist(&self, user: &User) -> Result<(), AuthError> {
        if let Some(parent) = self.session_path.parent() {
            fs::create_dir_all(parent).map_err(|e| AuthError::Session(e.to_string()))?;
        }
        let session = SessionFile {
            user_id: user.id.clone(),
            signed_in_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&session).map_err(|e| AuthError::Session(e.to_string()))?;
        fs::write(&self.session_path, json).map_err(|e| AuthError::Session(e.to_string()))
    }
}

impl SessionProvider for LocalAuth {
    fn sign_up(&mut self, name: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::EmptyName);
        }
        let email = validate_email(email)?;
        validate_password(password)?;

        if self.db.find_profile_by_email(email)?.is_some() {
            return Err(AuthError::EmailTaken(email.to_string()));
        }

        let salt = uuid::Uuid::new_v4().simple().to_string();
        let record = ProfileRecord {
            user: User {
                id: uuid::Uuid::new_v4().to_string(),
                name: name.to_string(),
                email: email.to_string(),
                created_at: Utc::now(),
            },
            password_hash: hash_password(&salt, password),
            salt,
        };
        self.db.insert_profile(&record)?;
        self.persist(&record.user)?;
        info!(user_id = %record.user.id, "signed up");
        self.current = Some(record.user.clone());
        Ok(record.user)
    }

    fn sign_in(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = validate_email(email)?;
        validate_password(password)?;

        let record = self
            .db
            .find_profile_by_email(email)?
            .ok_or(AuthError::InvalidCredentials)?;
        if hash_password(&record.salt, password) != record.password_hash {
            warn!(email, "failed sign-in");
            return Err(AuthError::InvalidCredentials);
        }
        self.persist(&record.user)?;
        info!(user_id = %record.user.id, "signed in");
        self.current = Some(record.user.clone());
        Ok(record.user)
    }

    fn sign_out(&mut self) -> Result<(), AuthError> {
        if self.current.take().is_none() {
            return Err(AuthError::NotSignedIn);
        }
        if self.session_path.exists() {
            fs::remove_file(&self.session_path).map_err(|e| AuthError::Session(e.to_string()))?;
        }
        info!("signed out");
        Ok(())
    }

    fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }
}

fn validate_email(email: &str) -> Result<&str, AuthError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AuthError::InvalidEmail),
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Screens of the application, named after the routes they replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    SignIn,
    SignUp,
    Dashboard,
}

impl Route {
    pub fn is_auth_page(self) -> bool {
        matches!(self, Route::SignIn | Route::SignUp)
    }

    pub fn is_protected(self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

/// Where a navigation to `route` actually lands.
///
/// Signed-out users cannot reach protected screens and go to the landing
/// screen instead; signed-in users skip the sign-in and sign-up forms.
pub fn guard(route: Route, signed_in: bool) -> Route {
    if !signed_in && route.is_protected() {
        Route::Landing
    } else if signed_in && route.is_auth_page() {
        Route::Dashboard
    } else {
        route
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> (tempfile::TempDir, LocalAuth) {
        let dir = tempfile::tempdir().unwrap();
        let db = Rc::new(Database::open_in_memory().unwrap());
        let auth = LocalAuth::new(db, dir.path().join("session.json")).unwrap();
        (dir, auth)
    }

    #[test]
    fn sign_up_then_sign_in() {
        let (_dir, mut auth) = auth();
        let user = auth.sign_up("Ada", "ada@example.com", "secret1").unwrap();
        auth.sign_out().unwrap();
        assert!(auth.current_user().is_none());
        let again = auth.sign_in("ada@example.com", "secret1").unwrap();
        assert_eq!(user.id, again.id);
    }

    #[test]
    fn wrong_password_is_rejected() {
        let (_dir, mut auth) = auth();
        auth.sign_up("Ada", "ada@example.com", "secret1").unwrap();
        auth.sign_out().unwrap();
        assert!(matches!(
            auth.sign_in("ada@example.com", "secret2"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn validation_runs_before_lookup() {
        let (_dir, mut auth) = auth();
        assert!(matches!(auth.sign_up(" ", "a@b", "secret1"), Err(AuthError::EmptyName)));
        assert!(matches!(auth.sign_up("A", "nope", "secret1"), Err(AuthError::InvalidEmail)));
        assert!(matches!(auth.sign_in("a@b", "123"), Err(AuthError::PasswordTooShort)));
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let (_dir, mut auth) = auth();
        auth.sign_up("Ada", "ada@example.com", "secret1").unwrap();
        assert!(matches!(
            auth.sign_up("Other", "ada@example.com", "secret2"),
            Err(AuthError::EmailTaken(_))
        ));
    }

    #[test]
    fn session_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let db = Rc::new(Database::new(&dir.path().join("app.db")).unwrap());
        let session = dir.path().join("session.json");
        let mut first = LocalAuth::new(Rc::clone(&db), session.clone()).unwrap();
        let user = first.sign_up("Ada", "ada@example.com", "secret1").unwrap();
        let second = LocalAuth::new(db, session).unwrap();
        assert_eq!(second.current_user().map(|u| u.id.clone()), Some(user.id));
    }

    #[test]
    fn guard_redirects() {
        assert_eq!(guard(Route::Dashboard, false), Route::Landing);
        assert_eq!(guard(Route::SignIn, true), Route::Dashboard);
        assert_eq!(guard(Route::SignUp, true), Route::Dashboard);
        assert_eq!(guard(Route::Landing, false), Route::Landing);
        assert_eq!(guard(Route::Landing, true), Route::Landing);
        assert_eq!(guard(Route::SignIn, false), Route::SignIn);
        assert_eq!(guard(Route::Dashboard, true), Route::Dashboard);
    }
}
