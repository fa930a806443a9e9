//! Username/password authentication against the `users` collection.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::user::{User, UserIdentity};
use crate::store::{find_record, insert_record, Collection, DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username already exists")]
    UsernameTaken,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("missing {0}")]
    MissingField(&'static str),

    #[error("password hashing failed")]
    PasswordHash,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate { .. } => AuthError::UsernameTaken,
            other => AuthError::Store(other),
        }
    }
}

pub struct AuthService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> AuthService<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Creates a user.
    ///
    /// # Errors
    ///
    /// `AuthError::UsernameTaken` if the username exists (the existing record
    /// is left as it was), `AuthError::MissingField` for an empty username or
    /// password.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if username.is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        if self.find_user(username).await?.is_some() {
            warn!("registration rejected, username '{username}' already exists");
            return Err(AuthError::UsernameTaken);
        }

        let user = User {
            username: username.to_string(),
            password_digest: hash_password(password)?,
        };
        // The unique key still catches a concurrent registration of the same name.
        insert_record(self.store, Collection::Users, &user).await?;

        info!("registered user '{username}'");
        Ok(())
    }

    /// Checks a username/password pair.
    ///
    /// # Errors
    ///
    /// `AuthError::InvalidCredentials` if the user is unknown or the password
    /// does not verify.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserIdentity, AuthError> {
        let user = self
            .find_user(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&user.password_digest, password) {
            warn!("failed login for '{username}'");
            return Err(AuthError::InvalidCredentials);
        }

        info!("user '{username}' logged in");
        Ok(UserIdentity {
            username: user.username,
        })
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, AuthError> {
        Ok(find_record(self.store, Collection::Users, json!({ "username": username })).await?)
    }
}

/// Hashes a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// An unparseable digest never verifies.
pub fn verify_password(digest: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;

    #[test]
    fn test_hash_then_verify() {
        let digest = hash_password("correct horse").unwrap();
        assert!(verify_password(&digest, "correct horse"));
    }

    #[test]
    fn test_verify_rejects_other_password() {
        let digest = hash_password("correct horse").unwrap();
        assert!(!verify_password(&digest, "battery staple"));
        assert!(!verify_password(&digest, ""));
    }

    #[test]
    fn test_hash_is_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
        assert!(verify_password(&a, "same"));
        assert!(verify_password(&b, "same"));
    }

    #[test]
    fn test_garbage_digest_never_verifies() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryDocumentStore::new();
        let auth = AuthService::new(&store);

        auth.register("ada", "s3cret").await.unwrap();
        let identity = auth.login("ada", "s3cret").await.unwrap();
        assert_eq!(identity.username, "ada");
    }

    #[tokio::test]
    async fn test_register_stores_digest_not_password() {
        let store = MemoryDocumentStore::new();
        AuthService::new(&store).register("ada", "s3cret").await.unwrap();

        let users = store.documents(Collection::Users);
        assert_eq!(users.len(), 1);
        let digest = users[0]["password_digest"].as_str().unwrap();
        assert_ne!(digest, "s3cret");
        assert!(verify_password(digest, "s3cret"));
    }

    #[tokio::test]
    async fn test_duplicate_registration_leaves_record_unchanged() {
        let store = MemoryDocumentStore::new();
        let auth = AuthService::new(&store);
        auth.register("ada", "first").await.unwrap();
        let before = store.documents(Collection::Users);

        let err = auth.register("ada", "second").await.unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
        assert_eq!(store.documents(Collection::Users), before);
        assert!(auth.login("ada", "first").await.is_ok());
        assert!(matches!(
            auth.login("ada", "second").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let store = MemoryDocumentStore::new();
        let err = AuthService::new(&store).login("ghost", "x").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let store = MemoryDocumentStore::new();
        let auth = AuthService::new(&store);
        auth.register("ada", "right").await.unwrap();

        let err = auth.login("ada", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_register_requires_username_and_password() {
        let store = MemoryDocumentStore::new();
        let auth = AuthService::new(&store);

        assert!(matches!(
            auth.register("", "pw").await,
            Err(AuthError::MissingField("username"))
        ));
        assert!(matches!(
            auth.register("ada", "").await,
            Err(AuthError::MissingField("password"))
        ));
        assert_eq!(store.write_count(Collection::Users), 0);
    }
}
