use serde::{Deserialize, Serialize};

/// A document in the `users` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    /// PHC-encoded Argon2 hash.
    pub password_digest: String,
}

/// The identity carried by an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub username: String,
}
