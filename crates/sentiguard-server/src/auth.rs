//! Password hashing and bearer session tokens
//!
//! Passwords are stored as argon2 PHC strings. Session tokens are random,
//! handed out once at login, and held sha256-hashed in memory; lookups
//! compare digests in constant time.

use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use parking_lot::RwLock;
use sentiguard_core::{Error, Result};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, phc_hash: &str) -> bool {
    PasswordHash::new(phc_hash)
        .and_then(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed))
        .is_ok()
}

/// In-memory session registry keyed by token digest
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<Vec<([u8; 32], Uuid)>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a token for the parent; only the digest is retained
    pub fn issue(&self, parent_id: Uuid) -> String {
        let token = format!(
            "sg_{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        self.sessions.write().push((digest(&token), parent_id));
        token
    }

    /// Resolve a presented token to its parent id.
    ///
    /// Scans every session and compares digests in constant time, so the
    /// lookup cost does not depend on where (or whether) the token matches.
    pub fn authenticate(&self, token: &str) -> Option<Uuid> {
        let needle = digest(token);
        let mut found = None;
        for (stored, parent_id) in self.sessions.read().iter() {
            if bool::from(stored.ct_eq(&needle)) {
                found = Some(*parent_id);
            }
        }
        found
    }

    /// Drop every session belonging to the parent
    pub fn revoke_parent(&self, parent_id: &Uuid) {
        self.sessions.write().retain(|(_, p)| p != parent_id);
    }
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}
