//! Salted, iterated SHA-256 password hashes.

use rand::RngCore;
use sha2::{Digest, Sha256};

use catalog_core::{DomainError, DomainResult};

pub const MIN_PASSWORD_LEN: usize = 8;

const ROUNDS: u32 = 10_000;
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

/// A stored password. The plain text is never kept.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    rounds: u32,
    salt: [u8; SALT_LEN],
    digest: [u8; DIGEST_LEN],
}

impl PasswordHash {
    /// Hash `password` under a fresh random salt.
    pub fn new(password: &str) -> DomainResult<Self> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        Ok(Self {
            rounds: ROUNDS,
            salt,
            digest: stretch(password.as_bytes(), &salt, ROUNDS),
        })
    }

    pub fn verify(&self, password: &str) -> bool {
        let candidate = stretch(password.as_bytes(), &self.salt, self.rounds);
        candidate
            .iter()
            .zip(self.digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PasswordHash")
            .field("rounds", &self.rounds)
            .finish_non_exhaustive()
    }
}

fn stretch(password: &[u8], salt: &[u8], rounds: u32) -> [u8; DIGEST_LEN] {
    let mut digest = [0u8; DIGEST_LEN];
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password);
    digest.copy_from_slice(&hasher.finalize());
    for _ in 1..rounds {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        hasher.update(password);
        digest.copy_from_slice(&hasher.finalize());
    }
    digest
}
