//! One-way password hashing capability (bcrypt).

use stockroom_core::DomainError;

/// Salted one-way hash + verify.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, DomainError>;
    fn verify(&self, plain: &str, hash: &str) -> Result<bool, DomainError>;
}

/// Default work factor: ~50-100ms per verify on commodity hardware.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// `cost` is clamped to bcrypt's supported range (4..=31).
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(4, 31),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plain: &str) -> Result<String, DomainError> {
        bcrypt::hash(plain, self.cost)
            .map_err(|e| DomainError::internal(format!("failed to hash password: {e}")))
    }

    fn verify(&self, plain: &str, hash: &str) -> Result<bool, DomainError> {
        bcrypt::verify(plain, hash)
            .map_err(|e| DomainError::internal(format!("failed to verify password: {e}")))
    }
}
