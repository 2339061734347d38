//! Token codec: signed, time-bound identity assertions (HS256 JWT).
//!
//! Verification needs nothing but the process-wide secret. There is no
//! revocation list; logout is a client-side discard and a token stays valid
//! until `exp`.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use tracing::debug;

use stockroom_core::DomainError;

use crate::claims::{JwtClaims, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(String),

    /// Bad signature, malformed payload, or outside the validity window.
    /// Deliberately a single variant.
    #[error("invalid or expired token")]
    Invalid,
}

impl From<TokenError> for DomainError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => DomainError::Internal(msg),
            TokenError::Invalid => DomainError::unauthorized("Invalid or expired token"),
        }
    }
}

/// Issues and verifies tokens.
pub trait TokenCodec: Send + Sync {
    fn issue(&self, claims: &JwtClaims) -> Result<String, TokenError>;

    /// Verify the signature, decode the claims and check them against `now`.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// HMAC-SHA256 codec keyed by a shared secret.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();

        let mut validation = Validation::new(Algorithm::HS256);
        // The time window is checked by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl core::fmt::Debug for Hs256TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec for Hs256TokenCodec {
    fn issue(&self, claims: &JwtClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = decode::<JwtClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!(reason = %e, "token rejected");
            TokenError::Invalid
        })?;

        validate_claims(&data.claims, now).map_err(|e| {
            debug!(reason = %e, sub = %data.claims.sub, "token rejected");
            TokenError::Invalid
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use stockroom_core::UserId;

    use super::*;
    use crate::Role;

    fn claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims::new(
            UserId::new(),
            Role::Admin,
            "Alice",
            "alice@example.com",
            now,
            Duration::days(1),
        )
    }

    #[test]
    fn issued_token_verifies_until_expiry() {
        let codec = Hs256TokenCodec::new("test-secret");
        let now = Utc::now();
        let claims = claims(now);
        let token = codec.issue(&claims).unwrap();

        assert_eq!(codec.verify(&token, now).unwrap(), claims);
        let last_second = claims.expires_at - Duration::seconds(1);
        assert_eq!(codec.verify(&token, last_second).unwrap(), claims);
    }

    #[test]
    fn rejected_at_and_after_expiry() {
        let codec = Hs256TokenCodec::new("test-secret");
        let claims = claims(Utc::now());
        let token = codec.issue(&claims).unwrap();

        assert_eq!(codec.verify(&token, claims.expires_at), Err(TokenError::Invalid));
        assert_eq!(
            codec.verify(&token, claims.expires_at + Duration::hours(1)),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn rejects_any_corrupted_signature_symbol() {
        let codec = Hs256TokenCodec::new("test-secret");
        let now = Utc::now();
        let token = codec.issue(&claims(now)).unwrap();
        let (head, signature) = token.rsplit_once('.').unwrap();

        for i in 0..signature.len() {
            let mut sig: Vec<char> = signature.chars().collect();
            sig[i] = if sig[i] == 'A' { 'B' } else { 'A' };
            let tampered = format!("{head}.{}", sig.into_iter().collect::<String>());

            assert_ne!(tampered, token);
            assert_eq!(codec.verify(&tampered, now), Err(TokenError::Invalid), "position {i}");
        }
    }

    #[test]
    fn rejects_foreign_secret_and_garbage() {
        let now = Utc::now();
        let token = Hs256TokenCodec::new("secret-1").issue(&claims(now)).unwrap();
        let other = Hs256TokenCodec::new("secret-2");

        assert_eq!(other.verify(&token, now), Err(TokenError::Invalid));
        assert_eq!(other.verify("invalid.token.here", now), Err(TokenError::Invalid));
        assert_eq!(other.verify("", now), Err(TokenError::Invalid));
    }

    #[test]
    fn invalid_token_maps_to_unauthorized() {
        let err: DomainError = TokenError::Invalid.into();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }
}
