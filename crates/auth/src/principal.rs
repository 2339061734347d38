use chrono::{DateTime, Utc};
use serde::Serialize;

use stockroom_core::UserId;

use crate::{JwtClaims, Role};

/// The authenticated identity of one request.
///
/// Built fresh from a verified token, never mutated, dropped when the request
/// ends. There is no server-side session behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub subject_id: UserId,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// True when `owner` is this principal's own id.
    pub fn is(&self, owner: UserId) -> bool {
        self.subject_id == owner
    }
}

impl From<JwtClaims> for Principal {
    fn from(claims: JwtClaims) -> Self {
        Self {
            subject_id: claims.sub,
            role: claims.role,
            name: claims.name,
            email: claims.email,
            issued_at: claims.issued_at,
            expires_at: claims.expires_at,
        }
    }
}
