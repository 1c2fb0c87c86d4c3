//! auth::token
//!
//! Cached bearer token with an expiry.

use chrono::{DateTime, Duration, Utc};

/// How long an exchanged token is trusted. Spacelift tokens live for about
/// an hour.
pub const TOKEN_TTL_MINUTES: i64 = 55;

/// A token is refreshed once less than this much lifetime remains.
pub const EXPIRY_BUFFER_SECS: i64 = 60;

/// A bearer token and when it stops being trusted.
#[derive(Clone)]
pub struct CachedToken {
    jwt: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Wrap a freshly issued token.
    pub fn issued(jwt: String, now: DateTime<Utc>) -> Self {
        Self {
            jwt,
            expires_at: now + Duration::minutes(TOKEN_TTL_MINUTES),
        }
    }

    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token should be replaced before use at `now`.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_BUFFER_SECS) >= self.expires_at
    }
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
