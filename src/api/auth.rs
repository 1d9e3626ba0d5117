//! Bearer-token identity.
//!
//! Tokens are issued elsewhere; the server only stores their SHA-256
//! digests and maps a presented token to the user it was issued for.

use super::error::ApiError;
use crate::config::AuthConfig;
use crate::task::domain::UserId;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::warn;

const DIGEST_HEX_LEN: usize = 64;

/// Registry of token digests and the users they authenticate.
#[derive(Default)]
pub struct TokenRegistry {
    entries: Vec<(String, UserId)>,
}

impl TokenRegistry {
    /// Builds the registry from configuration, skipping malformed digests.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        let entries = config
            .tokens
            .iter()
            .filter_map(|entry| {
                let digest = entry.token_sha256.trim().to_ascii_lowercase();
                let well_formed = digest.len() == DIGEST_HEX_LEN
                    && digest.bytes().all(|byte| byte.is_ascii_hexdigit());
                if well_formed {
                    Some((digest, entry.user_id))
                } else {
                    warn!(user_id = %entry.user_id, "ignoring malformed token digest");
                    None
                }
            })
            .collect();
        Self { entries }
    }

    /// Registers the digest of `token` for `user`.
    pub fn insert_token(&mut self, token: &str, user: UserId) {
        self.entries.push((digest_hex(token), user));
    }

    /// Returns the user `token` was issued for.
    ///
    /// Every entry is compared so lookup time does not depend on which one
    /// matches.
    #[must_use]
    pub fn authenticate(&self, token: &str) -> Option<UserId> {
        let presented = digest_hex(token);
        self.entries
            .iter()
            .fold(None, |found, (digest, user)| {
                if constant_time_eq(digest, &presented) {
                    Some(*user)
                } else {
                    found
                }
            })
    }

    /// Returns the number of registered tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no tokens are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Returns the lowercase hex SHA-256 digest of `token`.
#[must_use]
pub fn digest_hex(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

fn constant_time_eq(left: &str, right: &str) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.bytes()
        .zip(right.bytes())
        .fold(0_u8, |acc, (l, r)| acc | (l ^ r))
        == 0
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<TokenRegistry>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("not authorized, no token".to_owned()))?;
        let registry = Arc::<TokenRegistry>::from_ref(state);
        registry
            .authenticate(token)
            .map(Self)
            .ok_or_else(|| ApiError::Unauthorized("not authorized, token failed".to_owned()))
    }
}
