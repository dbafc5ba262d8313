use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

use crate::db::key_value_store::{KeyValueStore, KvError};
use crate::routes::auth::claims::{Claims, TokenUse};
use crate::utils::jwt::{create_jwt, decode_jwt, decode_jwt_allow_expired, JwtKeys};

pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature check or claims shape failed.
    #[error("invalid token")]
    Invalid,
    #[error("token expired")]
    Expired,
    /// Signature and expiry are fine but the registry disagrees: the session
    /// was logged out or superseded by a newer login.
    #[error("token revoked")]
    Revoked,
    #[error(transparent)]
    Store(#[from] KvError),
    #[error("token encoding failed: {0}")]
    Encode(jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn registry_key(user_id: &str) -> String {
    format!("refresh_token:{}", user_id)
}

/// Issues and validates the access/refresh token pair and owns the
/// server-side refresh-token registry.
///
/// The registry holds at most one live refresh token per user; persisting a
/// new one overwrites (and so invalidates) the prior. Concurrent logins from
/// two devices race on that key and the later write wins, silently ending the
/// earlier session. Accepted behavior, not a bug.
#[derive(Clone)]
pub struct TokenService {
    access_keys: Arc<JwtKeys>,
    refresh_keys: Arc<JwtKeys>,
    registry: Arc<dyn KeyValueStore>,
}

impl TokenService {
    pub fn new(
        access_keys: Arc<JwtKeys>,
        refresh_keys: Arc<JwtKeys>,
        registry: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            access_keys,
            refresh_keys,
            registry,
        }
    }

    /// Mints both tokens for a user. Pure of stored state: nothing is
    /// persisted until [`persist_refresh_token`](Self::persist_refresh_token).
    pub fn issue(&self, user_id: Uuid) -> Result<TokenPair, TokenError> {
        let access_token = self.mint(user_id, TokenUse::Access)?;
        let refresh_token = self.mint(user_id, TokenUse::Refresh)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    fn mint(&self, user_id: Uuid, token_use: TokenUse) -> Result<String, TokenError> {
        let (keys, ttl) = match token_use {
            TokenUse::Access => (&self.access_keys, ACCESS_TOKEN_TTL_SECS),
            TokenUse::Refresh => (&self.refresh_keys, REFRESH_TOKEN_TTL_SECS),
        };
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now() + Duration::seconds(ttl)).timestamp() as usize,
            token_use,
        };
        create_jwt(&claims, keys).map_err(TokenError::Encode)
    }

    /// Stores the refresh token under `refresh_token:<userId>` with a 7-day
    /// TTL, overwriting any prior value.
    pub async fn persist_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
    ) -> Result<(), TokenError> {
        self.registry
            .set(
                &registry_key(&user_id.to_string()),
                token,
                Some(StdDuration::from_secs(REFRESH_TOKEN_TTL_SECS as u64)),
            )
            .await?;
        Ok(())
    }

    /// Verifies the presented refresh token against signature, expiry, and
    /// the registry, then mints a fresh access token. The refresh token
    /// itself is not rotated.
    pub async fn rotate_access(&self, presented: &str) -> Result<String, TokenError> {
        let decoded = decode_jwt(presented, &self.refresh_keys).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        if decoded.claims.token_use != TokenUse::Refresh {
            return Err(TokenError::Invalid);
        }

        let stored = self
            .registry
            .get(&registry_key(&decoded.claims.sub))
            .await?
            .ok_or(TokenError::Revoked)?;

        // Byte-for-byte match against the registry catches logout/rotation
        // races even when the presented token still verifies.
        if stored.as_bytes().ct_eq(presented.as_bytes()).unwrap_u8() != 1 {
            return Err(TokenError::Revoked);
        }

        let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| TokenError::Invalid)?;
        self.mint(user_id, TokenUse::Access)
    }

    /// Validates an access token from the transport cookie.
    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        let decoded = decode_jwt(token, &self.access_keys).map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;
        if decoded.claims.token_use != TokenUse::Access {
            return Err(TokenError::Invalid);
        }
        Ok(decoded.claims)
    }

    /// Deletes the registry entry. Idempotent.
    pub async fn revoke(&self, user_id: &str) -> Result<(), TokenError> {
        self.registry.delete(&registry_key(user_id)).await?;
        Ok(())
    }

    /// Failure-tolerant decode for logout: a bad signature yields `None`, an
    /// expired-but-genuine token still yields its claims so the registry
    /// entry can be revoked.
    pub fn try_decode_refresh(&self, token: &str) -> Option<Claims> {
        let decoded = decode_jwt_allow_expired(token, &self.refresh_keys).ok()?;
        (decoded.claims.token_use == TokenUse::Refresh).then_some(decoded.claims)
    }
}
