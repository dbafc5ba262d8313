use std::collections::HashSet;

use crate::routes::auth::claims::Claims;
use jsonwebtoken::{
    decode, encode, errors::Error, Algorithm, DecodingKey, EncodingKey, Header, TokenData,
    Validation,
};

/// Minimum acceptable size for a signing secret in bytes.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;
/// Minimum number of unique bytes expected, to reject trivially guessable values.
const MIN_UNIQUE_JWT_BYTES: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum JwtSecretError {
    #[error("{var} must be set")]
    Missing { var: &'static str },
    #[error("JWT secret must be at least {required} bytes, but {actual} bytes were provided")]
    TooShort { actual: usize, required: usize },
    #[error(
        "JWT secret must contain sufficient entropy (at least {required} unique bytes); only {actual} unique bytes found"
    )]
    LowEntropy { actual: usize, required: usize },
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

impl JwtKeys {
    /// Reads the secret from the named environment variable. Access and
    /// refresh tokens use distinct variables so the two key sets never share
    /// material.
    pub fn from_env(var: &'static str) -> Result<Self, JwtSecretError> {
        let value = std::env::var(var).map_err(|_| JwtSecretError::Missing { var })?;
        Self::from_secret(value)
    }

    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, JwtSecretError> {
        let bytes = secret.as_ref();
        validate_secret(bytes)?;

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

fn validate_secret(secret: &[u8]) -> Result<(), JwtSecretError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(JwtSecretError::TooShort {
            actual: secret.len(),
            required: MIN_JWT_SECRET_LENGTH,
        });
    }

    let unique = secret.iter().copied().collect::<HashSet<_>>().len();
    if unique < MIN_UNIQUE_JWT_BYTES {
        return Err(JwtSecretError::LowEntropy {
            actual: unique,
            required: MIN_UNIQUE_JWT_BYTES,
        });
    }

    Ok(())
}

pub fn create_jwt(claims: &Claims, keys: &JwtKeys) -> Result<String, Error> {
    encode(&Header::default(), claims, keys.encoding_key())
}

pub fn decode_jwt(token: &str, keys: &JwtKeys) -> Result<TokenData<Claims>, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.insert("exp".to_string());
    decode::<Claims>(token, keys.decoding_key(), &validation)
}

/// Decode ignoring expiry. Logout needs the user id out of a refresh cookie
/// even when the token is already past its window.
pub fn decode_jwt_allow_expired(token: &str, keys: &JwtKeys) -> Result<TokenData<Claims>, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    decode::<Claims>(token, keys.decoding_key(), &validation)
}
