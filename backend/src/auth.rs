//! Token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying a single `user` claim. They carry no expiry,
//! so a token stays valid for as long as the signing secret does.

use std::collections::HashSet;
use std::fmt;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Secret used when none is configured.
pub const DEFAULT_JWT_SECRET: &str = "UNSECURE_SECRET_TOKEN";

/// Primary header carrying the bearer token.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Legacy header checked when `Authorization` holds no bearer token.
pub const AUTHENTICATION_HEADER: &str = "Authentication";

const BEARER_SCHEME: &str = "Bearer";

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub user: String,
}

/// Authentication failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable `Bearer <token>` header.
    #[error("bad authentication header format")]
    BadHeader,

    /// The token did not verify against the signing secret.
    #[error("bad authentication header format")]
    BadToken(#[source] jsonwebtoken::errors::Error),

    /// The token verified but names no user.
    #[error("invalid auth token")]
    EmptyUser,

    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Signs and verifies user tokens with a symmetric secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();

        let mut validation = Validation::new(Algorithm::HS256);
        // Any HMAC variant signed with our secret is accepted, nothing else.
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `user`.
    pub fn issue(&self, user: &str) -> Result<String, AuthError> {
        let claims = Claims {
            user: user.to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::Signing)
    }

    /// Verify a token and return the user it was issued for.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(AuthError::BadToken)?;

        if data.claims.user.is_empty() {
            return Err(AuthError::EmptyUser);
        }
        Ok(data.claims.user)
    }

    /// Verify the bearer token found in the request headers.
    ///
    /// `authorization` and `authentication` are the raw values of the
    /// corresponding headers, if present.
    pub fn verify_headers(
        &self,
        authorization: Option<&str>,
        authentication: Option<&str>,
    ) -> Result<String, AuthError> {
        let token = bearer_token(authorization, authentication)?;
        self.verify(token)
    }
}

impl Default for TokenSigner {
    fn default() -> Self {
        Self::new(DEFAULT_JWT_SECRET)
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

/// Extract the token from a `Bearer <token>` header value, falling back to the
/// legacy header.
pub fn bearer_token<'a>(
    authorization: Option<&'a str>,
    authentication: Option<&'a str>,
) -> Result<&'a str, AuthError> {
    authorization
        .and_then(split_bearer)
        .or_else(|| authentication.and_then(split_bearer))
        .ok_or(AuthError::BadHeader)
}

fn split_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    if scheme != BEARER_SCHEME {
        return None;
    }
    Some(token)
}
