//! Best-effort bearer token decoding.
//!
//! Nothing here rejects a request. Every failure path ends in "no identity", and the
//! handlers fall back to global visibility.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<Value>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// The subject, only when it is a string
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_ref().and_then(Value::as_str)
    }
}

#[derive(Clone)]
enum DecodeMode {
    Verified { key: DecodingKey, validation: Validation },
    Unverified { validation: Validation },
}

/// Turns an `Authorization` header into an optional user id
#[derive(Clone)]
pub struct ClaimsDecoder {
    mode: DecodeMode,
}

impl ClaimsDecoder {
    /// With a secret, HMAC signatures are checked. Without one, claims are read unverified.
    pub fn new(secret: Option<&str>) -> Self {
        let mode = match secret.filter(|s| !s.is_empty()) {
            Some(secret) => {
                let mut validation = Validation::new(Algorithm::HS256);
                validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
                validation.required_spec_claims.clear();
                validation.validate_aud = false;
                DecodeMode::Verified {
                    key: DecodingKey::from_secret(secret.as_bytes()),
                    validation,
                }
            }
            None => {
                let mut validation = Validation::default();
                validation.insecure_disable_signature_validation();
                validation.required_spec_claims.clear();
                validation.validate_exp = false;
                validation.validate_aud = false;
                DecodeMode::Unverified { validation }
            }
        };
        Self { mode }
    }

    pub fn is_verifying(&self) -> bool {
        matches!(self.mode, DecodeMode::Verified { .. })
    }

    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = match &self.mode {
            DecodeMode::Verified { key, validation } => decode::<Claims>(token, key, validation)?,
            DecodeMode::Unverified { validation } => {
                decode::<Claims>(token, &DecodingKey::from_secret(&[]), validation)?
            }
        };
        Ok(data.claims)
    }

    /// Caller identity for a raw `Authorization` header value, if one can be read
    pub fn identify(&self, authorization: Option<&str>) -> Option<String> {
        let token = bearer_token(authorization?)?;

        let claims = match &self.mode {
            DecodeMode::Verified { .. } => match self.decode(token) {
                Ok(claims) => claims,
                Err(e) => {
                    tracing::warn!("Failed to verify token: {}", e);
                    return None;
                }
            },
            DecodeMode::Unverified { .. } => {
                tracing::warn!("SUPABASE_JWT_SECRET not set, skipping signature verification");
                match self.decode(token) {
                    Ok(claims) => claims,
                    Err(e) => {
                        tracing::warn!("Failed to parse token: {}", e);
                        return None;
                    }
                }
            }
        };

        claims.subject().map(str::to_string)
    }
}

/// Token from a header of exactly the form `Bearer <token>`
pub fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Some(token),
        _ => None,
    }
}
