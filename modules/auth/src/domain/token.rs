//! HS256 JWT issuing and verification.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::contract::model::Principal;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a token issued at `now`; returns it with its expiry.
    pub fn issue(
        &self,
        user_id: Uuid,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), DomainError> {
        let ttl = chrono::Duration::from_std(self.ttl)
            .map_err(|e| DomainError::internal(format!("token ttl out of range: {e}")))?;
        let exp = now + ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::internal(format!("failed to sign token: {e}")))?;
        Ok((token, exp))
    }

    pub fn verify(&self, token: &str) -> Result<Principal, DomainError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            let reason = match e.kind() {
                ErrorKind::ExpiredSignature => "token expired",
                ErrorKind::InvalidSignature => "bad signature",
                _ => "malformed token",
            };
            DomainError::invalid_token(reason)
        })?;
        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| DomainError::invalid_token("malformed subject"))?;
        Ok(Principal {
            user_id,
            name: data.claims.name,
        })
    }
}
