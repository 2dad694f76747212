//! Borrower identity as handed over by the authentication service

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for an authenticated borrower. Tokens are issued by the
/// authentication service; this server only verifies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowerClaims {
    /// Borrower id
    pub sub: Uuid,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl BorrowerClaims {
    pub fn new(borrower_id: Uuid, name: Option<String>, ttl: chrono::Duration) -> Self {
        let now = chrono::Utc::now();
        Self {
            sub: borrower_id,
            name,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn borrower_id(&self) -> Uuid {
        self.sub
    }
}
