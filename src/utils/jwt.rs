use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey,
                   Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "Username")]
    pub username: String,
    pub exp:      i64,
}

pub fn sign(username: &str, secret: &str, ttl: Duration) -> jsonwebtoken::errors::Result<String> {
    let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    let c = Claims { username: username.into(), exp: Utc::now().timestamp().saturating_add(ttl) };
    encode(&Header::default(), &c, &EncodingKey::from_secret(secret.as_bytes()))
}

/// Username carried by a valid, unexpired token.
pub fn verify(token: &str, secret: &str) -> Option<String> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()),
                     &Validation::new(Algorithm::HS256))
        .map(|d| d.claims.username).ok()
}
