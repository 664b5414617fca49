use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use quill_types::api::Claims;

use crate::error::ApiError;

/// Token issuance and verification, built from explicit configuration rather
/// than ambient globals. Validity is purely signature + expiry; there is no
/// revocation list, so logout is client-side token discard.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl_minutes: i64,
}

impl TokenService {
    pub fn new(secret: &str, algorithm: Algorithm, ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            ttl_minutes,
        }
    }

    pub fn issue(&self, user_id: i64) -> Result<String, ApiError> {
        let claims = Claims {
            user_id,
            exp: (Utc::now() + Duration::minutes(self.ttl_minutes)).timestamp() as usize,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(ApiError::internal)
    }

    /// Invalid signature, expiry, and missing claims all collapse into the
    /// same 401 — callers learn nothing about why a token was rejected.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::new(self.algorithm))
            .map(|data| data.claims)
            .map_err(|_| ApiError::Auth)
    }
}
