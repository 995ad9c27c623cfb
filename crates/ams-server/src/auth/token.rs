//! Bearer-credential verification (HS256 JWT)
//!
//! Only verification lives here; token issuance belongs to the identity
//! service. Verification failures are reported as `None`; the caller
//! decides whether anonymous access is acceptable.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the username.
    pub sub: String,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Decode and verify a bearer token. Malformed or expired tokens yield
/// `None`, never an error.
pub fn decode_bearer(token: &str, secret: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["sub", "exp"]);

    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .ok()
}
