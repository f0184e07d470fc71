//! HS256 token encoding and decoding.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::domain::{AuthUser, Claims, TokenType};
use super::errors::AuthError;

/// Sign a token of `token_type` for `user`, valid for `ttl` from `now`.
pub fn issue(user: &AuthUser, token_type: TokenType, ttl: Duration, secret: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        token_type,
        jti: Uuid::new_v4().simple().to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Verify signature and expiry; any failure is `InvalidToken`.
pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
}

/// `exp` as a UTC timestamp.
pub fn expires_at(claims: &Claims) -> DateTime<Utc> {
    Utc.timestamp_opt(claims.exp, 0).single().unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser { id: 7, email: "admin@example.com".into(), name: "Admin".into(), is_active: true, is_staff: true }
    }

    #[test]
    fn issue_then_decode() {
        let token = issue(&user(), TokenType::Access, Duration::minutes(60), "secret", Utc::now()).unwrap();
        let claims = decode_claims(&token, "secret").unwrap();
        assert_eq!(claims.user_id(), Some(7));
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.jti.len(), 32);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue(&user(), TokenType::Refresh, Duration::days(7), "secret", Utc::now()).unwrap();
        assert!(matches!(decode_claims(&token, "other"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued = Utc::now() - Duration::hours(2);
        let token = issue(&user(), TokenType::Access, Duration::minutes(60), "secret", issued).unwrap();
        assert!(matches!(decode_claims(&token, "secret"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_claims("not.a.jwt", "secret").is_err());
    }
}
