use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use taskboard_core::UserId;

use crate::{AuthError, Role};

/// Verified token claims.
///
/// This is **not** a trusted principal yet: the subject must still be
/// confirmed to exist through the principal resolver (`Authenticator`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    /// Role granted at token issue time.
    pub role: Role,

    /// Issued-at (unix seconds).
    pub iat: i64,

    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Token verification seam.
///
/// Pure over (token, process-wide secret, clock); no IO.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

/// HS256 token verifier/issuer over a process-wide secret.
///
/// The secret and algorithm are configuration, set once at process start.
pub struct Hs256TokenVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // No clock slack: an expired token is invalid immediately.
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a signed token for a user, valid for `ttl` from `now`.
    pub fn issue(
        &self,
        user_id: UserId,
        role: Role,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let claims = TokenClaims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|_| AuthError::InvalidToken)
    }
}

impl TokenVerifier for Hs256TokenVerifier {
    /// Decode and validate signature + expiry.
    ///
    /// Every failure mode (garbage, wrong signature, expired) collapses to
    /// `AuthError::InvalidToken`; callers never learn which check failed.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> Hs256TokenVerifier {
        Hs256TokenVerifier::new(b"test-secret")
    }

    #[test]
    fn round_trips_valid_token() {
        let v = verifier();
        let user_id = UserId::new();

        let token = v
            .issue(user_id, Role::Leader, Utc::now(), Duration::minutes(30))
            .unwrap();
        let claims = v.verify(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Leader);
    }

    #[test]
    fn expired_token_is_invalid() {
        let v = verifier();
        let issued = Utc::now() - Duration::hours(2);

        let token = v
            .issue(UserId::new(), Role::User, issued, Duration::minutes(30))
            .unwrap();

        assert!(matches!(v.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = verifier()
            .issue(UserId::new(), Role::Admin, Utc::now(), Duration::minutes(30))
            .unwrap();

        let other = Hs256TokenVerifier::new(b"different-secret");
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert!(matches!(
            verifier().verify("not.a.jwt"),
            Err(AuthError::InvalidToken)
        ));
    }
}
