//! Bearer-header authentication: scheme parse, token verify, subject check.

use std::sync::Arc;

use crate::{AuthError, Principal, TokenVerifier, UserDirectory};

/// Extract the token from an `Authorization` header value.
///
/// The scheme match is case-sensitive and exact: anything but `Bearer `
/// (including `bearer`, `Basic`, or a bare token) is a scheme error, as is
/// an empty token after the scheme.
pub fn parse_bearer(header: &str) -> Result<&str, AuthError> {
    let token = header.strip_prefix("Bearer ").ok_or(AuthError::Scheme)?;

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::Scheme);
    }

    Ok(token)
}

/// Composes token verification with subject-existence resolution.
///
/// A structurally valid token is only a claim; the subject must still exist
/// in the user store, so tokens for since-deleted users are rejected with
/// `PrincipalNotFound`.
///
/// The role is trusted from the claim and not re-read from the live user
/// record: a role change takes effect only when the user logs in again.
/// This staleness window is intentional.
pub struct Authenticator {
    verifier: Arc<dyn TokenVerifier>,
    users: Arc<dyn UserDirectory>,
}

impl Authenticator {
    pub fn new(verifier: Arc<dyn TokenVerifier>, users: Arc<dyn UserDirectory>) -> Self {
        Self { verifier, users }
    }

    /// Authenticate a raw `Authorization` header value into a principal.
    pub async fn authenticate(&self, header: &str) -> Result<Principal, AuthError> {
        let token = parse_bearer(header)?;
        let claims = self.verifier.verify(token)?;

        if !self.users.user_exists(claims.sub).await? {
            return Err(AuthError::PrincipalNotFound);
        }

        Ok(Principal::new(claims.sub, claims.role))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use taskboard_core::UserId;

    use super::*;
    use crate::{DirectoryError, Hs256TokenVerifier, Role};

    struct StubUsers {
        known: Vec<UserId>,
    }

    #[async_trait]
    impl UserDirectory for StubUsers {
        async fn user_exists(&self, id: UserId) -> Result<bool, DirectoryError> {
            Ok(self.known.contains(&id))
        }
    }

    fn authenticator(known: Vec<UserId>) -> (Authenticator, Arc<Hs256TokenVerifier>) {
        let verifier = Arc::new(Hs256TokenVerifier::new(b"test-secret"));
        let auth = Authenticator::new(verifier.clone(), Arc::new(StubUsers { known }));
        (auth, verifier)
    }

    #[test]
    fn rejects_non_bearer_schemes() {
        assert!(matches!(parse_bearer("Basic abc"), Err(AuthError::Scheme)));
        assert!(matches!(parse_bearer("bearer abc"), Err(AuthError::Scheme)));
        assert!(matches!(parse_bearer("abc"), Err(AuthError::Scheme)));
        assert!(matches!(parse_bearer("Bearer "), Err(AuthError::Scheme)));
    }

    #[test]
    fn accepts_bearer_scheme() {
        assert_eq!(parse_bearer("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
    }

    #[tokio::test]
    async fn authenticates_existing_user() {
        let user_id = UserId::new();
        let (auth, verifier) = authenticator(vec![user_id]);
        let token = verifier
            .issue(user_id, Role::Leader, Utc::now(), Duration::minutes(30))
            .unwrap();

        let principal = auth.authenticate(&format!("Bearer {token}")).await.unwrap();

        assert_eq!(principal.id, user_id);
        assert_eq!(principal.role, Role::Leader);
    }

    #[tokio::test]
    async fn rejects_token_for_deleted_user() {
        let user_id = UserId::new();
        let (auth, verifier) = authenticator(vec![]);
        let token = verifier
            .issue(user_id, Role::Admin, Utc::now(), Duration::minutes(30))
            .unwrap();

        let err = auth.authenticate(&format!("Bearer {token}")).await.unwrap_err();
        assert!(matches!(err, AuthError::PrincipalNotFound));
    }

    #[tokio::test]
    async fn rejects_expired_token_before_user_lookup() {
        let user_id = UserId::new();
        let (auth, verifier) = authenticator(vec![user_id]);
        let token = verifier
            .issue(user_id, Role::User, Utc::now() - Duration::hours(2), Duration::minutes(30))
            .unwrap();

        let err = auth.authenticate(&format!("Bearer {token}")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
