use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// Caller role as asserted by the authentication gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

/// Verified caller identity.
///
/// Token validation happens upstream; the gateway forwards the verified
/// subject id and role as `x-user-id` / `x-user-role` headers, which is the
/// only identity contract this service consumes.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: i64,
    pub role: Role,
}

/// Extractor for the gateway-supplied identity headers.
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<i64>().ok())
            .ok_or_else(|| AppError::unauthorized("Access denied. No verified identity."))?;

        let role = match parts
            .headers
            .get("x-user-role")
            .and_then(|value| value.to_str().ok())
        {
            Some(role) if role.eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::User,
        };

        Ok(AuthUser(Identity { user_id, role }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> Result<AuthUser, AppError> {
        let (mut parts, _) = request.into_parts();
        AuthUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_parses_identity_headers() {
        let request = Request::builder()
            .header("x-user-id", "42")
            .header("x-user-role", "Admin")
            .body(())
            .unwrap();

        let AuthUser(identity) = extract(request).await.unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_unknown_role_defaults_to_user() {
        let request = Request::builder()
            .header("x-user-id", "7")
            .body(())
            .unwrap();

        let AuthUser(identity) = extract(request).await.unwrap();
        assert_eq!(identity.role, Role::User);
    }

    #[tokio::test]
    async fn test_missing_identity_is_rejected() {
        let request = Request::builder().body(()).unwrap();
        assert!(extract(request).await.is_err());
    }
}
