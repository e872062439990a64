use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    db::{errors::DbError, handlers::ApiKeys},
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use sqlx::SqlitePool;
use tracing::{debug, instrument, trace};

/// Extract user from JWT session cookie if present and valid
/// Returns:
/// - None: No session cookie present
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): Cookie header present but malformed
#[instrument(skip(parts, config))]
fn try_jwt_session_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let cookie_header = parts.headers.get(axum::http::header::COOKIE)?;

    let cookie_str = match cookie_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid cookie header: {e}"),
            }));
        }
    };
    let cookie_name = &config.auth.session.cookie_name;

    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some((name, value)) = cookie.split_once('=') {
            if name == cookie_name {
                match session::verify_session_token(value, config) {
                    Ok(user) => return Some(Ok(user)),
                    Err(_) => {
                        // Invalid/expired token; expected for stale cookies, keep looking
                        continue;
                    }
                }
            }
        }
    }
    None
}

/// Extract user from API key in Authorization header if present and valid
/// Returns:
/// - None: No Authorization header or not a Bearer token
/// - Some(Ok(user)): Valid API key found and user authenticated
/// - Some(Err(error)): Bearer token present but invalid
#[instrument(skip(parts, db))]
async fn try_api_key_auth(parts: &Parts, db: &SqlitePool) -> Option<Result<CurrentUser>> {
    let auth_header = parts.headers.get(axum::http::header::AUTHORIZATION)?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }));
        }
    };

    // Check for Bearer token format
    let api_key = match auth_str.strip_prefix("Bearer ") {
        Some(key) => key,
        None => return None, // Not a Bearer token, try other auth methods
    };

    let mut conn = match db.acquire().await {
        Ok(conn) => conn,
        Err(e) => return Some(Err(DbError::from(e).into())),
    };
    let mut keys_repo = ApiKeys::new(&mut conn);

    match keys_repo.find_user_by_secret(api_key).await {
        Ok(Some(user)) => Some(Ok(CurrentUser::from(user))),
        Ok(None) => Some(Err(Error::Unauthenticated {
            message: Some("Invalid API key".to_string()),
        })),
        Err(e) => Some(Err(Error::Database(e))),
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        // Each method returns Option<Result<CurrentUser>>:
        // - None means the auth method is not applicable (no credentials present)
        // - Some(Ok(user)) means successful authentication
        // - Some(Err(error)) means auth credentials were present but invalid
        //
        // Strategy: try all methods and return the first successful one; only
        // fail once every method was absent or failed.

        let mut any_auth_attempted = false;

        // Try API key authentication first (most specific)
        match try_api_key_auth(parts, &state.db).await {
            Some(Ok(user)) => {
                debug!("Found API key authenticated user: {}", user.id);
                return Ok(user);
            }
            Some(Err(e)) => {
                trace!("API key authentication failed: {:?}", e);
                any_auth_attempted = true;
            }
            None => {
                trace!("No API key authentication attempted");
            }
        }

        // Fall back to JWT session cookies
        match try_jwt_session_auth(parts, &state.config) {
            Some(Ok(user)) => {
                debug!("Found JWT session authenticated user: {}", user.id);
                return Ok(user);
            }
            Some(Err(e)) => {
                trace!("JWT session authentication failed: {:?}", e);
                any_auth_attempted = true;
            }
            None => {
                trace!("No JWT session authentication attempted");
            }
        }

        if !any_auth_attempted {
            trace!("No authentication credentials found in request");
        }
        Err(Error::Unauthenticated { message: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{create_test_implementer, create_test_pool, create_test_state, create_test_user};
    use axum::extract::FromRequestParts as _;

    fn parts_with_header(header_name: &str, header_value: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(header_name, header_value)
            .body(())
            .unwrap();

        let (parts, _body) = request.into_parts();
        parts
    }

    #[tokio::test]
    async fn test_api_key_extraction() {
        let pool = create_test_pool().await;
        let implementer = create_test_implementer(&pool, "acme-education").await;
        let (user, secret) = create_test_user(&pool, implementer.id, Role::FieldCoordinator, false).await;
        let state = create_test_state(pool);

        let mut parts = parts_with_header("authorization", &format!("Bearer {secret}"));
        let current_user = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();

        assert_eq!(current_user.id, user.id);
        assert_eq!(current_user.implementer_id, implementer.id);
        assert_eq!(current_user.role, Role::FieldCoordinator);
    }

    #[tokio::test]
    async fn test_invalid_api_key_rejected() {
        let pool = create_test_pool().await;
        let state = create_test_state(pool);

        let mut parts = parts_with_header("authorization", "Bearer fctl_not_a_real_key");
        let result = CurrentUser::from_request_parts(&mut parts, &state).await;

        let error = result.unwrap_err();
        assert_eq!(error.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_cookie_extraction() {
        let pool = create_test_pool().await;
        let implementer = create_test_implementer(&pool, "acme-education").await;
        let (user, _secret) = create_test_user(&pool, implementer.id, Role::Viewer, false).await;
        let state = create_test_state(pool);

        let token = session::create_session_token(&CurrentUser::from(user.clone()), &state.config).unwrap();
        let cookie = format!("{}={token}", state.config.auth.session.cookie_name);

        let mut parts = parts_with_header("cookie", &cookie);
        let current_user = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(current_user.id, user.id);
    }

    #[tokio::test]
    async fn test_no_credentials_returns_unauthorized() {
        let pool = create_test_pool().await;
        let state = create_test_state(pool);

        let request = axum::http::Request::builder().uri("http://localhost/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let result = CurrentUser::from_request_parts(&mut parts, &state).await;
        let error = result.unwrap_err();
        assert_eq!(error.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
