use crate::errors::AppError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn new_session_token() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn new_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Opaque token granting public access to one habit's embed view.
pub fn new_embed_token() -> String {
    format!("hab_{}", Uuid::new_v4().simple())
}

pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// The authenticated caller, resolved from the bearer session token.
/// Handlers taking this extractor cannot run without a valid session,
/// which is the pre-validated ownership context the core relies on.
pub struct CurrentUser {
    pub id: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(AppError::unauthorized)?;

        let data = state.data.lock().await;
        let user = data
            .user_for_token(token)
            .ok_or_else(AppError::unauthorized)?;
        Ok(Self {
            id: user.id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_depends_on_salt() {
        let a = hash_password("hunter22", "salt-a");
        let b = hash_password("hunter22", "salt-b");
        assert_ne!(a, b);
        assert_eq!(a, hash_password("hunter22", "salt-a"));
    }

    #[test]
    fn embed_tokens_are_prefixed_and_unique() {
        let token = new_embed_token();
        assert!(token.starts_with("hab_"));
        assert_eq!(token.len(), 4 + 32);
        assert_ne!(token, new_embed_token());
    }
}
