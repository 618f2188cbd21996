use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::info;
use uuid::Uuid;

use hearth_db::Database;
use hearth_relay::Relay;
use hearth_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub auth: AuthConfig,
    pub relay: Relay,
}

/// Token signing settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// `None` issues tokens without an `exp` claim.
    pub token_ttl: Option<chrono::Duration>,
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    // Hashing and the insert both block
    let db = state.db.clone();
    let username = req.username.clone();
    tokio::task::spawn_blocking(move || register_user(&db, &req)).await??;

    info!("Registered {}", username);
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "registration complete".into(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload?;
    let st = state.clone();
    let response =
        tokio::task::spawn_blocking(move || authenticate(&st.db, &st.auth, &req.email, &req.password))
            .await??;
    Ok(Json(response))
}

/// Create an account. Every field is required; the password is stored as
/// a salted Argon2id hash.
pub fn register_user(db: &Database, req: &RegisterRequest) -> Result<(), ApiError> {
    let fields = [
        ("username", &req.username),
        ("email", &req.email),
        ("password", &req.password),
        ("familyCode", &req.family_code),
    ];
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(ApiError::Validation(format!("{} is required", name)));
        }
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = Uuid::new_v4();

    db.create_user(
        &user_id.to_string(),
        &req.username,
        &req.email,
        &password_hash,
        &req.family_code,
    )?;
    Ok(())
}

/// Check an email/password pair and issue a token for the account.
pub fn authenticate(
    db: &Database,
    config: &AuthConfig,
    email: &str,
    password: &str,
) -> Result<LoginResponse, ApiError> {
    let user = db.get_user_by_email(email)?.ok_or(ApiError::NotFound)?;

    verify_password(password, &user.password)?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("corrupt user id '{}': {}", user.id, e))?;

    let token = issue_token(config, user_id, &user.username, &user.family_code)?;

    Ok(LoginResponse {
        token,
        username: user.username,
        family_code: user.family_code,
    })
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), ApiError> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow::anyhow!("corrupt password hash: {}", e))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::InvalidCredential)
}

pub fn issue_token(
    config: &AuthConfig,
    user_id: Uuid,
    username: &str,
    family_code: &str,
) -> Result<String, ApiError> {
    let now = chrono::Utc::now();
    let claims = Claims {
        user_id,
        username: username.to_string(),
        family_code: family_code.to_string(),
        iat: now.timestamp() as usize,
        exp: config.token_ttl.map(|ttl| (now + ttl).timestamp() as usize),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("token signing failed: {}", e))?;

    Ok(token)
}

/// Check a token's signature (and `exp`, when present) and return its claims.
pub fn verify_token(config: &AuthConfig, token: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| ApiError::InvalidToken)?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".into(),
            token_ttl: None,
        }
    }

    fn kim() -> RegisterRequest {
        RegisterRequest {
            username: "kim".into(),
            email: "kim@x.com".into(),
            password: "pw1".into(),
            family_code: "F1".into(),
        }
    }

    #[test]
    fn password_is_stored_hashed() {
        let db = Database::open_in_memory().unwrap();
        register_user(&db, &kim()).unwrap();

        let user = db.get_user_by_email("kim@x.com").unwrap().unwrap();
        assert_ne!(user.password, "pw1");
        assert!(user.password.starts_with("$argon2id$"));
    }

    #[test]
    fn second_registration_with_same_email_fails() {
        let db = Database::open_in_memory().unwrap();
        register_user(&db, &kim()).unwrap();

        let mut again = kim();
        again.username = "kim2".into();
        let err = register_user(&db, &again).unwrap_err();
        assert!(matches!(err, ApiError::DuplicateKey("email")));
    }

    #[test]
    fn second_registration_with_same_username_fails() {
        let db = Database::open_in_memory().unwrap();
        register_user(&db, &kim()).unwrap();

        let mut again = kim();
        again.email = "other@x.com".into();
        let err = register_user(&db, &again).unwrap_err();
        assert!(matches!(err, ApiError::DuplicateKey("username")));
    }

    #[test]
    fn blank_fields_are_rejected() {
        let db = Database::open_in_memory().unwrap();
        let mut req = kim();
        req.family_code = "  ".into();

        let err = register_user(&db, &req).unwrap_err();
        assert!(matches!(err, ApiError::Validation(ref m) if m.contains("familyCode")));
        assert!(db.get_user_by_email("kim@x.com").unwrap().is_none());
    }

    #[test]
    fn login_checks_email_and_password() {
        let db = Database::open_in_memory().unwrap();
        register_user(&db, &kim()).unwrap();

        let err = authenticate(&db, &config(), "nobody@x.com", "pw1").unwrap_err();
        assert!(matches!(err, ApiError::NotFound));

        let err = authenticate(&db, &config(), "kim@x.com", "wrong").unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredential));

        let ok = authenticate(&db, &config(), "kim@x.com", "pw1").unwrap();
        assert_eq!(ok.username, "kim");
        assert_eq!(ok.family_code, "F1");
    }

    #[test]
    fn login_token_decodes_to_the_user() {
        let db = Database::open_in_memory().unwrap();
        register_user(&db, &kim()).unwrap();
        let stored_id: Uuid = db
            .get_user_by_email("kim@x.com")
            .unwrap()
            .unwrap()
            .id
            .parse()
            .unwrap();

        let ok = authenticate(&db, &config(), "kim@x.com", "pw1").unwrap();
        let claims = verify_token(&config(), &ok.token).unwrap();
        assert_eq!(claims.user_id, stored_id);
        assert_eq!(claims.username, "kim");
        assert_eq!(claims.family_code, "F1");
        assert_eq!(claims.exp, None);
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let token = issue_token(&config(), Uuid::new_v4(), "kim", "F1").unwrap();
        let other = AuthConfig {
            jwt_secret: "other-secret".into(),
            token_ttl: None,
        };
        assert!(matches!(verify_token(&other, &token), Err(ApiError::InvalidToken)));
        assert!(matches!(verify_token(&config(), "not.a.token"), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn configured_ttl_is_enforced() {
        let live = AuthConfig {
            token_ttl: Some(chrono::Duration::hours(1)),
            ..config()
        };
        let token = issue_token(&live, Uuid::new_v4(), "kim", "F1").unwrap();
        let claims = verify_token(&live, &token).unwrap();
        assert!(claims.exp.is_some());

        let expired = AuthConfig {
            token_ttl: Some(chrono::Duration::hours(-1)),
            ..config()
        };
        let token = issue_token(&expired, Uuid::new_v4(), "kim", "F1").unwrap();
        assert!(matches!(verify_token(&config(), &token), Err(ApiError::InvalidToken)));
    }
}
