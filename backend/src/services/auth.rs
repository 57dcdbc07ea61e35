//! Authentication service: password login and session tokens

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use shared::{Credentials, Role};
use sqlx::PgPool;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn role(&self) -> Option<Role> {
        Role::from_str(&self.role)
    }
}

/// Body returned by `POST /auth/login`
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    pub username: String,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    role: String,
}

/// Sign a token for a user
pub fn issue_token(
    secret: &str,
    expiry_secs: i64,
    user_id: i64,
    username: &str,
    role: Role,
) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role: role.as_str().to_string(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Check a token's signature and expiry and return its claims
pub fn verify_token(secret: &str, token: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    token_expiry: i64,
}

impl AuthService {
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            token_expiry: config.jwt.token_expiry,
        }
    }

    /// Authenticate a user with username and password
    pub async fn login(&self, credentials: Credentials) -> AppResult<LoginResponse> {
        let user = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, role FROM users WHERE username = $1",
        )
        .bind(&credentials.username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(&credentials.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            tracing::debug!(username = %user.username, "Rejected login");
            return Err(AppError::InvalidCredentials);
        }

        let role = Role::from_str(&user.role)
            .ok_or_else(|| AppError::StorageFailure(format!("unknown role {:?}", user.role)))?;
        let token = issue_token(
            &self.jwt_secret,
            self.token_expiry,
            user.id,
            &user.username,
            role,
        )?;

        tracing::info!(user_id = user.id, role = %role, "User logged in");
        Ok(LoginResponse {
            token,
            role,
            username: user.username,
        })
    }

    /// Create the admin account on first start; an existing user is left untouched
    pub async fn ensure_admin(&self, username: &str, password: &str) -> AppResult<bool> {
        let password_hash = hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .bind(Role::Admin.as_str())
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-long-enough";

    #[test]
    fn test_token_roundtrip_keeps_identity() {
        let token = issue_token(SECRET, 3600, 7, "admin", Role::Admin).unwrap();
        let claims = verify_token(SECRET, &token).unwrap();

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.role(), Some(Role::Admin));
    }

    #[test]
    fn test_expired_token() {
        // Beyond the default 60s leeway
        let token = issue_token(SECRET, -3600, 7, "admin", Role::Admin).unwrap();
        assert!(matches!(
            verify_token(SECRET, &token),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let token = issue_token(SECRET, 3600, 7, "admin", Role::Admin).unwrap();
        assert!(matches!(
            verify_token("another-secret", &token),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            verify_token(SECRET, "not-a-token"),
            Err(AppError::InvalidToken)
        ));
    }
}
