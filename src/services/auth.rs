//! Authentication service: password hashing, JWT issuance, login and user management.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::user::{CreateUser, User, UserRole};

const ACCESS: &str = "access";
const REFRESH: &str = "refresh";

/// JWT claims embedded in access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User email.
    pub sub: String,
    pub user_id: String,
    pub role: UserRole,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token pair returned on successful login or refresh.
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Hash a plaintext password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn encode_claims(
    user: &User,
    token_type: &str,
    expiry_secs: i64,
    key: &EncodingKey,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.email.clone(),
        user_id: user.id.to_string(),
        role: user.role,
        token_type: token_type.to_string(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };
    jsonwebtoken::encode(&Header::default(), &claims, key)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))
}

/// Generate a JWT token pair (access + refresh).
pub fn generate_tokens(
    user: &User,
    jwt_secret: &str,
    access_expiry_secs: i64,
    refresh_expiry_secs: i64,
) -> Result<TokenPair, AppError> {
    let key = EncodingKey::from_secret(jwt_secret.as_bytes());

    Ok(TokenPair {
        access_token: encode_claims(user, ACCESS, access_expiry_secs, &key)?,
        refresh_token: encode_claims(user, REFRESH, refresh_expiry_secs, &key)?,
        token_type: "Bearer".to_string(),
        expires_in: access_expiry_secs,
    })
}

/// Validate a JWT and return the claims.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());

    jsonwebtoken::decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
}

/// Validate an access token specifically; refresh tokens are rejected.
pub fn validate_access_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let claims = validate_token(token, jwt_secret)?;
    if claims.token_type != ACCESS {
        return Err(AppError::Unauthorized);
    }
    Ok(claims)
}

/// Create a new user with hashed password.
pub async fn create_user(pool: &PgPool, input: &CreateUser) -> Result<User, AppError> {
    input.validate()?;
    let password_hash = hash_password(&input.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash, name, role)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(input.email.trim().to_lowercase())
    .bind(&password_hash)
    .bind(input.name.trim())
    .bind(input.role)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::from_unique_violation(e, "Email already registered"))?;

    tracing::info!(id = %user.id, role = ?user.role, "User created");
    Ok(user)
}

/// Authenticate by email and password, returning a token pair.
///
/// Unknown emails, inactive accounts and wrong passwords are indistinguishable
/// to the caller.
pub async fn login(
    pool: &PgPool,
    email: &str,
    password: &str,
    jwt_secret: &str,
    access_expiry_secs: i64,
    refresh_expiry_secs: i64,
) -> Result<TokenPair, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email.trim().to_lowercase())
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !user.is_active || !verify_password(password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Rejected login attempt");
        return Err(AppError::Unauthorized);
    }

    sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
        .bind(user.id)
        .execute(pool)
        .await?;

    tracing::info!(user_id = %user.id, "User logged in");
    generate_tokens(&user, jwt_secret, access_expiry_secs, refresh_expiry_secs)
}

/// Exchange a valid refresh token for a fresh token pair.
pub async fn refresh_token(
    pool: &PgPool,
    refresh_token_str: &str,
    jwt_secret: &str,
    access_expiry_secs: i64,
    refresh_expiry_secs: i64,
) -> Result<TokenPair, AppError> {
    let claims = validate_token(refresh_token_str, jwt_secret)?;

    if claims.token_type != REFRESH {
        return Err(AppError::Unauthorized);
    }

    let user_id: Uuid = claims
        .user_id
        .parse()
        .map_err(|_| AppError::Unauthorized)?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_active = true")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::Unauthorized)?;

    generate_tokens(&user, jwt_secret, access_expiry_secs, refresh_expiry_secs)
}

/// Find a user by ID.
pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            email: "viewer@itdashboard.local".to_string(),
            password_hash: "hash".to_string(),
            name: "Viewer".to_string(),
            role,
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_and_verify() {
        let password = "SecurePassword123!";
        let hash = hash_password(password).unwrap();
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("WrongPassword", &hash).unwrap());
    }

    #[test]
    fn token_generation_and_validation() {
        let user = user(UserRole::Viewer);
        let secret = "test-secret-key-for-jwt";
        let tokens = generate_tokens(&user, secret, 900, 604800).unwrap();
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.expires_in, 900);

        let claims = validate_access_token(&tokens.access_token, secret).unwrap();
        assert_eq!(claims.sub, "viewer@itdashboard.local");
        assert_eq!(claims.user_id, user.id.to_string());
        assert_eq!(claims.role, UserRole::Viewer);

        let refresh_claims = validate_token(&tokens.refresh_token, secret).unwrap();
        assert_eq!(refresh_claims.token_type, "refresh");
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let secret = "test-secret";
        let tokens = generate_tokens(&user(UserRole::Admin), secret, 900, 3600).unwrap();
        let result = validate_access_token(&tokens.refresh_token, secret);
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn token_signed_with_other_secret_rejected() {
        let tokens = generate_tokens(&user(UserRole::Admin), "secret-a", 900, 3600).unwrap();
        assert!(validate_token(&tokens.access_token, "secret-b").is_err());
    }

    #[test]
    fn invalid_token_rejected() {
        assert!(validate_token("garbage.token.here", "secret").is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let secret = "test-secret";
        // Well past the default 60s leeway.
        let tokens = generate_tokens(&user(UserRole::Viewer), secret, -3600, -3600).unwrap();
        assert!(validate_token(&tokens.access_token, secret).is_err());
    }
}
