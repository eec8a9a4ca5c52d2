//! Authentication service for login and token management
//!
//! Issues JWT access tokens carrying the employee id, code and role name.
//! Permissions are deliberately not embedded in the token: the
//! authorization resolver re-reads them from the store on every request.

use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Input for logging in
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub employee_code: String,
    pub password: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Employee ID
    pub employee_code: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Employee credentials row
#[derive(Debug, sqlx::FromRow)]
struct EmployeeAuthRow {
    id: Uuid,
    employee_code: String,
    password_hash: String,
    role_name: String,
    is_active: bool,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Authenticate an employee with code and password
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthTokens> {
        let employee = sqlx::query_as::<_, EmployeeAuthRow>(
            r#"
            SELECT e.id, e.employee_code, e.password_hash, r.name AS role_name, e.is_active
            FROM employees e
            JOIN roles r ON r.id = e.role_id
            WHERE e.employee_code = $1
            "#,
        )
        .bind(&input.employee_code)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !employee.is_active {
            return Err(AppError::Unauthorized(
                "Account is disabled".to_string(),
            ));
        }

        let valid = verify(&input.password, &employee.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        // Update last login
        sqlx::query("UPDATE employees SET last_login_at = NOW() WHERE id = $1")
            .bind(employee.id)
            .execute(&self.db)
            .await?;

        let tokens =
            self.generate_tokens(employee.id, &employee.employee_code, &employee.role_name)?;

        self.store_refresh_token(employee.id, &tokens.refresh_token)
            .await?;

        Ok(tokens)
    }

    /// Refresh access token using refresh token
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = Self::hash_token(refresh_token);

        // Find valid refresh token
        let row = sqlx::query_as::<_, (Uuid, String, String)>(
            r#"
            SELECT e.id, e.employee_code, r.name
            FROM refresh_tokens rt
            JOIN employees e ON e.id = rt.employee_id
            JOIN roles r ON r.id = e.role_id
            WHERE rt.token_hash = $1
              AND rt.expires_at > NOW()
              AND rt.revoked_at IS NULL
              AND e.is_active = true
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

        let (employee_id, employee_code, role_name) = row;

        // Revoke old refresh token
        sqlx::query("UPDATE refresh_tokens SET revoked_at = NOW() WHERE token_hash = $1")
            .bind(&token_hash)
            .execute(&self.db)
            .await?;

        let tokens = self.generate_tokens(employee_id, &employee_code, &role_name)?;

        self.store_refresh_token(employee_id, &tokens.refresh_token)
            .await?;

        Ok(tokens)
    }

    /// Generate access and refresh tokens
    fn generate_tokens(
        &self,
        employee_id: Uuid,
        employee_code: &str,
        role_name: &str,
    ) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_token_expiry);

        let access_claims = Claims {
            sub: employee_id.to_string(),
            employee_code: employee_code.to_string(),
            role: role_name.to_string(),
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        // Refresh token (opaque random token)
        let refresh_token = Uuid::new_v4().to_string();

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Store refresh token in database
    async fn store_refresh_token(&self, employee_id: Uuid, token: &str) -> AppResult<()> {
        let token_hash = Self::hash_token(token);
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (employee_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(employee_id)
        .bind(&token_hash)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Hash a token for storage
    fn hash_token(token: &str) -> String {
        format!("{:x}", Sha256::digest(token.as_bytes()))
    }
}
