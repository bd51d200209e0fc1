// security/src/lib.rs
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};
use uuid::Uuid;

use lib::errors::HospitalError;
use lib::services::UserService;
use models::medical::{Login, User, UserProfile};

pub mod roles;

pub use roles::require_role;

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Claims for JWT. The subject is the user id; nothing else about the user is embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub iat: i64,
    pub exp: i64,
}

/// Successful login payload.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Custom authentication errors.
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
    ExpiredToken,
    UnknownUser,
    InvalidCredentials,
    Forbidden,
    JwtError(String),
    Storage(HospitalError),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "Missing bearer token"),
            AuthError::InvalidToken(msg) => write!(f, "Invalid token: {}", msg),
            AuthError::ExpiredToken => write!(f, "Token has expired"),
            AuthError::UnknownUser => write!(f, "Token subject no longer exists"),
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::Forbidden => write!(f, "Access denied."),
            AuthError::JwtError(msg) => write!(f, "JWT error: {}", msg),
            AuthError::Storage(err) => write!(f, "Storage error: {}", err),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<HospitalError> for AuthError {
    fn from(err: HospitalError) -> Self {
        AuthError::Storage(err)
    }
}

impl From<AuthError> for HospitalError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => HospitalError::Unauthorized(err.to_string()),
            AuthError::MissingToken
            | AuthError::InvalidToken(_)
            | AuthError::ExpiredToken
            | AuthError::UnknownUser => HospitalError::Unauthorized("Please authenticate.".to_string()),
            AuthError::Forbidden => HospitalError::Forbidden(err.to_string()),
            AuthError::JwtError(msg) => HospitalError::InternalError(msg),
            AuthError::Storage(inner) => inner,
        }
    }
}

/// Issues and checks HS256 bearer tokens.
#[derive(Clone)]
pub struct Authenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("token_ttl", &self.token_ttl)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(secret: &str, token_ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }

    /// Generates a JWT token for `user_id`.
    pub fn issue_token(&self, user_id: &Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::JwtError(format!("Failed to encode JWT: {}", e)))
    }

    /// Decodes and validates a JWT token, returning its subject.
    pub fn validate_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;
        Uuid::parse_str(&data.claims.sub).map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Checks an email and password pair and issues a token on success.
    pub async fn login(&self, users: &UserService, login: &Login) -> Result<LoginResponse, AuthError> {
        let Some(user) = users.find_by_email(&login.email).await? else {
            warn!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let password = login.password.clone();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || User::verify_password(&password, &hash))
            .await
            .map_err(HospitalError::from)?
            .map_err(HospitalError::from)?;
        if !matches {
            warn!("Rejected password for user {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let user = users.record_login(user).await?;
        let token = self.issue_token(&user.id)?;
        info!("User {} logged in", user.id);
        Ok(LoginResponse {
            token,
            user: user.profile(),
        })
    }

    /// Resolves the user behind an `Authorization` header value. The user is
    /// re-read from the store so tokens of deleted users stop working.
    pub async fn authenticate(
        &self,
        users: &UserService,
        authorization: Option<&str>,
    ) -> Result<User, AuthError> {
        let token = authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        let user_id = self.validate_token(token)?;
        match users.get(&user_id).await {
            Ok(user) => Ok(user),
            Err(HospitalError::NotFound(_)) => Err(AuthError::UnknownUser),
            Err(other) => Err(AuthError::Storage(other)),
        }
    }
}
