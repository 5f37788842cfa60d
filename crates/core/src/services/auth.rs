//! Authentication service.
//!
//! Registration and login issue a short-lived access JWT plus a rotating
//! refresh JWT (delivered by the API layer as an HTTP-only cookie). Refresh
//! rotation blacklists the old token's `jti` in Redis for its remaining
//! lifetime; Google sign-in verifies an ID token against Google's tokeninfo
//! endpoint and finds-or-creates the matching local account.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation as JwtValidation};
use netabase_common::{
    config::AuthConfig, AppError, AppResult, IdGenerator, TokenBlacklist,
};
use netabase_db::{entities::user, repositories::UserRepository};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("valid username regex"));

/// Passwords rejected outright regardless of length.
const WEAK_PASSWORDS: &[&str] = &["password", "12345678", "admin", "qwerty"];

/// Input for creating a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 128, message = "Username must be at least 3 characters long."))]
    pub username: String,

    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters long."))]
    pub password: String,

    pub confirm_password: String,
}

/// Input for logging in.
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Whether a JWT grants API access or only refresh rights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    pub username: String,
    /// Token ID, the blacklist key for refresh tokens.
    pub jti: String,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
}

/// An access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    /// Refresh token lifetime, for the cookie's Max-Age.
    pub refresh_max_age_secs: i64,
}

/// Verifies Google ID tokens against the tokeninfo endpoint.
#[derive(Clone)]
pub struct GoogleVerifier {
    http: reqwest::Client,
    client_id: String,
    endpoint: String,
}

/// Claims extracted from a verified Google ID token.
#[derive(Debug, Deserialize)]
pub struct GoogleTokenInfo {
    pub aud: String,
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl GoogleVerifier {
    const TOKENINFO_URL: &'static str = "https://oauth2.googleapis.com/tokeninfo";

    /// Create a verifier for a Google OAuth client ID.
    #[must_use]
    pub fn new(http: reqwest::Client, client_id: String) -> Self {
        Self {
            http,
            client_id,
            endpoint: Self::TOKENINFO_URL.to_string(),
        }
    }

    /// Create a verifier against a custom tokeninfo endpoint (tests).
    #[must_use]
    pub fn with_endpoint(http: reqwest::Client, client_id: String, endpoint: String) -> Self {
        Self {
            http,
            client_id,
            endpoint,
        }
    }

    /// Verify an ID token and return its claims.
    ///
    /// Rejects tokens Google does not recognize and tokens issued for a
    /// different client ID.
    pub async fn verify(&self, credential: &str) -> AppResult<GoogleTokenInfo> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("id_token", credential)])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized);
        }

        let info: GoogleTokenInfo = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        if info.aud != self.client_id {
            tracing::warn!(aud = %info.aud, "Google ID token issued for another client");
            return Err(AppError::Unauthorized);
        }

        Ok(info)
    }
}

/// Authentication service for business logic.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    blacklist: TokenBlacklist,
    config: AuthConfig,
    google: Option<GoogleVerifier>,
    id_gen: IdGenerator,
}

impl AuthService {
    /// Create a new authentication service.
    ///
    /// Google sign-in is enabled when the config carries a client ID.
    #[must_use]
    pub fn new(user_repo: UserRepository, blacklist: TokenBlacklist, config: AuthConfig) -> Self {
        let google = config
            .google_client_id
            .clone()
            .map(|client_id| GoogleVerifier::new(reqwest::Client::new(), client_id));

        Self {
            user_repo,
            blacklist,
            config,
            google,
            id_gen: IdGenerator::new(),
        }
    }

    /// Name of the refresh token cookie.
    #[must_use]
    pub fn refresh_cookie_name(&self) -> &str {
        &self.config.refresh_cookie
    }

    /// Whether the refresh cookie requires HTTPS.
    #[must_use]
    pub const fn cookie_secure(&self) -> bool {
        self.config.cookie_secure
    }

    /// Register a new account and issue its first token pair.
    pub async fn register(&self, input: RegisterInput) -> AppResult<(user::Model, TokenPair)> {
        let input = RegisterInput {
            username: input.username.trim().to_string(),
            ..input
        };
        input.validate()?;

        if !USERNAME_RE.is_match(&input.username) {
            return Err(AppError::Validation(
                "Username can only contain letters, numbers, dots, hyphens and underscores."
                    .to_string(),
            ));
        }

        Self::check_password_strength(&input.password)?;

        if input.password != input.confirm_password {
            return Err(AppError::Validation("Passwords do not match.".to_string()));
        }

        if self.user_repo.username_taken(&input.username).await? {
            return Err(AppError::Validation(
                "Username is already taken.".to_string(),
            ));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            password_hash: Set(Some(hash_password(&input.password)?)),
            email: Set(None),
            google_sub: Set(None),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        let tokens = self.issue_pair(&user)?;

        tracing::info!(user_id = %user.id, "Registered new user");

        Ok((user, tokens))
    }

    /// Authenticate a username/password pair and issue tokens.
    pub async fn login(&self, input: &LoginInput) -> AppResult<(user::Model, TokenPair)> {
        let username = input.username.trim();
        if username.is_empty() || input.password.is_empty() {
            return Err(AppError::Validation(
                "Username and password are required.".to_string(),
            ));
        }

        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let hash = user.password_hash.as_deref().ok_or(AppError::Unauthorized)?;
        if !verify_password(&input.password, hash) {
            return Err(AppError::Unauthorized);
        }

        if !user.is_active {
            return Err(AppError::Forbidden("Account is disabled.".to_string()));
        }

        let tokens = self.issue_pair(&user)?;
        Ok((user, tokens))
    }

    /// Sign in with a Google ID token, creating the local account on first
    /// use.
    pub async fn google_login(&self, credential: &str) -> AppResult<(user::Model, TokenPair)> {
        let verifier = self.google.as_ref().ok_or_else(|| {
            AppError::BadRequest("Google sign-in is not configured.".to_string())
        })?;

        let info = verifier.verify(credential).await?;

        let user = match self.user_repo.find_by_google_sub(&info.sub).await? {
            Some(user) => user,
            None => self.create_google_user(&info).await?,
        };

        if !user.is_active {
            return Err(AppError::Forbidden("Account is disabled.".to_string()));
        }

        let tokens = self.issue_pair(&user)?;
        Ok((user, tokens))
    }

    /// Rotate a refresh token: blacklist the old one, issue a fresh pair.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<(user::Model, TokenPair)> {
        let claims = self.decode(refresh_token)?;

        if claims.token_type != TokenType::Refresh {
            return Err(AppError::Unauthorized);
        }

        if self.blacklist.is_revoked(&claims.jti).await? {
            tracing::warn!(jti = %claims.jti, "Replay of revoked refresh token");
            return Err(AppError::Unauthorized);
        }

        let user = self
            .user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::Forbidden("Account is disabled.".to_string()));
        }

        // Rotation: the old token must never be usable again.
        let remaining = claims.exp - Utc::now().timestamp();
        self.blacklist.revoke(&claims.jti, remaining).await?;

        let tokens = self.issue_pair(&user)?;
        Ok((user, tokens))
    }

    /// Log out: blacklist the presented refresh token.
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        let claims = self.decode(refresh_token)?;

        if claims.token_type != TokenType::Refresh {
            return Err(AppError::Unauthorized);
        }

        let remaining = claims.exp - Utc::now().timestamp();
        self.blacklist.revoke(&claims.jti, remaining).await?;

        Ok(())
    }

    /// Resolve a bearer access token to its user.
    ///
    /// Used by the API auth middleware on every request.
    pub async fn authenticate_access(&self, token: &str) -> AppResult<user::Model> {
        let claims = self.decode(token)?;

        if claims.token_type != TokenType::Access {
            return Err(AppError::Unauthorized);
        }

        let user = self
            .user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Issue an access/refresh pair for a user.
    pub fn issue_pair(&self, user: &user::Model) -> AppResult<TokenPair> {
        let access = self.issue(user, TokenType::Access, self.config.access_ttl_secs)?;
        let refresh = self.issue(user, TokenType::Refresh, self.config.refresh_ttl_secs)?;

        Ok(TokenPair {
            access,
            refresh,
            refresh_max_age_secs: self.config.refresh_ttl_secs,
        })
    }

    fn issue(&self, user: &user::Model, token_type: TokenType, ttl_secs: i64) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            jti: self.id_gen.generate_token(),
            token_type,
            iat: now,
            exp: now + ttl_secs,
        };

        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(e.to_string()))
    }

    /// Decode and validate a JWT (signature and expiry).
    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &JwtValidation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
    }

    async fn create_google_user(&self, info: &GoogleTokenInfo) -> AppResult<user::Model> {
        let base = info
            .email
            .as_deref()
            .and_then(|email| email.split('@').next())
            .filter(|local| !local.is_empty())
            .map_or_else(|| format!("user{}", &info.sub), str::to_string);

        // Usernames are unique; disambiguate with a short random suffix
        // until one is free.
        let mut username = base.clone();
        while self.user_repo.username_taken(&username).await? {
            username = format!("{base}-{}", &self.id_gen.generate_token()[..6]);
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(username),
            password_hash: Set(None),
            email: Set(info.email.clone()),
            google_sub: Set(Some(info.sub.clone())),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, "Created account from Google sign-in");
        Ok(user)
    }

    fn check_password_strength(password: &str) -> AppResult<()> {
        if WEAK_PASSWORDS.contains(&password.to_lowercase().as_str()) {
            return Err(AppError::Validation(
                "Password is too common or weak.".to_string(),
            ));
        }

        if password.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation(
                "Password cannot be entirely numeric.".to_string(),
            ));
        }

        Ok(())
    }
}

/// Hash a password with Argon2id and a random salt.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Verify a password against a stored Argon2 hash.
fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
