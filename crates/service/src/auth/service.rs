use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use tracing::{info, debug, warn, instrument};

use common::metrics::LOGIN_ATTEMPTS;

use super::domain::{AuthSession, AuthUser, LoginInput, RefreshInput, RegisterInput, TokenPair, TokenType};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::tokens;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub password_algorithm: String,
}

impl AuthConfig {
    /// Lifetimes are clamped to the ranges `configs` accepts.
    pub fn from_config(cfg: &configs::AuthConfig) -> Self {
        let access = cfg.access_token_ttl_minutes.clamp(1, configs::MAX_ACCESS_TTL_MINUTES);
        let refresh = cfg.refresh_token_ttl_days.clamp(1, configs::MAX_REFRESH_TTL_DAYS);
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            access_ttl: Duration::minutes(access),
            refresh_ttl: Duration::days(refresh),
            password_algorithm: "argon2".into(),
        }
    }

    /// Default lifetimes (60 minutes / 7 days) with the given secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: secret.into(),
            access_ttl: Duration::minutes(60),
            refresh_ttl: Duration::days(7),
            password_algorithm: "argon2".into(),
        }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository + ?Sized> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Create an account with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::with_secret("secret"));
    /// let input = RegisterInput { email: "owner@example.com".into(), name: "Owner".into(), password: "Secret123".into(), is_staff: true };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "owner@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        if input.password.len() < 8 {
            return Err(AuthError::Validation("password too short (>=8)".into()));
        }
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let user = self.repo.create_user(&input.email, &input.name, input.is_staff).await?;
        let hash = hash_password(&input.password)?;
        let _cred = self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = user.id, email = %user.email, is_staff = user.is_staff, "user_registered");
        Ok(user)
    }

    /// Seed a staff account unless one with this email already exists.
    /// Returns the created user, or `None` when nothing was done.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<Option<AuthUser>, AuthError> {
        if self.repo.find_user_by_email(email).await?.is_some() {
            debug!("admin already present");
            return Ok(None);
        }
        let user = self
            .register(RegisterInput { email: email.to_string(), name: "Admin".into(), password: password.to_string(), is_staff: true })
            .await?;
        Ok(Some(user))
    }

    /// Authenticate with email + password and issue an access/refresh pair.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig::with_secret("secret"));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into(), is_staff: true }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { login: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert_ne!(session.tokens.access_token, session.tokens.refresh_token);
    /// ```
    #[instrument(skip(self, input), fields(login = %input.login))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        if input.login.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("login and password are required".into()));
        }
        let result = self.verify_login(&input).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(AuthError::Disabled) => "disabled",
            Err(AuthError::Unauthorized) => "invalid",
            Err(_) => "error",
        };
        LOGIN_ATTEMPTS.with_label_values(&[outcome]).inc();
        let user = result?;

        let tokens = self.issue_pair(&user)?;
        info!(user_id = user.id, "user_logged_in");
        Ok(AuthSession { user, tokens })
    }

    async fn verify_login(&self, input: &LoginInput) -> Result<AuthUser, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.login)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }
        if !user.is_active {
            return Err(AuthError::Disabled);
        }
        Ok(user)
    }

    /// Exchange a refresh token for a new pair. The presented token is
    /// blacklisted so it cannot be used again.
    #[instrument(skip(self, input))]
    pub async fn refresh(&self, input: RefreshInput) -> Result<TokenPair, AuthError> {
        if input.refresh_token.trim().is_empty() {
            return Err(AuthError::Validation("refresh_token is required".into()));
        }
        let claims = tokens::decode_claims(&input.refresh_token, &self.cfg.jwt_secret)?;
        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::InvalidToken);
        }
        if self.repo.is_token_blacklisted(&claims.jti).await? {
            warn!(jti = %claims.jti, "refresh token reuse");
            return Err(AuthError::InvalidToken);
        }
        let user_id = claims.user_id().ok_or(AuthError::InvalidToken)?;
        let user = self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::InvalidToken)?;
        if !user.is_active {
            return Err(AuthError::InvalidToken);
        }
        if !self.repo.blacklist_token(&claims.jti, user.id, tokens::expires_at(&claims)).await? {
            // lost a race with a concurrent refresh of the same token
            return Err(AuthError::InvalidToken);
        }
        let pair = self.issue_pair(&user)?;
        info!(user_id = user.id, "token_refreshed");
        Ok(pair)
    }

    /// Resolve the user behind an access token.
    pub async fn authenticate(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let claims = tokens::decode_claims(access_token, &self.cfg.jwt_secret)?;
        if claims.token_type != TokenType::Access {
            return Err(AuthError::InvalidToken);
        }
        let user_id = claims.user_id().ok_or(AuthError::InvalidToken)?;
        let user = self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::InvalidToken)?;
        if !user.is_active {
            return Err(AuthError::InvalidToken);
        }
        Ok(user)
    }

    fn issue_pair(&self, user: &AuthUser) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        Ok(TokenPair {
            access_token: tokens::issue(user, TokenType::Access, self.cfg.access_ttl, &self.cfg.jwt_secret, now)?,
            refresh_token: tokens::issue(user, TokenType::Refresh, self.cfg.refresh_ttl, &self.cfg.jwt_secret, now)?,
        })
    }
}

/// Argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::HashError(e.to_string()))
}
