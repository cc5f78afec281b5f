//! Registration, password login and the federated token exchange.

use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{LoginRequest, LoginResponse, PublicUser, RegisterRequest, TokenRequest, User},
    repository::RepositoryState,
    token::{Identity, TokenService},
};

/// Accounts
///
/// Owns the credential flows. Password hashing is CPU bound, so bcrypt runs on
/// the blocking thread pool rather than on the request's worker thread.
#[derive(Clone)]
pub struct Accounts {
    repo: RepositoryState,
    tokens: TokenService,
    bcrypt_cost: u32,
}

impl Accounts {
    pub fn new(repo: RepositoryState, tokens: TokenService, bcrypt_cost: u32) -> Self {
        Self {
            repo,
            tokens,
            bcrypt_cost,
        }
    }

    /// register
    ///
    /// Creates a user with a bcrypt-hashed password. The email must be unused.
    pub async fn register(&self, request: RegisterRequest) -> ApiResult<User> {
        let request = request.validate()?;

        if self.repo.find_user_by_email(&request.email).await?.is_some() {
            return Err(user_exists());
        }

        let password_hash = hash_password(request.password, self.bcrypt_cost).await?;
        let user = User {
            id: Uuid::new_v4(),
            name: request.name,
            email: request.email,
            password_hash,
        };

        // A concurrent registration may still win the race for this email.
        let created = self.repo.create_user(user).await?.ok_or_else(user_exists)?;
        tracing::info!(user_id = %created.id, "user registered");
        Ok(created)
    }

    /// login
    ///
    /// Checks the password against the stored digest and issues a session token.
    pub async fn login(&self, request: LoginRequest) -> ApiResult<LoginResponse> {
        let request = request.validate()?;

        let user = self
            .repo
            .find_user_by_email(&request.email)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        if !verify_password(request.password, user.password_hash.clone()).await? {
            tracing::debug!(user_id = %user.id, "login rejected: wrong password");
            return Err(ApiError::Unauthenticated("Wrong password".to_string()));
        }

        let identity = Identity {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            photo: None,
        };
        let token = self.issue(&identity)?;

        Ok(LoginResponse {
            token,
            user: PublicUser::from(&user),
        })
    }

    /// exchange_token
    ///
    /// Issues a session token for a user already authenticated by the external
    /// identity provider. A registered account with the same email lends its id
    /// and name; otherwise the subject is derived deterministically from the email.
    pub async fn exchange_token(&self, request: TokenRequest) -> ApiResult<String> {
        let email = request.email.trim().to_string();
        if email.is_empty() {
            return Err(ApiError::InvalidInput("Email is required".to_string()));
        }
        let provided_name = request
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let identity = match self.repo.find_user_by_email(&email).await? {
            Some(user) => Identity {
                id: user.id,
                name: provided_name.unwrap_or(user.name),
                email: user.email,
                photo: request.photo,
            },
            None => Identity {
                id: Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("mailto:{}", email).as_bytes()),
                name: provided_name.unwrap_or_else(|| default_display_name(&email)),
                email,
                photo: request.photo,
            },
        };

        self.issue(&identity)
    }

    fn issue(&self, identity: &Identity) -> ApiResult<String> {
        self.tokens
            .issue(identity)
            .map_err(|e| ApiError::Internal(e.to_string()))
    }
}

fn user_exists() -> ApiError {
    ApiError::InvalidInput("User already exists".to_string())
}

/// The local part of an email address, used when no display name was supplied.
fn default_display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

async fn hash_password(password: String, cost: u32) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {}", e)))?
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {}", e)))
}

async fn verify_password(password: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("verification task failed: {}", e)))?
        .map_err(|e| ApiError::Internal(format!("failed to verify password: {}", e)))
}
