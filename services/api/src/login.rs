//! Login use case orchestrating credential verification and token issuance
//!
//! The use case depends on two injected capabilities: a user store and an
//! authenticator (password check + token mint). Both are traits so tests can
//! substitute in-memory doubles.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::jwt::Claims;
use crate::models::{Credentials, User};

/// Generic rejection message; never reveals whether the username exists
const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// User lookup and persistence capability
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn save(&self, user: &User) -> Result<User>;
}

/// Password and token capability
pub trait Authenticator: Send + Sync {
    fn verify_password(&self, candidate: &str, stored: &str) -> bool;
    fn hash_password(&self, plain: &str) -> String;
    fn issue_token(&self, user_id: i64, username: &str) -> Result<String>;
    fn verify_token(&self, token: &str) -> Option<Claims>;
}

/// Result of a login attempt
///
/// Exactly one side is populated: `user` and `token` on success, `error`
/// on failure.
#[derive(Debug, Clone, Default)]
pub struct LoginOutcome {
    pub success: bool,
    pub user: Option<User>,
    pub token: Option<String>,
    pub error: Option<String>,
}

impl LoginOutcome {
    fn granted(user: User, token: String) -> Self {
        Self {
            success: true,
            user: Some(user),
            token: Some(token),
            error: None,
        }
    }

    fn denied(error: impl Into<String>) -> Self {
        Self {
            success: false,
            user: None,
            token: None,
            error: Some(error.into()),
        }
    }
}

/// Login use case
#[derive(Clone)]
pub struct LoginUseCase<S, A> {
    store: S,
    auth: A,
}

impl<S: UserStore, A: Authenticator> LoginUseCase<S, A> {
    /// Create a new login use case over the given capabilities
    pub fn new(store: S, auth: A) -> Self {
        Self { store, auth }
    }

    /// Run lookup -> password check -> token issuance
    ///
    /// Every failure mode, including store or issuer faults, collapses into
    /// a denied outcome; this function never returns an error and never
    /// panics.
    pub async fn execute(&self, credentials: &Credentials) -> LoginOutcome {
        match self.attempt(credentials).await {
            Ok(outcome) => outcome,
            Err(err) => {
                info!("Login attempt failed: {}", err);
                LoginOutcome::denied(err.to_string())
            }
        }
    }

    async fn attempt(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        let Some(user) = self.store.find_by_username(&credentials.username).await? else {
            return Ok(LoginOutcome::denied(INVALID_CREDENTIALS));
        };

        if !self
            .auth
            .verify_password(&credentials.password, &user.password)
        {
            return Ok(LoginOutcome::denied(INVALID_CREDENTIALS));
        }

        let token = self.auth.issue_token(user.id, &user.username)?;

        Ok(LoginOutcome::granted(user, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::{JwtConfig, JwtService};
    use crate::models::Role;
    use chrono::Utc;
    use std::sync::Mutex;

    fn admin_user() -> User {
        User {
            id: 1,
            username: "admin".to_string(),
            password: "admin123".to_string(),
            role: Role::Administrator,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// In-memory store double
    struct InMemoryUserStore {
        users: Mutex<Vec<User>>,
    }

    impl InMemoryUserStore {
        fn with_admin() -> Self {
            Self {
                users: Mutex::new(vec![admin_user()]),
            }
        }
    }

    #[async_trait]
    impl UserStore for InMemoryUserStore {
        async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
            let users = self.users.lock().expect("store lock");
            Ok(users.iter().find(|u| u.username == username).cloned())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
            let users = self.users.lock().expect("store lock");
            Ok(users.iter().find(|u| u.id == id).cloned())
        }

        async fn save(&self, user: &User) -> Result<User> {
            let mut users = self.users.lock().expect("store lock");
            let mut user = user.clone();
            if let Some(existing) = users.iter_mut().find(|u| u.id == user.id) {
                *existing = user.clone();
            } else {
                user.id = users.len() as i64 + 1;
                users.push(user.clone());
            }
            Ok(user)
        }
    }

    /// Store double whose every operation fails
    struct FailingUserStore;

    #[async_trait]
    impl UserStore for FailingUserStore {
        async fn find_by_username(&self, _username: &str) -> Result<Option<User>> {
            Err(anyhow::anyhow!("database unavailable"))
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<User>> {
            Err(anyhow::anyhow!("database unavailable"))
        }

        async fn save(&self, _user: &User) -> Result<User> {
            Err(anyhow::anyhow!("database unavailable"))
        }
    }

    fn use_case_with_admin() -> LoginUseCase<InMemoryUserStore, JwtService> {
        LoginUseCase::new(
            InMemoryUserStore::with_admin(),
            JwtService::new(&JwtConfig::default()),
        )
    }

    #[test]
    fn test_authenticator_password_capability() {
        let auth = JwtService::new(&JwtConfig::default());
        let stored = auth.hash_password("admin123");
        assert_eq!(stored, "admin123");
        assert!(auth.verify_password("admin123", &stored));
        assert!(!auth.verify_password("Admin123", &stored));
    }

    #[tokio::test]
    async fn test_login_with_valid_credentials() {
        let use_case = use_case_with_admin();
        let outcome = use_case
            .execute(&Credentials {
                username: "admin".to_string(),
                password: "admin123".to_string(),
            })
            .await;

        assert!(outcome.success);
        assert!(outcome.error.is_none());
        let user = outcome.user.expect("user");
        assert_eq!(user.username, "admin");
        assert_eq!(user.role, Role::Administrator);
        let token = outcome.token.expect("token");
        assert_eq!(token.split('.').count(), 3);
    }

    #[tokio::test]
    async fn test_login_token_round_trips_identity() {
        let jwt = JwtService::new(&JwtConfig::default());
        let use_case = LoginUseCase::new(InMemoryUserStore::with_admin(), jwt.clone());

        let outcome = use_case
            .execute(&Credentials {
                username: "admin".to_string(),
                password: "admin123".to_string(),
            })
            .await;

        let claims = jwt
            .validate_token(&outcome.token.expect("token"))
            .expect("claims");
        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.username, "admin");
    }

    #[tokio::test]
    async fn test_login_with_unknown_username() {
        let use_case = use_case_with_admin();
        let outcome = use_case
            .execute(&Credentials {
                username: "nonexistentuser".to_string(),
                password: "admin123".to_string(),
            })
            .await;

        assert!(!outcome.success);
        assert!(outcome.user.is_none());
        assert!(outcome.token.is_none());
        assert_eq!(outcome.error.as_deref(), Some(INVALID_CREDENTIALS));
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let use_case = use_case_with_admin();
        let outcome = use_case
            .execute(&Credentials {
                username: "admin".to_string(),
                password: "wrongpassword".to_string(),
            })
            .await;

        assert!(!outcome.success);
        assert!(outcome.user.is_none());
        assert!(outcome.token.is_none());
        // Same generic message as an unknown username
        assert_eq!(outcome.error.as_deref(), Some(INVALID_CREDENTIALS));
    }

    #[tokio::test]
    async fn test_login_with_failing_store() {
        let use_case = LoginUseCase::new(FailingUserStore, JwtService::new(&JwtConfig::default()));
        let outcome = use_case
            .execute(&Credentials {
                username: "admin".to_string(),
                password: "admin123".to_string(),
            })
            .await;

        assert!(!outcome.success);
        assert!(outcome.user.is_none());
        assert!(outcome.token.is_none());
        assert_eq!(outcome.error.as_deref(), Some("database unavailable"));
    }
}
