use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: i32) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(&self, email: &str, name: &str, is_staff: bool) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: i32) -> Result<Option<Credentials>, AuthError>;
    async fn upsert_password(&self, user_id: i32, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError>;

    async fn is_token_blacklisted(&self, jti: &str) -> Result<bool, AuthError>;
    /// Returns `false` when the jti was already blacklisted.
    async fn blacklist_token(&self, jti: &str, user_id: i32, expires_at: DateTime<Utc>) -> Result<bool, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: email
        creds: Mutex<HashMap<i32, Credentials>>, // key: user_id
        blacklist: Mutex<HashSet<String>>,
        next_id: AtomicI32,
    }

    impl MockAuthRepository {
        /// Flip the active flag of an existing user, matched like `find_user_by_email`.
        pub fn set_active(&self, email: &str, active: bool) {
            if let Some(u) = self.users.lock().unwrap().get_mut(&email.trim().to_lowercase()) {
                u.is_active = active;
            }
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(&email.trim().to_lowercase()).cloned())
        }

        async fn find_user_by_id(&self, id: i32) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.id == id).cloned())
        }

        async fn create_user(&self, email: &str, name: &str, is_staff: bool) -> Result<AuthUser, AuthError> {
            let key = email.trim().to_lowercase();
            let mut users = self.users.lock().unwrap();
            if users.contains_key(&key) {
                return Err(AuthError::Conflict);
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let user = AuthUser { id, email: key.clone(), name: name.to_string(), is_active: true, is_staff };
            users.insert(key, user.clone());
            Ok(user)
        }

        async fn get_credentials(&self, user_id: i32) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }

        async fn upsert_password(&self, user_id: i32, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
            let mut creds = self.creds.lock().unwrap();
            let c = Credentials { user_id, password_hash, password_algorithm };
            creds.insert(user_id, c.clone());
            Ok(c)
        }

        async fn is_token_blacklisted(&self, jti: &str) -> Result<bool, AuthError> {
            Ok(self.blacklist.lock().unwrap().contains(jti))
        }

        async fn blacklist_token(&self, jti: &str, _user_id: i32, _expires_at: DateTime<Utc>) -> Result<bool, AuthError> {
            Ok(self.blacklist.lock().unwrap().insert(jti.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockAuthRepository;
    use super::AuthRepository;

    #[tokio::test]
    async fn mock_set_active_matches_email_case_insensitively() -> Result<(), anyhow::Error> {
        let repo = MockAuthRepository::default();
        repo.create_user("Owner@Salon.test", "Owner", true).await?;

        repo.set_active("  OWNER@salon.TEST ", false);
        let user = repo.find_user_by_email("owner@salon.test").await?;
        assert_eq!(user.map(|u| u.is_active), Some(false));
        Ok(())
    }
}
