use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::models::User;
use crate::errors::StoreError;

const MOCK_AVATAR_URL: &str = "https://avatars.githubusercontent.com/u/583231?v=4";

/// In-memory session registry keyed by the opaque user id handed to the
/// frontend. Sessions live until logout or process exit.
#[derive(Clone, Default)]
pub struct UserStore {
    inner: Arc<Mutex<HashMap<String, User>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session for a GitHub account and return its user record.
    pub fn create(
        &self,
        github_username: String,
        avatar_url: Option<String>,
        access_token: String,
    ) -> Result<User, StoreError> {
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            github_username,
            avatar_url,
            access_token,
        };
        self.insert(user.clone())?;
        Ok(user)
    }

    /// Register a fake session used when no OAuth app is configured.
    pub fn create_mock(&self) -> Result<User, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let short: String = id.chars().take(8).collect();
        let user = User {
            github_username: format!("mock_user_{}", short),
            avatar_url: Some(MOCK_AVATAR_URL.to_string()),
            access_token: format!("mock_token_{}", id),
            id,
        };
        self.insert(user.clone())?;
        Ok(user)
    }

    pub fn insert(&self, user: User) -> Result<(), StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .insert(user.id.clone(), user);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .inner
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .get(id)
            .cloned())
    }

    /// Drop a session. Returns whether it existed.
    pub fn remove(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .inner
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .remove(id)
            .is_some())
    }
}
