//! Known notification recipients, used to resolve broadcast alerts.

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::User;

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn all_users(&self) -> Vec<User>;
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }

    /// Seed from a JSON array of user records.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let raw = std::fs::read_to_string(path)?;
        let users: Vec<User> = serde_json::from_str(&raw)?;
        Ok(Self::new(users))
    }

    pub async fn replace(&self, users: Vec<User>) {
        *self.users.write().await = users;
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn all_users(&self) -> Vec<User> {
        self.users.read().await.clone()
    }
}
