//! Process-local `UsersRepository` backed by a read-write-locked map.
//!
//! Readers share the lock; writers are exclusive. No guard is ever held
//! across an `.await`, so every operation completes without suspending.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::instrument;
use uuid::Uuid;

use crate::contract::model::User;
use crate::domain::repo::{RepoError, UsersRepository};

#[derive(Default)]
pub struct InMemoryUsersRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[async_trait]
impl UsersRepository for InMemoryUsersRepository {
    #[instrument(level = "debug", name = "users_info.repo.create", skip_all, fields(user_id = %user.id))]
    async fn create(&self, user: User) -> Result<(), RepoError> {
        let mut users = self.users.write();
        // scan and insert under the same write guard
        if users.values().any(|u| u.email == user.email) {
            return Err(RepoError::EmailTaken(user.email));
        }
        users.insert(user.id, user);
        Ok(())
    }

    #[instrument(level = "debug", name = "users_info.repo.find_by_id", skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<User, RepoError> {
        self.users.read().get(&id).cloned().ok_or(RepoError::NotFound)
    }

    #[instrument(level = "debug", name = "users_info.repo.find_by_email", skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<User, RepoError> {
        self.users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    #[instrument(level = "debug", name = "users_info.repo.list_all", skip_all)]
    async fn list_all(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.users.read().values().cloned().collect())
    }

    #[instrument(level = "debug", name = "users_info.repo.update", skip_all, fields(user_id = %user.id))]
    async fn update(&self, user: User) -> Result<(), RepoError> {
        let mut users = self.users.write();
        match users.get_mut(&user.id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(RepoError::NotFound),
        }
    }

    #[instrument(level = "debug", name = "users_info.repo.delete", skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.users
            .write()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}
