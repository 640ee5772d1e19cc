use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{
    error::UsersInfoError,
    model::{NewUser, User},
};

/// Public API trait for the users_info module that other modules can use
#[async_trait]
pub trait UsersInfoApi: Send + Sync {
    /// Get a user by ID
    async fn get_user(&self, id: Uuid) -> Result<User, UsersInfoError>;

    /// Get a user by exact email
    async fn get_user_by_email(&self, email: &str) -> Result<User, UsersInfoError>;

    /// List all users (order unspecified)
    async fn list_users(&self) -> Result<Vec<User>, UsersInfoError>;

    /// Validate and create a new user
    async fn create_user(&self, new_user: NewUser) -> Result<User, UsersInfoError>;

    /// Replace every mutable field of a user
    async fn update_user(&self, id: Uuid, replacement: NewUser) -> Result<User, UsersInfoError>;

    /// Delete a user by ID
    async fn delete_user(&self, id: Uuid) -> Result<(), UsersInfoError>;
}
