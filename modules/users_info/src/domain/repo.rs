use crate::contract::model::User;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Storage-level failures.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Another live record already holds this email.
    #[error("email '{0}' is already taken")]
    EmailTaken(String),

    #[error("user not found")]
    NotFound,

    /// Generic fault of a non-memory backend.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Port for the domain layer: persistence operations the domain needs.
/// Object-safe and async-friendly via `async_trait`.
///
/// Every operation is total and atomic: callers never observe a partially
/// applied write.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Insert a fully-formed user. The email uniqueness check and the insert
    /// are one atomic step.
    async fn create(&self, user: User) -> Result<(), RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<User, RepoError>;

    /// Exact, case-sensitive email match.
    async fn find_by_email(&self, email: &str) -> Result<User, RepoError>;

    /// Snapshot of all users; order unspecified.
    async fn list_all(&self) -> Result<Vec<User>, RepoError>;

    /// Replace the record at `user.id`. Email uniqueness is NOT rechecked here.
    async fn update(&self, user: User) -> Result<(), RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}
