use std::sync::Arc;

use crate::contract::model::{NewUser, User};
use crate::domain::error::DomainError;
use crate::domain::events::UserDomainEvent;
use crate::domain::ports::EventPublisher;
use crate::domain::repo::{RepoError, UsersRepository};
use crate::domain::validation::{validate_new_user, Reason, ValidatedUser, ValidationFailure};
use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Domain service with business rules for user management.
/// Depends only on the repository and event ports, not on infra types.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn UsersRepository>,
    events: Arc<dyn EventPublisher<UserDomainEvent>>,
}

impl Service {
    /// Create a service with dependencies.
    pub fn new(
        repo: Arc<dyn UsersRepository>,
        events: Arc<dyn EventPublisher<UserDomainEvent>>,
    ) -> Self {
        Self { repo, events }
    }

    #[instrument(name = "users_info.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        debug!("Getting user by id");

        let user = self.repo.find_by_id(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::user_not_found(id),
            other => storage_error(other),
        })?;
        debug!("Successfully retrieved user");
        Ok(user)
    }

    #[instrument(name = "users_info.service.get_user_by_email", skip(self))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<User, DomainError> {
        debug!("Getting user by email");

        if email.trim().is_empty() {
            return Err(ValidationFailure::single("/email", "Email", Reason::Required).into());
        }

        let user = self.repo.find_by_email(email).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::user_not_found_by_email(email),
            other => storage_error(other),
        })?;
        debug!(user_id = %user.id, "Successfully retrieved user");
        Ok(user)
    }

    #[instrument(name = "users_info.service.list_users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        debug!("Listing users");

        let users = self.repo.list_all().await.map_err(storage_error)?;

        debug!("Successfully listed {} users", users.len());
        Ok(users)
    }

    #[instrument(
        name = "users_info.service.create_user",
        skip(self, new_user),
        fields(email = %new_user.email)
    )]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        let valid = validate_new_user(&new_user)?;

        let now = Utc::now();
        let user = assemble(Uuid::new_v4(), valid, now, now);

        // Uniqueness is enforced by the store, atomically with the insert
        self.repo.create(user.clone()).await.map_err(|e| match e {
            RepoError::EmailTaken(email) => DomainError::email_already_exists(email),
            other => storage_error(other),
        })?;

        self.events.publish(&UserDomainEvent::Created {
            id: user.id,
            at: user.created_at,
        });

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    /// Full replacement: every mutable field comes from `replacement`; `id`
    /// and `created_at` are kept.
    #[instrument(
        name = "users_info.service.update_user",
        skip(self, replacement),
        fields(user_id = %id)
    )]
    pub async fn update_user(&self, id: Uuid, replacement: NewUser) -> Result<User, DomainError> {
        info!("Updating user");

        let valid = validate_new_user(&replacement)?;

        let current = self.repo.find_by_id(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::user_not_found(id),
            other => storage_error(other),
        })?;

        // Best-effort: the store does not recheck uniqueness on update, and a
        // concurrent create may still slip in between this check and the write.
        if valid.email != current.email {
            match self.repo.find_by_email(&valid.email).await {
                Ok(owner) if owner.id != id => {
                    return Err(DomainError::email_already_exists(valid.email));
                }
                Ok(_) | Err(RepoError::NotFound) => {}
                Err(other) => return Err(storage_error(other)),
            }
        }

        let updated_at = Utc::now().max(current.created_at);
        let user = assemble(id, valid, current.created_at, updated_at);

        self.repo.update(user.clone()).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::user_not_found(id),
            other => storage_error(other),
        })?;

        self.events.publish(&UserDomainEvent::Updated {
            id: user.id,
            at: user.updated_at,
        });

        info!("Successfully updated user");
        Ok(user)
    }

    #[instrument(
        name = "users_info.service.delete_user",
        skip(self),
        fields(user_id = %id)
    )]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting user");

        self.repo.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::user_not_found(id),
            other => storage_error(other),
        })?;

        self.events
            .publish(&UserDomainEvent::Deleted { id, at: Utc::now() });

        info!("Successfully deleted user");
        Ok(())
    }
}

fn assemble(
    id: Uuid,
    valid: ValidatedUser,
    created_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
) -> User {
    User {
        id,
        first_name: valid.first_name,
        last_name: valid.last_name,
        email: valid.email,
        phone: valid.phone,
        date_of_birth: valid.date_of_birth,
        address: valid.address,
        created_at,
        updated_at,
    }
}

fn storage_error(e: RepoError) -> DomainError {
    DomainError::storage(e.to_string())
}
