//! User repository for database operations.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use thiserror::Error;
use uuid::Uuid;

use expenza_core::workflow::UserRole;

use crate::entities::users;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// User not found.
    #[error("User {0} not found")]
    NotFound(Uuid),

    /// Email is already registered.
    #[error("Email {0} is already registered")]
    EmailTaken(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Email address (stored lowercase).
    pub email: String,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Full name.
    pub name: String,
    /// Role in the company.
    pub role: UserRole,
    /// Owning company.
    pub company_id: Uuid,
    /// Optional manager reference.
    pub manager_id: Option<Uuid>,
}

/// Input for admin updates to a user (role/manager only).
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// New role.
    pub role: Option<UserRole>,
    /// New manager assignment (outer None = keep, inner None = clear).
    pub manager_id: Option<Option<Uuid>>,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, UserError> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.to_lowercase()))
            .one(&self.db)
            .await?;
        Ok(user)
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<users::Model>, UserError> {
        let user = users::Entity::find_by_id(id).one(&self.db).await?;
        Ok(user)
    }

    /// Checks if an email is already registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn email_exists(&self, email: &str) -> Result<bool, UserError> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email.to_lowercase()))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmailTaken` if the email is already registered.
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, UserError> {
        let email = input.email.to_lowercase();
        if self.email_exists(&email).await? {
            return Err(UserError::EmailTaken(email));
        }

        let now = chrono::Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(input.password_hash),
            name: Set(input.name),
            role: Set(input.role.into()),
            company_id: Set(input.company_id),
            manager_id: Set(input.manager_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = user.insert(&self.db).await?;
        Ok(created)
    }

    /// Lists all users in a company, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<users::Model>, UserError> {
        let users = users::Entity::find()
            .filter(users::Column::CompanyId.eq(company_id))
            .order_by_asc(users::Column::Name)
            .all(&self.db)
            .await?;
        Ok(users)
    }

    /// Updates a user's role and/or manager (admin operation).
    ///
    /// Everything else about a user is immutable after creation.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if the user does not exist in the company.
    pub async fn update_role_and_manager(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        input: UpdateUserInput,
    ) -> Result<users::Model, UserError> {
        let user = users::Entity::find_by_id(user_id)
            .filter(users::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        let mut active: users::ActiveModel = user.into();
        if let Some(role) = input.role {
            active.role = Set(role.into());
        }
        if let Some(manager_id) = input.manager_id {
            active.manager_id = Set(manager_id);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }
}
