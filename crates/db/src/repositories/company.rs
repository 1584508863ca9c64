//! Company repository for tenant operations.

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use thiserror::Error;
use uuid::Uuid;

use crate::entities::companies;

/// Errors that can occur during company operations.
#[derive(Debug, Error)]
pub enum CompanyError {
    /// Company not found.
    #[error("Company {0} not found")]
    NotFound(Uuid),

    /// Approval threshold must be non-negative.
    #[error("Approval threshold must be non-negative")]
    NegativeThreshold,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Input for updating a company.
#[derive(Debug, Clone, Default)]
pub struct UpdateCompanyInput {
    /// New name.
    pub name: Option<String>,
    /// New currency code.
    pub currency: Option<String>,
    /// New auto-approval threshold.
    pub approval_threshold: Option<Decimal>,
}

/// Company repository for tenant CRUD.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new company (tenant setup).
    ///
    /// # Errors
    ///
    /// Returns `CompanyError::NegativeThreshold` if the threshold is below zero.
    pub async fn create(
        &self,
        name: &str,
        currency: &str,
        approval_threshold: Decimal,
    ) -> Result<companies::Model, CompanyError> {
        if approval_threshold < Decimal::ZERO {
            return Err(CompanyError::NegativeThreshold);
        }

        let now = chrono::Utc::now().into();
        let company = companies::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            currency: Set(currency.to_uppercase()),
            approval_threshold: Set(approval_threshold),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = company.insert(&self.db).await?;
        Ok(created)
    }

    /// Finds a company by ID.
    ///
    /// # Errors
    ///
    /// Returns `CompanyError::NotFound` if the company does not exist.
    pub async fn get(&self, id: Uuid) -> Result<companies::Model, CompanyError> {
        companies::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(CompanyError::NotFound(id))
    }

    /// Updates company settings (admin operation).
    ///
    /// # Errors
    ///
    /// Returns `CompanyError::NotFound` if the company does not exist and
    /// `CompanyError::NegativeThreshold` for a threshold below zero.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCompanyInput,
    ) -> Result<companies::Model, CompanyError> {
        if let Some(threshold) = input.approval_threshold
            && threshold < Decimal::ZERO
        {
            return Err(CompanyError::NegativeThreshold);
        }

        let company = self.get(id).await?;

        let mut active: companies::ActiveModel = company.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(currency) = input.currency {
            active.currency = Set(currency.to_uppercase());
        }
        if let Some(threshold) = input.approval_threshold {
            active.approval_threshold = Set(threshold);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }
}
