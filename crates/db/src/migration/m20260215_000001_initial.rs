//! Initial database migration.
//!
//! Creates the tenant, identity, rule, and expense tables along with
//! their CHECK constraints, indexes, and the `updated_at` trigger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: CORE TABLES
        // ============================================================
        db.execute_unprepared(COMPANIES_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 2: APPROVAL WORKFLOW
        // ============================================================
        db.execute_unprepared(APPROVAL_RULES_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;

        // ============================================================
        // PART 3: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    currency VARCHAR(3) NOT NULL DEFAULT 'USD',
    approval_threshold DECIMAL(15, 2) NOT NULL DEFAULT 1000
        CHECK (approval_threshold >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR(255) NOT NULL,
    password_hash VARCHAR(255) NOT NULL,
    name VARCHAR(255) NOT NULL,
    role VARCHAR(20) NOT NULL
        CHECK (role IN ('admin', 'manager', 'employee')),
    company_id UUID NOT NULL REFERENCES companies(id),
    manager_id UUID REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Emails are unique case-insensitively
CREATE UNIQUE INDEX idx_users_email_lower ON users (LOWER(email));
CREATE INDEX idx_users_company ON users (company_id);
CREATE INDEX idx_users_role ON users (role);
";

const APPROVAL_RULES_SQL: &str = r"
CREATE TABLE approval_rules (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL REFERENCES companies(id),
    name VARCHAR(255) NOT NULL,
    condition VARCHAR(20) NOT NULL
        CHECK (condition IN ('amount', 'category')),
    amount_value DECIMAL(15, 2)
        CHECK (amount_value IS NULL OR amount_value > 0),
    category_value VARCHAR(20)
        CHECK (category_value IS NULL OR category_value IN
            ('travel', 'meals', 'office', 'equipment', 'other')),
    approver_role VARCHAR(20) NOT NULL
        CHECK (approver_role IN ('admin', 'manager')),
    enabled BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- The rule value is tagged: exactly the field matching the condition is set
    CONSTRAINT chk_rule_value_tagged CHECK (
        (condition = 'amount' AND amount_value IS NOT NULL AND category_value IS NULL)
        OR
        (condition = 'category' AND category_value IS NOT NULL AND amount_value IS NULL)
    )
);

CREATE INDEX idx_approval_rules_company ON approval_rules (company_id);
CREATE INDEX idx_approval_rules_enabled ON approval_rules (enabled);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id),
    company_id UUID NOT NULL REFERENCES companies(id),
    amount DECIMAL(15, 2) NOT NULL CHECK (amount > 0),
    currency VARCHAR(3) NOT NULL DEFAULT 'USD',
    category VARCHAR(20) NOT NULL
        CHECK (category IN ('travel', 'meals', 'office', 'equipment', 'other')),
    description TEXT NOT NULL,
    merchant VARCHAR(255) NOT NULL,
    date DATE NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'pending'
        CHECK (status IN ('draft', 'pending', 'approved', 'rejected')),
    receipt_url TEXT,
    receipt_name VARCHAR(255),
    submitted_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    approved_by UUID REFERENCES users(id),
    approved_at TIMESTAMPTZ,
    rejection_reason TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- Resolution audit fields are present exactly on resolved expenses
    CONSTRAINT chk_resolution_audit CHECK (
        (status IN ('approved', 'rejected')
            AND approved_by IS NOT NULL AND approved_at IS NOT NULL)
        OR
        (status IN ('draft', 'pending')
            AND approved_by IS NULL AND approved_at IS NULL)
    ),

    -- A rejection reason is present exactly on rejected expenses
    CONSTRAINT chk_rejection_reason CHECK (
        (status = 'rejected' AND rejection_reason IS NOT NULL)
        OR
        (status <> 'rejected' AND rejection_reason IS NULL)
    )
);

CREATE INDEX idx_expenses_user ON expenses (user_id);
CREATE INDEX idx_expenses_company ON expenses (company_id);
CREATE INDEX idx_expenses_status ON expenses (status);
CREATE INDEX idx_expenses_category ON expenses (category);
CREATE INDEX idx_expenses_submitted_at ON expenses (submitted_at DESC);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_companies_updated_at
    BEFORE UPDATE ON companies
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_users_updated_at
    BEFORE UPDATE ON users
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_approval_rules_updated_at
    BEFORE UPDATE ON approval_rules
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_expenses_updated_at
    BEFORE UPDATE ON expenses
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS approval_rules CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TABLE IF EXISTS companies CASCADE;
DROP FUNCTION IF EXISTS set_updated_at() CASCADE;
";
