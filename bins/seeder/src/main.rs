//! Database seeder for Expenza development and testing.
//!
//! Seeds a demo company, its users, the two canonical approval rules, and
//! a spread of expenses across categories and statuses.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use expenza_core::auth::hash_password;
use expenza_db::entities::{approval_rules, companies, expenses, sea_orm_active_enums, users};

/// Demo company ID (consistent for all seeds)
const DEMO_COMPANY_ID: &str = "00000000-0000-0000-0000-000000000001";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = expenza_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Clearing existing data...");
    clear_all(&db).await;

    println!("Seeding company...");
    let company_id = seed_company(&db).await;

    println!("Seeding users...");
    let people = seed_users(&db, company_id).await;

    println!("Seeding approval rules...");
    seed_rules(&db, company_id).await;

    println!("Seeding expenses...");
    seed_expenses(&db, company_id, &people).await;

    println!("Seeding complete!");
}

fn demo_company_id() -> Uuid {
    Uuid::parse_str(DEMO_COMPANY_ID).unwrap()
}

struct People {
    admin: Uuid,
    manager: Uuid,
    employees: Vec<Uuid>,
}

async fn clear_all(db: &DatabaseConnection) {
    expenses::Entity::delete_many()
        .exec(db)
        .await
        .expect("Failed to clear expenses");
    approval_rules::Entity::delete_many()
        .exec(db)
        .await
        .expect("Failed to clear approval rules");
    users::Entity::delete_many()
        .exec(db)
        .await
        .expect("Failed to clear users");
    companies::Entity::delete_many()
        .exec(db)
        .await
        .expect("Failed to clear companies");
}

async fn seed_company(db: &DatabaseConnection) -> Uuid {
    let now = Utc::now().into();
    let company_id = demo_company_id();

    companies::ActiveModel {
        id: Set(company_id),
        name: Set("TechCorp Solutions".to_string()),
        currency: Set("USD".to_string()),
        approval_threshold: Set(Decimal::new(1000, 0)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert company");

    company_id
}

async fn seed_users(db: &DatabaseConnection, company_id: Uuid) -> People {
    let now = Utc::now().into();

    let admin = insert_user(
        db,
        company_id,
        "admin@techcorp.com",
        "admin123",
        "John Admin",
        sea_orm_active_enums::UserRole::Admin,
        None,
        now,
    )
    .await;

    let manager = insert_user(
        db,
        company_id,
        "sarah.manager@techcorp.com",
        "manager123",
        "Sarah Manager",
        sea_orm_active_enums::UserRole::Manager,
        None,
        now,
    )
    .await;

    let second_manager = insert_user(
        db,
        company_id,
        "mike.manager@techcorp.com",
        "manager123",
        "Mike Manager",
        sea_orm_active_enums::UserRole::Manager,
        None,
        now,
    )
    .await;

    let mut employees = Vec::new();
    for (email, name, boss) in [
        ("alice@techcorp.com", "Alice Chen", manager),
        ("bob@techcorp.com", "Bob Martinez", manager),
        ("carol@techcorp.com", "Carol White", second_manager),
    ] {
        let id = insert_user(
            db,
            company_id,
            email,
            "employee123",
            name,
            sea_orm_active_enums::UserRole::Employee,
            Some(boss),
            now,
        )
        .await;
        employees.push(id);
    }

    People {
        admin,
        manager,
        employees,
    }
}

#[allow(clippy::too_many_arguments)]
async fn insert_user(
    db: &DatabaseConnection,
    company_id: Uuid,
    email: &str,
    password: &str,
    name: &str,
    role: sea_orm_active_enums::UserRole,
    manager_id: Option<Uuid>,
    now: sea_orm::prelude::DateTimeWithTimeZone,
) -> Uuid {
    let id = Uuid::new_v4();
    users::ActiveModel {
        id: Set(id),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password).expect("Failed to hash password")),
        name: Set(name.to_string()),
        role: Set(role),
        company_id: Set(company_id),
        manager_id: Set(manager_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert user");
    id
}

async fn seed_rules(db: &DatabaseConnection, company_id: Uuid) {
    let now = Utc::now().into();

    approval_rules::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        name: Set("Large expenses need a manager".to_string()),
        condition: Set(sea_orm_active_enums::RuleCondition::Amount),
        amount_value: Set(Some(Decimal::new(500, 0))),
        category_value: Set(None),
        approver_role: Set(sea_orm_active_enums::UserRole::Manager),
        enabled: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert amount rule");

    approval_rules::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        name: Set("Travel goes to an admin".to_string()),
        condition: Set(sea_orm_active_enums::RuleCondition::Category),
        amount_value: Set(None),
        category_value: Set(Some(sea_orm_active_enums::ExpenseCategory::Travel)),
        approver_role: Set(sea_orm_active_enums::UserRole::Admin),
        enabled: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("Failed to insert category rule");
}

async fn seed_expenses(db: &DatabaseConnection, company_id: Uuid, people: &People) {
    // (amount, category, merchant, description, resolution)
    let rows: [(
        i64,
        sea_orm_active_enums::ExpenseCategory,
        &str,
        &str,
        Resolution,
    ); 8] = [
        (
            4250,
            sea_orm_active_enums::ExpenseCategory::Meals,
            "Starbucks",
            "Coffee with client",
            Resolution::AutoApproved,
        ),
        (
            162000,
            sea_orm_active_enums::ExpenseCategory::Meals,
            "Some Bistro",
            "Team dinner",
            Resolution::Pending,
        ),
        (
            145000,
            sea_orm_active_enums::ExpenseCategory::Travel,
            "Delta Airlines",
            "Flight to conference",
            Resolution::Pending,
        ),
        (
            38500,
            sea_orm_active_enums::ExpenseCategory::Office,
            "Office Depot",
            "Office supplies for project",
            Resolution::AutoApproved,
        ),
        (
            210000,
            sea_orm_active_enums::ExpenseCategory::Equipment,
            "Apple Store",
            "Replacement laptop",
            Resolution::Approved(people.admin),
        ),
        (
            198000,
            sea_orm_active_enums::ExpenseCategory::Travel,
            "Hilton Hotels",
            "Hotel accommodation",
            Resolution::Rejected(people.admin, "Book through the travel portal"),
        ),
        (
            132050,
            sea_orm_active_enums::ExpenseCategory::Other,
            "Adobe",
            "Software license renewal",
            Resolution::Approved(people.manager),
        ),
        (
            7600,
            sea_orm_active_enums::ExpenseCategory::Meals,
            "McDonald's",
            "Working lunch",
            Resolution::AutoApproved,
        ),
    ];

    for (i, (cents, category, merchant, description, resolution)) in rows.into_iter().enumerate() {
        let submitter = people.employees[i % people.employees.len()];
        let submitted_at = Utc::now() - Duration::days(i as i64);
        let now: sea_orm::prelude::DateTimeWithTimeZone = submitted_at.into();

        let (status, approved_by, approved_at, rejection_reason) = match resolution {
            Resolution::Pending => (
                sea_orm_active_enums::ExpenseStatus::Pending,
                None,
                None,
                None,
            ),
            Resolution::AutoApproved => (
                sea_orm_active_enums::ExpenseStatus::Approved,
                Some(submitter),
                Some(now),
                None,
            ),
            Resolution::Approved(by) => (
                sea_orm_active_enums::ExpenseStatus::Approved,
                Some(by),
                Some(now),
                None,
            ),
            Resolution::Rejected(by, reason) => (
                sea_orm_active_enums::ExpenseStatus::Rejected,
                Some(by),
                Some(now),
                Some(reason.to_string()),
            ),
        };

        expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(submitter),
            company_id: Set(company_id),
            amount: Set(Decimal::new(cents, 2)),
            currency: Set("USD".to_string()),
            category: Set(category),
            description: Set(description.to_string()),
            merchant: Set(merchant.to_string()),
            date: Set(submitted_at.date_naive()),
            status: Set(status),
            receipt_url: Set(None),
            receipt_name: Set(None),
            submitted_at: Set(now),
            approved_by: Set(approved_by),
            approved_at: Set(approved_at),
            rejection_reason: Set(rejection_reason),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .expect("Failed to insert expense");
    }
}

enum Resolution {
    Pending,
    AutoApproved,
    Approved(Uuid),
    Rejected(Uuid, &'static str),
}
