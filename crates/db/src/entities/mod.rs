//! `SeaORM` entity definitions.

pub mod approval_rules;
pub mod companies;
pub mod expenses;
pub mod sea_orm_active_enums;
pub mod users;
