pub mod conditions;
pub mod health;
pub mod row;
