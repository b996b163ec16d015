pub mod conditions;
pub mod config;
pub mod row;
pub mod serve;
