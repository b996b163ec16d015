pub mod condition;
pub mod config;
pub mod cursor;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod io;
pub mod parser;
pub mod registry;
pub mod rotor;
pub mod row;
pub mod snapshot;
pub mod value;

pub use error::{Result, RotorError};
pub use rotor::Rotor;
