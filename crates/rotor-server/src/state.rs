use rotor_core::parser::ConditionParser;
use rotor_core::Rotor;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub rotor: Arc<Rotor>,
    pub parser: Arc<dyn ConditionParser>,
}

impl AppState {
    pub fn new(rotor: Arc<Rotor>, parser: Arc<dyn ConditionParser>) -> Self {
        Self { rotor, parser }
    }
}
