//! error.rs
//! Taxonomía de errores del cliente. Ninguno es fatal: todos acaban como
//! mensaje transitorio en la interfaz.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// Fallo de transporte o de parseo en cualquiera de las tres llamadas.
    #[error("network error on {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    /// Detectado en local antes de llamar a la API.
    #[error("validation error: {0}")]
    Validation(String),

    /// El servidor respondió bien formado pero con `success: false`.
    #[error("planning failure: {0}")]
    PlanningFailure(String),
}

impl PlannerError {
    pub fn network(endpoint: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Network { endpoint: endpoint.into(), message: err.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
