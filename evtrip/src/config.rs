//! config.rs
//! Configuración del cliente. Los valores por defecto se pueden pisar con
//! variables de entorno desde `main.rs`.

use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppCfg {
    /// Base de la API (equivale al origin de la página)
    pub api_url: String,

    /// Timeout del transporte HTTP (segundos). No hay otro timeout.
    pub http_timeout_s: u64,

    /// Vida de un mensaje de error en pantalla (ms)
    pub error_ttl_ms: u64,

    /// Umbral de población para el listado por defecto de ciudades
    pub min_population: u64,

    /// Fichero GeoJSON donde volcar las capas del mapa tras cada plan (opcional)
    pub map_out: Option<String>,
}

impl AppCfg {
    pub fn error_ttl(&self) -> Duration { Duration::from_millis(self.error_ttl_ms) }
    pub fn http_timeout(&self) -> Duration { Duration::from_secs(self.http_timeout_s) }
}

impl Default for AppCfg {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".into(),
            http_timeout_s: 30,
            error_ttl_ms: 5000,
            min_population: 100_000,
            map_out: None,
        }
    }
}
