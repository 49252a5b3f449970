//! gateway.rs
//!
//! Pasarela hacia la API remota del planificador.
//!
//! - `GET /api/cities`, `GET /api/vehicles` y `POST /api/plan-trip`
//! - Un único viaje de ida y vuelta por operación, sin reintentos
//! - En `plan_trip` se separan dos niveles de fallo: transporte/parseo
//!   (`PlannerError::Network`) y rechazo lógico del servidor
//!   (`PlanOutcome::Rejected`, con el mensaje tal cual)

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use crate::config::AppCfg;
use crate::error::{PlannerError, Result};
use crate::fetch;
use crate::types::{City, CitiesPayload, PlanOutcome, PlanReply, PlanRequest, Vehicle, VehiclesPayload};

/// Mensaje cuando el servidor rechaza sin explicar por qué.
pub const DEFAULT_PLAN_ERROR: &str = "Erreur lors de la planification";

#[async_trait]
pub trait TripApi: Send + Sync {
    async fn fetch_cities(&self) -> Result<Vec<City>>;
    async fn fetch_vehicles(&self) -> Result<Vec<Vehicle>>;
    async fn plan_trip(&self, req: &PlanRequest) -> Result<PlanOutcome>;
}

#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base: String,
}

impl HttpGateway {
    pub fn new(client: Client, base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { client, base }
    }

    /// Cliente con compresión y el timeout de transporte de la config.
    pub fn from_cfg(cfg: &AppCfg) -> Result<Self> {
        let client = Client::builder()
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(cfg.http_timeout())
            .build()
            .map_err(|e| PlannerError::network(&cfg.api_url, e))?;
        Ok(Self::new(client, cfg.api_url.clone()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

#[async_trait]
impl TripApi for HttpGateway {
    async fn fetch_cities(&self) -> Result<Vec<City>> {
        let payload: CitiesPayload = fetch::get_json(&self.client, &self.url("/api/cities")).await?;
        info!("{} ciudades recibidas", payload.cities.len());
        Ok(payload.cities)
    }

    async fn fetch_vehicles(&self) -> Result<Vec<Vehicle>> {
        let payload: VehiclesPayload = fetch::get_json(&self.client, &self.url("/api/vehicles")).await?;
        info!("{} vehículos recibidos", payload.vehicles.len());
        Ok(payload.vehicles)
    }

    async fn plan_trip(&self, req: &PlanRequest) -> Result<PlanOutcome> {
        let url = self.url("/api/plan-trip");
        let (status, reply): (_, PlanReply) = fetch::post_json(&self.client, &url, req).await?;
        let outcome = outcome_from_reply(reply).map_err(|e| PlannerError::network(&url, e))?;
        if let PlanOutcome::Rejected(msg) = &outcome {
            warn!("plan rechazado ({status}): {msg}");
        }
        Ok(outcome)
    }
}

/// `success:true` sin `trip` se trata como respuesta mal formada.
pub fn outcome_from_reply(reply: PlanReply) -> std::result::Result<PlanOutcome, &'static str> {
    match (reply.success, reply.trip) {
        (true, Some(trip)) => Ok(PlanOutcome::Planned(trip)),
        (true, None) => Err("success sin trip"),
        (false, _) => Ok(PlanOutcome::Rejected(
            reply.error.filter(|e| !e.is_empty()).unwrap_or_else(|| DEFAULT_PLAN_ERROR.to_string()),
        )),
    }
}
