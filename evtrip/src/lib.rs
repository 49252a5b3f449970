//! evtrip
//! Capa de orquestación del planificador de viajes para vehículos eléctricos:
//! datos de referencia, selección, llamadas a la API y pintado del resultado.

pub mod cities;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gateway;
pub mod geomap;
pub mod orchestrator;
pub mod render;
pub mod selection;
pub mod session;
pub mod types;

pub use config::AppCfg;
pub use error::PlannerError;
pub use gateway::{HttpGateway, TripApi};
pub use geomap::GeoJsonMap;
pub use orchestrator::{Event, Orchestrator, Phase, UserAction};
pub use session::Session;
