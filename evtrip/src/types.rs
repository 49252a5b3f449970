//! types.rs
//! Modelos de datos compartidos: datos de referencia (ciudades, vehículos),
//! respuesta del planificador y cuerpos de las peticiones a la API

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(default)]
    pub population: u64,
}

impl City {
    /// Clave que espera `/api/plan-trip`: el nombre en minúsculas.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

fn default_seats() -> u32 { 5 }

/// Identificador de vehículo: el backend actual manda enteros, pero se
/// aceptan también cadenas.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VehicleId {
    Num(u64),
    Text(String),
}

impl From<u64> for VehicleId {
    fn from(n: u64) -> Self { VehicleId::Num(n) }
}

impl From<&str> for VehicleId {
    fn from(s: &str) -> Self { VehicleId::Text(s.to_string()) }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleId::Num(n) => write!(f, "{n}"),
            VehicleId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
    pub autonomy: f64,
    pub battery: f64,
    #[serde(rename = "chargeTime")]
    pub charge_time: f64,
    #[serde(default = "default_seats")]
    pub seats: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl From<Coordinates> for geo::Coord<f64> {
    fn from(c: Coordinates) -> Self {
        geo::Coord { x: c.lon, y: c.lat }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub city: String,
    pub coordinates: Coordinates,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripTime {
    pub driving: f64,
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charging: Option<f64>,
}

/// Potencia de una borne: el backend manda texto ("50 kW") o un número (kW).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Power {
    Kw(f64),
    Text(String),
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Power::Kw(kw) => write!(f, "{kw} kW"),
            Power::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChargingStation {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub power: Option<Power>,
    #[serde(default)]
    pub connector_type: Option<String>,
    pub distance_from_start: f64,
    pub lat: f64,
    pub lon: f64,
}

impl ChargingStation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates { lat: self.lat, lon: self.lon }
    }

    pub fn connector(&self) -> &str {
        self.connector_type.as_deref().unwrap_or("Type 2")
    }

    /// "N/A" cuando el backend no conoce la potencia.
    pub fn power_label(&self) -> String {
        self.power.as_ref().map_or_else(|| "N/A".to_string(), Power::to_string)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub distance: f64,
    #[serde(rename = "numberOfStops")]
    pub number_of_stops: u32,
    pub time: TripTime,
    pub departure: Endpoint,
    pub destination: Endpoint,
    #[serde(rename = "chargingStations", default)]
    pub charging_stations: Vec<ChargingStation>,
}

// ---- cuerpos de la API ----

#[derive(Clone, Debug, Deserialize)]
pub struct CitiesPayload { pub cities: Vec<City> }

#[derive(Clone, Debug, Deserialize)]
pub struct VehiclesPayload { pub vehicles: Vec<Vehicle> }

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlanRequest {
    pub vehicle_id: VehicleId,
    pub departure: String,
    pub destination: String,
}

/// Respuesta cruda de `/api/plan-trip`. Los errores 4xx/5xx del backend
/// llegan sin `success`, solo con `error`.
#[derive(Clone, Debug, Deserialize)]
pub struct PlanReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub trip: Option<TripPlan>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Resultado lógico de una planificación que llegó bien por la red.
#[derive(Clone, Debug, PartialEq)]
pub enum PlanOutcome {
    Planned(TripPlan),
    Rejected(String),
}
