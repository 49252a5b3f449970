//! render.rs
//!
//! Pinta un `TripPlan`: resumen textual y capas del mapa.
//!
//! - `render_summary()` construye el resumen (distancia, paradas, tiempos y
//!   lista de estaciones o aviso de "sin recarga")
//! - `render_map()` limpia las dos capas y las reconstruye entera:
//!   salida, llegada, línea, estaciones y encuadre, en ese orden para que
//!   los marcadores queden por encima de la línea
//!
//! El mapa es un colaborador externo: cualquier widget que implemente
//! `MapSurface` sirve.

use geo::Rect;
use serde::Serialize;
use std::fmt;

use crate::types::{Coordinates, TripPlan};

pub const NO_CHARGING_NOTICE: &str = "✅ Votre véhicule peut effectuer ce trajet sans recharge.";
pub const FIT_PADDING_PX: u32 = 50;
pub const ROUTE_COLOR: &str = "#667eea";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Línea y marcadores de salida/llegada
    Route,
    /// Marcadores de estaciones de recarga
    Stations,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "seq")]
pub enum MarkerKind {
    Start,
    End,
    /// Posición 1-based en la secuencia de paradas
    Station(usize),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: Coordinates,
    pub label: String,
    pub popup: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Polyline {
    pub points: Vec<Coordinates>,
    pub color: String,
    pub weight: f32,
    pub opacity: f32,
}

/// Interfaz mínima del mapa.
pub trait MapSurface {
    fn clear_layer(&mut self, layer: Layer);
    fn add_marker(&mut self, layer: Layer, marker: Marker);
    fn draw_line(&mut self, layer: Layer, line: Polyline);
    fn fit_bounds(&mut self, bounds: Rect<f64>, padding_px: u32);
}

pub fn render_map(trip: &TripPlan, map: &mut dyn MapSurface) {
    map.clear_layer(Layer::Route);
    map.clear_layer(Layer::Stations);

    let dep = trip.departure.coordinates;
    let dest = trip.destination.coordinates;

    map.add_marker(Layer::Route, Marker {
        kind: MarkerKind::Start,
        position: dep,
        label: "🏁 Départ".into(),
        popup: format!("{}\nPoint de départ", trip.departure.city),
    });
    map.add_marker(Layer::Route, Marker {
        kind: MarkerKind::End,
        position: dest,
        label: "🎯 Arrivée".into(),
        popup: format!("{}\nDestination", trip.destination.city),
    });

    // Línea recta: la API no devuelve la geometría real
    map.draw_line(Layer::Route, Polyline {
        points: vec![dep, dest],
        color: ROUTE_COLOR.into(),
        weight: 4.0,
        opacity: 0.7,
    });

    for (i, s) in trip.charging_stations.iter().enumerate() {
        let seq = i + 1;
        map.add_marker(Layer::Stations, Marker {
            kind: MarkerKind::Station(seq),
            position: s.coordinates(),
            label: format!("⚡ Station {seq}"),
            popup: format!(
                "{}\n{}\nPuissance: {}\nDistance du départ: {} km",
                s.name,
                s.address.as_deref().unwrap_or(""),
                s.power_label(),
                s.distance_from_start
            ),
        });
    }

    map.fit_bounds(Rect::new(dep, dest), FIT_PADDING_PX);
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StationEntry {
    pub name: String,
    pub address: String,
    pub city: String,
    pub power: String,
    pub connector: String,
    pub distance_from_start: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stations {
    List(Vec<StationEntry>),
    NoChargingNeeded,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TripSummary {
    pub distance_km: f64,
    pub stops: u32,
    pub driving_h: f64,
    pub total_h: f64,
    pub charging_h: Option<f64>,
    pub stations: Stations,
}

pub fn render_summary(trip: &TripPlan) -> TripSummary {
    let stations = if trip.charging_stations.is_empty() {
        Stations::NoChargingNeeded
    } else {
        Stations::List(
            trip.charging_stations
                .iter()
                .map(|s| StationEntry {
                    name: s.name.clone(),
                    address: s.address.clone().unwrap_or_default(),
                    city: s.city.clone().unwrap_or_default(),
                    power: s.power_label(),
                    connector: s.connector().to_string(),
                    distance_from_start: s.distance_from_start,
                })
                .collect(),
        )
    };
    TripSummary {
        distance_km: trip.distance,
        stops: trip.number_of_stops,
        driving_h: trip.time.driving,
        total_h: trip.time.total,
        charging_h: trip.time.charging,
        stations,
    }
}

impl fmt::Display for TripSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 Résumé du trajet")?;
        writeln!(f, "{} km | {} arrêt(s) | {} h conduite | {} h total", self.distance_km, self.stops, self.driving_h, self.total_h)?;
        if let Some(c) = self.charging_h {
            writeln!(f, "{c} h recharge")?;
        }
        match &self.stations {
            Stations::NoChargingNeeded => writeln!(f, "{NO_CHARGING_NOTICE}"),
            Stations::List(list) => {
                writeln!(f, "⚡ Stations de recharge")?;
                for s in list {
                    writeln!(f, "📍 {}", s.name)?;
                    writeln!(f, "   {}", s.address)?;
                    writeln!(f, "   {}", s.city)?;
                    writeln!(f, "   ⚡ Puissance: {} | 🔌 {} | 📏 À {} km", s.power, s.connector, s.distance_from_start)?;
                }
                Ok(())
            }
        }
    }
}
