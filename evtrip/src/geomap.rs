//! geomap.rs
//!
//! Superficie de mapa en memoria que exporta sus capas a GeoJSON.
//!
//! - Dos capas (`Route`, `Stations`) con sus overlays en orden de inserción
//! - Marcadores como `Point`, líneas como `LineString`
//! - El encuadre se guarda y sale como `bbox` de la FeatureCollection
//! - La vista inicial (centro y zoom) sale siempre en el miembro `view`,
//!   para que el visor arranque sobre Francia antes del primer plan
//!
//! Sirve para cualquier visor web (Leaflet, MapLibre...) que lea GeoJSON.

use geo::Rect;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;
use std::collections::HashMap;

use crate::render::{Layer, MapSurface, Marker, Polyline};
use crate::types::Coordinates;

/// Vista inicial: Francia entera.
pub const INITIAL_CENTER: Coordinates = Coordinates { lat: 46.8, lon: 2.5 };
pub const INITIAL_ZOOM: u8 = 6;

#[derive(Clone, Debug, PartialEq)]
pub enum Overlay {
    Marker(Marker),
    Line(Polyline),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    pub bounds: Rect<f64>,
    pub padding_px: u32,
}

#[derive(Clone, Debug, Default)]
pub struct GeoJsonMap {
    layers: HashMap<Layer, Vec<Overlay>>,
    viewport: Option<Viewport>,
}

impl GeoJsonMap {
    pub fn new() -> Self { Self::default() }

    pub fn layer(&self, layer: Layer) -> &[Overlay] {
        self.layers.get(&layer).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn overlay_count(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    pub fn viewport(&self) -> Option<&Viewport> { self.viewport.as_ref() }

    pub fn initial_view(&self) -> (Coordinates, u8) { (INITIAL_CENTER, INITIAL_ZOOM) }

    pub fn to_feature_collection(&self) -> FeatureCollection {
        let mut features = Vec::new();
        for layer in [Layer::Route, Layer::Stations] {
            for ov in self.layer(layer) {
                features.push(feature(layer, ov));
            }
        }
        let bbox = self.viewport.as_ref().map(|v| {
            let (min, max) = (v.bounds.min(), v.bounds.max());
            vec![min.x, min.y, max.x, max.y]
        });
        let (center, zoom) = self.initial_view();
        let mut members = JsonObject::new();
        members.insert("view".into(), json!({ "center": position(center), "zoom": zoom }));
        FeatureCollection { bbox, features, foreign_members: Some(members) }
    }

    pub fn to_geojson_string(&self) -> String {
        serde_json::to_string(&self.to_feature_collection())
            .unwrap_or("{\"type\":\"FeatureCollection\",\"features\":[]}".into())
    }
}

fn position(c: Coordinates) -> Vec<f64> { vec![c.lon, c.lat] }

fn feature(layer: Layer, ov: &Overlay) -> Feature {
    let mut props = JsonObject::new();
    props.insert("layer".into(), json!(layer));
    let geometry = match ov {
        Overlay::Marker(m) => {
            props.insert("marker".into(), json!(m.kind));
            props.insert("label".into(), json!(m.label));
            props.insert("popup".into(), json!(m.popup));
            Geometry::new(Value::Point(position(m.position)))
        }
        Overlay::Line(l) => {
            props.insert("color".into(), json!(l.color));
            props.insert("weight".into(), json!(l.weight));
            props.insert("opacity".into(), json!(l.opacity));
            Geometry::new(Value::LineString(l.points.iter().copied().map(position).collect()))
        }
    };
    Feature { bbox: None, geometry: Some(geometry), id: None, properties: Some(props), foreign_members: None }
}

impl MapSurface for GeoJsonMap {
    fn clear_layer(&mut self, layer: Layer) {
        self.layers.remove(&layer);
    }

    fn add_marker(&mut self, layer: Layer, marker: Marker) {
        self.layers.entry(layer).or_default().push(Overlay::Marker(marker));
    }

    fn draw_line(&mut self, layer: Layer, line: Polyline) {
        self.layers.entry(layer).or_default().push(Overlay::Line(line));
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>, padding_px: u32) {
        self.viewport = Some(Viewport { bounds, padding_px });
    }
}
