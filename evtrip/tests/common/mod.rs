#![allow(dead_code)]

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const NO_RANGE: &str = "Aucun véhicule ne peut effectuer ce trajet";

pub fn paris_lyon_trip() -> Value {
    json!({
        "distance": 450,
        "numberOfStops": 1,
        "time": {"driving": 5, "total": 6},
        "chargingStations": [
            {"name": "Station A", "power": "50kW", "distance_from_start": 200, "lat": 46, "lon": 3}
        ],
        "departure": {"city": "Paris", "coordinates": {"lat": 48.85, "lon": 2.35}},
        "destination": {"city": "Lyon", "coordinates": {"lat": 45.75, "lon": 4.85}}
    })
}

/// API falsa con las tres rutas. Devuelve la base y el contador de POST /api/plan-trip.
pub async fn spawn_mock_api() -> (String, Arc<AtomicUsize>) {
    let plan_calls = Arc::new(AtomicUsize::new(0));
    let counter = plan_calls.clone();

    let app = Router::new()
        .route(
            "/api/cities",
            get(|| async {
                Json(json!({
                    "success": true,
                    "cities": [
                        {"name": "Paris", "key": "paris", "population": 2148000},
                        {"name": "Lyon", "key": "lyon", "population": 513000},
                        {"name": "Nice", "population": 340017},
                        {"name": "Lille", "population": 232787},
                        {"name": "Brest", "population": 139000},
                        {"name": "Vienne", "population": 30000}
                    ]
                }))
            }),
        )
        .route(
            "/api/vehicles",
            get(|| async {
                Json(json!({
                    "success": true,
                    "vehicles": [
                        {"id": 1, "name": "Tesla Model 3 Long Range", "autonomy": 580, "battery": 75, "chargeTime": 0.5, "seats": 5},
                        {"id": 7, "name": "BMW i3 120Ah", "autonomy": 310, "battery": 42, "chargeTime": 0.85}
                    ]
                }))
            }),
        )
        .route(
            "/api/plan-trip",
            post(move |Json(body): Json<Value>| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    plan_reply(&body)
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), plan_calls)
}

fn plan_reply(body: &Value) -> axum::response::Response {
    match body["destination"].as_str().unwrap_or_default() {
        "lyon" => Json(json!({"success": true, "trip": paris_lyon_trip()})).into_response(),
        "nice" => Json(json!({"success": false, "error": NO_RANGE})).into_response(),
        "brest" => (StatusCode::NOT_FOUND, Json(json!({"error": "Ville non trouvée"}))).into_response(),
        _ => (StatusCode::OK, "<html>oops</html>").into_response(),
    }
}

/// Base que no escucha: cualquier llamada falla en transporte.
pub async fn dead_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
