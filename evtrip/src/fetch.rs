//! fetch.rs
//! Peticiones JSON de bajo nivel sobre `reqwest`. Sin reintentos: el primer
//! fallo sube tal cual al llamador.

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::{PlannerError, Result};

/// GET que exige un 2xx y un cuerpo JSON con la forma `T`.
pub async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    let resp = client.get(url).send().await.map_err(|e| PlannerError::network(url, e))?;
    match resp.status() {
        s if s.is_success() => {
            let bytes = resp.bytes().await.map_err(|e| PlannerError::network(url, e))?;
            serde_json::from_slice(&bytes).map_err(|e| PlannerError::network(url, e))
        }
        s => Err(PlannerError::network(url, format!("HTTP {s}"))),
    }
}

/// POST JSON. Devuelve el status junto al cuerpo ya parseado: el backend
/// manda cuerpos útiles también en 4xx/5xx.
pub async fn post_json<B, T>(client: &Client, url: &str, body: &B) -> Result<(StatusCode, T)>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let resp = client.post(url).json(body).send().await.map_err(|e| PlannerError::network(url, e))?;
    let status = resp.status();
    let bytes = resp.bytes().await.map_err(|e| PlannerError::network(url, e))?;
    debug!("POST {url} -> {status} ({} bytes)", bytes.len());
    let parsed = serde_json::from_slice(&bytes)
        .map_err(|e| PlannerError::network(url, format!("HTTP {status}: {e}")))?;
    Ok((status, parsed))
}
