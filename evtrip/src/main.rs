//! main.rs — Sesión sin navegador: acciones del usuario en JSON por stdin
//! (una por línea), resumen del viaje por stdout y capas del mapa en GeoJSON

use anyhow::Result;
use futures::stream;
use std::env;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn, Level};

use evtrip::{AppCfg, GeoJsonMap, HttpGateway, Orchestrator, Session, UserAction};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs a stderr, stdout queda para el resumen
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let cfg = app_cfg_from_env();
    info!("API en {}", cfg.api_url);

    let gateway = HttpGateway::from_cfg(&cfg)?;
    let orch = Orchestrator::new(&cfg, GeoJsonMap::new());
    let mut session = Session::new(&gateway, orch);

    // Mapa vacío con la vista inicial, antes del primer plan
    if let Some(path) = &cfg.map_out {
        if let Err(e) = std::fs::write(path, session.orchestrator().map().to_geojson_string()) {
            warn!("mapa {path}: {e}");
        }
    }

    let lines = BufReader::new(tokio::io::stdin()).lines();
    let actions = Box::pin(stream::unfold(lines, |mut lines| async move {
        loop {
            match lines.next_line().await {
                Ok(Some(l)) if l.trim().is_empty() => continue,
                Ok(Some(l)) => match serde_json::from_str::<UserAction>(&l) {
                    Ok(a) => return Some((a, lines)),
                    Err(e) => warn!("acción inválida {l:?}: {e}"),
                },
                Ok(None) => return None,
                Err(e) => {
                    warn!("stdin: {e}");
                    return None;
                }
            }
        }
    }));

    let mut printed_plans = 0;
    let mut last_error = 0;
    session
        .run(actions, |o| {
            let ui = o.ui();
            if let Some(err) = ui.error.as_ref().filter(|e| e.generation != last_error) {
                last_error = err.generation;
                eprintln!("⚠️  {}", err.message);
            }
            if o.plans_rendered() != printed_plans {
                printed_plans = o.plans_rendered();
                if let Some(summary) = &ui.results {
                    println!("{summary}");
                }
                if let Some(path) = &cfg.map_out {
                    match std::fs::write(path, o.map().to_geojson_string()) {
                        Ok(()) => info!("mapa escrito en {path}"),
                        Err(e) => warn!("mapa {path}: {e}"),
                    }
                }
            }
            debug!("fase {:?}, ui {}", o.phase(), serde_json::to_string(ui).unwrap_or_default());
        })
        .await;

    info!("sesión terminada");
    Ok(())
}

fn app_cfg_from_env() -> AppCfg {
    let mut c = AppCfg::default();
    if let Ok(v) = env::var("EV_API_URL") { c.api_url = v; }
    if let Ok(v) = env::var("EV_HTTP_TIMEOUT_S") { c.http_timeout_s = v.parse().unwrap_or(c.http_timeout_s); }
    if let Ok(v) = env::var("EV_ERROR_TTL_MS") { c.error_ttl_ms = v.parse().unwrap_or(c.error_ttl_ms); }
    if let Ok(v) = env::var("EV_MIN_POPULATION") { c.min_population = v.parse().unwrap_or(c.min_population); }
    if let Ok(v) = env::var("EV_MAP_OUT") { c.map_out = Some(v); }
    c
}
