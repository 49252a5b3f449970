//! orchestrator.rs
//!
//! Máquina de estados del cliente.
//!
//! Fases: `Idle -> LoadingReference -> Ready -> Planning -> Ready`.
//!
//! - `handle()` es la única función de transición: recibe un `Event`
//!   (acción del usuario o fin de una llamada remota) y devuelve los
//!   `Command` que el driver (`session.rs`) tiene que ejecutar
//! - Las dos cargas de referencia van en paralelo; cada una desbloquea
//!   solo su widget, y si falla lo sustituye por un aviso
//! - Solo hay un plan en vuelo: el botón está deshabilitado toda la fase
//!   `Planning`; cualquier salida de esa fase restaura la etiqueta y lo
//!   rehabilita si el formulario sigue completo
//! - Los errores se borran solos tras `error_ttl`; un error nuevo sustituye
//!   al anterior (gana el último)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cities::CityDirectory;
use crate::config::AppCfg;
use crate::error::{PlannerError, Result};
use crate::render::{render_map, render_summary, MapSurface, TripSummary};
use crate::selection::Selection;
use crate::types::{City, PlanOutcome, PlanRequest, Vehicle, VehicleId};

pub const SUBMIT_LABEL: &str = "🗺️ Planifier le voyage";
pub const PENDING_LABEL: &str = "⏳ Calcul en cours...";
pub const CITIES_LOAD_ERROR: &str = "Erreur lors du chargement des villes";
pub const VEHICLES_LOAD_ERROR: &str = "Erreur lors du chargement des véhicules";
pub const CONNECTION_ERROR: &str = "Erreur de connexion au serveur";
pub const CITIES_UNAVAILABLE: &str = "Impossible de charger les villes";
pub const VEHICLES_UNAVAILABLE: &str = "Impossible de charger les véhicules";
pub const NO_VEHICLES: &str = "Aucun véhicule disponible";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    LoadingReference,
    Ready,
    Planning,
}

/// Acciones del usuario. Es lo que antes eran callbacks del DOM.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UserAction {
    SearchDeparture { text: String },
    SearchDestination { text: String },
    SelectDeparture { #[serde(default)] key: Option<String> },
    SelectDestination { #[serde(default)] key: Option<String> },
    SelectVehicle { id: VehicleId },
    Submit,
}

#[derive(Debug)]
pub enum Event {
    Start,
    User(UserAction),
    CitiesLoaded(Result<CityDirectory>),
    VehiclesLoaded(Result<Vec<Vehicle>>),
    PlanCompleted(Result<PlanOutcome>),
    ErrorExpired(u64),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    LoadCities,
    LoadVehicles,
    PlanTrip(PlanRequest),
    ClearErrorAfter { generation: u64, after: Duration },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "content")]
pub enum Widget<T> {
    Loading,
    Items(T),
    Empty(String),
    Unavailable(String),
}

impl<T> Widget<T> {
    pub fn items(&self) -> Option<&T> {
        match self {
            Widget::Items(t) => Some(t),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CityOption {
    pub key: String,
    pub label: String,
}

impl From<&City> for CityOption {
    fn from(c: &City) -> Self {
        Self { key: c.key(), label: c.name.clone() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VehicleCard {
    pub id: VehicleId,
    pub name: String,
    pub autonomy_km: f64,
    pub battery_kwh: f64,
    pub charge_time_h: f64,
    pub seats: u32,
    pub selected: bool,
}

impl From<&Vehicle> for VehicleCard {
    fn from(v: &Vehicle) -> Self {
        Self {
            id: v.id.clone(),
            name: v.name.clone(),
            autonomy_km: v.autonomy,
            battery_kwh: v.battery,
            charge_time_h: v.charge_time,
            seats: v.seats,
            selected: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubmitControl {
    pub enabled: bool,
    pub label: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Network,
    Validation,
    PlanningFailure,
}

impl From<&PlannerError> for ErrorKind {
    fn from(e: &PlannerError) -> Self {
        match e {
            PlannerError::Network { .. } => ErrorKind::Network,
            PlannerError::Validation(_) => ErrorKind::Validation,
            PlannerError::PlanningFailure(_) => ErrorKind::PlanningFailure,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorBanner {
    pub kind: ErrorKind,
    pub message: String,
    pub generation: u64,
}

/// Lo que ve el usuario.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UiState {
    pub departure: Widget<Vec<CityOption>>,
    pub destination: Widget<Vec<CityOption>>,
    pub vehicles: Widget<Vec<VehicleCard>>,
    pub submit: SubmitControl,
    pub error: Option<ErrorBanner>,
    pub results: Option<TripSummary>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            departure: Widget::Loading,
            destination: Widget::Loading,
            vehicles: Widget::Loading,
            submit: SubmitControl { enabled: false, label: SUBMIT_LABEL.into() },
            error: None,
            results: None,
        }
    }
}

/// Estado de la aplicación: datos de referencia y selección.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub directory: Option<CityDirectory>,
    pub vehicles: Vec<Vehicle>,
    pub selection: Selection,
    pending_loads: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Departure,
    Destination,
}

pub struct Orchestrator<M: MapSurface> {
    phase: Phase,
    state: AppState,
    ui: UiState,
    map: M,
    min_population: u64,
    error_ttl: Duration,
    error_gen: u64,
    plans_rendered: u64,
}

impl<M: MapSurface> Orchestrator<M> {
    pub fn new(cfg: &AppCfg, map: M) -> Self {
        Self {
            phase: Phase::Idle,
            state: AppState::default(),
            ui: UiState::default(),
            map,
            min_population: cfg.min_population,
            error_ttl: cfg.error_ttl(),
            error_gen: 0,
            plans_rendered: 0,
        }
    }

    pub fn phase(&self) -> Phase { self.phase }
    pub fn ui(&self) -> &UiState { &self.ui }
    pub fn state(&self) -> &AppState { &self.state }
    pub fn map(&self) -> &M { &self.map }
    pub fn plans_rendered(&self) -> u64 { self.plans_rendered }

    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::Start => self.start(),
            Event::User(action) => self.on_action(action),
            Event::CitiesLoaded(res) => self.on_cities(res),
            Event::VehiclesLoaded(res) => self.on_vehicles(res),
            Event::PlanCompleted(res) => self.on_plan(res),
            Event::ErrorExpired(generation) => {
                if self.ui.error.as_ref().is_some_and(|e| e.generation == generation) {
                    self.ui.error = None;
                }
                vec![]
            }
        }
    }

    fn start(&mut self) -> Vec<Command> {
        if self.phase != Phase::Idle {
            debug!("start ignorado en fase {:?}", self.phase);
            return vec![];
        }
        self.phase = Phase::LoadingReference;
        self.state.pending_loads = 2;
        info!("cargando ciudades y vehículos");
        vec![Command::LoadCities, Command::LoadVehicles]
    }

    fn reference_done(&mut self) {
        self.state.pending_loads = self.state.pending_loads.saturating_sub(1);
        if self.state.pending_loads == 0 && self.phase == Phase::LoadingReference {
            self.phase = Phase::Ready;
            info!("datos de referencia cargados");
        }
    }

    fn on_cities(&mut self, res: Result<CityDirectory>) -> Vec<Command> {
        let mut cmds = vec![];
        match res {
            Ok(dir) => {
                let opts: Vec<CityOption> = dir.major(self.min_population).map(CityOption::from).collect();
                info!("{} ciudades, {} en el listado por defecto", dir.len(), opts.len());
                self.ui.departure = Widget::Items(opts.clone());
                self.ui.destination = Widget::Items(opts);
                self.state.directory = Some(dir);
            }
            Err(e) => {
                warn!("ciudades: {e}");
                self.ui.departure = Widget::Unavailable(CITIES_UNAVAILABLE.into());
                self.ui.destination = Widget::Unavailable(CITIES_UNAVAILABLE.into());
                cmds.push(self.show_error(ErrorKind::Network, CITIES_LOAD_ERROR));
            }
        }
        self.reference_done();
        cmds
    }

    fn on_vehicles(&mut self, res: Result<Vec<Vehicle>>) -> Vec<Command> {
        let mut cmds = vec![];
        match res {
            Ok(list) if list.is_empty() => {
                self.ui.vehicles = Widget::Empty(NO_VEHICLES.into());
            }
            Ok(list) => {
                info!("{} vehículos", list.len());
                self.ui.vehicles = Widget::Items(list.iter().map(VehicleCard::from).collect());
                self.state.vehicles = list;
            }
            Err(e) => {
                warn!("vehículos: {e}");
                self.ui.vehicles = Widget::Unavailable(VEHICLES_UNAVAILABLE.into());
                cmds.push(self.show_error(ErrorKind::Network, VEHICLES_LOAD_ERROR));
            }
        }
        self.reference_done();
        cmds
    }

    fn on_action(&mut self, action: UserAction) -> Vec<Command> {
        match action {
            UserAction::SearchDeparture { text } => self.search(Side::Departure, &text),
            UserAction::SearchDestination { text } => self.search(Side::Destination, &text),
            UserAction::SelectDeparture { key } => self.select_city(Side::Departure, key),
            UserAction::SelectDestination { key } => self.select_city(Side::Destination, key),
            UserAction::SelectVehicle { id } => self.select_vehicle(id),
            UserAction::Submit => return self.submit(),
        }
        vec![]
    }

    fn picker(&self, side: Side) -> &Widget<Vec<CityOption>> {
        match side {
            Side::Departure => &self.ui.departure,
            Side::Destination => &self.ui.destination,
        }
    }

    fn selected_key(&self, side: Side) -> Option<&str> {
        match side {
            Side::Departure => self.state.selection.departure(),
            Side::Destination => self.state.selection.destination(),
        }
    }

    fn set_key(&mut self, side: Side, key: Option<String>) {
        match side {
            Side::Departure => self.state.selection.set_departure(key),
            Side::Destination => self.state.selection.set_destination(key),
        }
    }

    /// Sustituye las opciones del selector por todas las ciudades que casan,
    /// sin umbral de población.
    fn search(&mut self, side: Side, text: &str) {
        let Some(dir) = &self.state.directory else {
            debug!("búsqueda sin directorio de ciudades");
            return;
        };
        let opts: Vec<CityOption> = dir.filter(text).map(CityOption::from).collect();
        let keep = self
            .selected_key(side)
            .is_some_and(|k| opts.iter().any(|o| o.key == k));
        if !keep {
            self.set_key(side, None);
        }
        match side {
            Side::Departure => self.ui.departure = Widget::Items(opts),
            Side::Destination => self.ui.destination = Widget::Items(opts),
        }
        self.refresh_submit();
    }

    fn select_city(&mut self, side: Side, key: Option<String>) {
        if let Some(k) = key.as_deref().filter(|k| !k.is_empty()) {
            let offered = self
                .picker(side)
                .items()
                .is_some_and(|opts| opts.iter().any(|o| o.key == k));
            if !offered {
                warn!("ciudad {k:?} no está entre las opciones de {side:?}");
                return;
            }
        }
        self.set_key(side, key);
        self.refresh_submit();
    }

    fn select_vehicle(&mut self, id: VehicleId) {
        let Some(v) = self.state.vehicles.iter().find(|v| v.id == id).cloned() else {
            warn!("vehículo {id} desconocido");
            return;
        };
        self.state.selection.set_vehicle(Some(v));
        if let Widget::Items(cards) = &mut self.ui.vehicles {
            for c in cards.iter_mut() {
                c.selected = c.id == id;
            }
        }
        self.refresh_submit();
    }

    fn refresh_submit(&mut self) {
        // en Planning el botón sigue deshabilitado pase lo que pase
        if self.phase != Phase::Planning {
            self.ui.submit.enabled = self.state.selection.is_submittable();
        }
    }

    fn submit(&mut self) -> Vec<Command> {
        if self.phase != Phase::Ready {
            debug!("submit ignorado en fase {:?}", self.phase);
            return vec![];
        }
        if !self.state.selection.is_submittable() {
            debug!("submit ignorado: formulario incompleto");
            return vec![];
        }

        self.phase = Phase::Planning;
        self.ui.submit = SubmitControl { enabled: false, label: PENDING_LABEL.into() };
        self.ui.error = None;
        self.ui.results = None;

        match self.state.selection.validate() {
            Ok(req) => {
                info!("planificando {} -> {} (vehículo {})", req.departure, req.destination, req.vehicle_id);
                vec![Command::PlanTrip(req)]
            }
            Err(e) => {
                warn!("{e}");
                let cmd = self.show_planner_error(&e);
                self.leave_planning();
                vec![cmd]
            }
        }
    }

    fn on_plan(&mut self, res: Result<PlanOutcome>) -> Vec<Command> {
        if self.phase != Phase::Planning {
            warn!("respuesta de plan fuera de la fase Planning, descartada");
            return vec![];
        }
        let mut cmds = vec![];
        match res {
            Ok(PlanOutcome::Planned(trip)) => {
                info!(
                    "trayecto {} -> {}: {} km, {} parada(s)",
                    trip.departure.city, trip.destination.city, trip.distance, trip.number_of_stops
                );
                self.ui.results = Some(render_summary(&trip));
                render_map(&trip, &mut self.map);
                self.plans_rendered += 1;
            }
            Ok(PlanOutcome::Rejected(msg)) => {
                cmds.push(self.show_planner_error(&PlannerError::PlanningFailure(msg)));
            }
            Err(e) => {
                warn!("plan-trip: {e}");
                cmds.push(self.show_planner_error(&e));
            }
        }
        self.leave_planning();
        cmds
    }

    /// Limpieza común a cualquier salida de `Planning`. La selección puede
    /// haber cambiado mientras tanto, así que el botón se recalcula.
    fn leave_planning(&mut self) {
        self.phase = Phase::Ready;
        self.ui.submit = SubmitControl {
            enabled: self.state.selection.is_submittable(),
            label: SUBMIT_LABEL.into(),
        };
    }

    fn show_planner_error(&mut self, e: &PlannerError) -> Command {
        let message = match e {
            PlannerError::Network { .. } => CONNECTION_ERROR.to_string(),
            PlannerError::Validation(m) | PlannerError::PlanningFailure(m) => m.clone(),
        };
        self.show_error(ErrorKind::from(e), message)
    }

    fn show_error(&mut self, kind: ErrorKind, message: impl Into<String>) -> Command {
        self.error_gen += 1;
        let generation = self.error_gen;
        self.ui.error = Some(ErrorBanner { kind, message: message.into(), generation });
        Command::ClearErrorAfter { generation, after: self.error_ttl }
    }
}
