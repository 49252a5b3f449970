mod common;

use async_trait::async_trait;
use futures::{stream, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::{advance, sleep, Instant};

use evtrip::error::Result;
use evtrip::orchestrator::{ErrorKind, CITIES_LOAD_ERROR, CITIES_UNAVAILABLE, SUBMIT_LABEL};
use evtrip::render::{Layer, Stations};
use evtrip::selection::SAME_CITY_ERROR;
use evtrip::types::{City, PlanOutcome, PlanRequest, TripPlan, Vehicle};
use evtrip::{AppCfg, Event, GeoJsonMap, HttpGateway, Orchestrator, Phase, PlannerError, Session, TripApi, UserAction};

fn act(o: UserAction) -> Event {
    Event::User(o)
}

fn fill(dep: &str, dest: &str, vehicle: u64) -> Vec<Event> {
    vec![
        act(UserAction::SelectDeparture { key: Some(dep.into()) }),
        act(UserAction::SelectDestination { key: Some(dest.into()) }),
        act(UserAction::SelectVehicle { id: vehicle.into() }),
    ]
}

// ---- sesión completa contra la API falsa por HTTP ----

fn http_cfg(base: String) -> AppCfg {
    AppCfg { api_url: base, http_timeout_s: 5, error_ttl_ms: 20, ..AppCfg::default() }
}

#[tokio::test]
async fn plans_a_trip_over_http() {
    let (base, calls) = common::spawn_mock_api().await;
    let cfg = http_cfg(base);
    let gw = HttpGateway::from_cfg(&cfg).unwrap();
    let mut session = Session::new(&gw, Orchestrator::new(&cfg, GeoJsonMap::new()));

    session.dispatch(Event::Start);
    assert_eq!(session.orchestrator().phase(), Phase::LoadingReference);
    session.settle().await;
    assert_eq!(session.orchestrator().phase(), Phase::Ready);

    for ev in fill("paris", "lyon", 1) {
        session.dispatch(ev);
    }
    assert!(session.orchestrator().ui().submit.enabled);
    session.dispatch(act(UserAction::Submit));
    assert_eq!(session.in_flight(), 1);
    session.settle().await;

    let o = session.orchestrator();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let summary = o.ui().results.as_ref().expect("summary");
    assert_eq!((summary.distance_km, summary.stops, summary.driving_h, summary.total_h), (450.0, 1, 5.0, 6.0));
    assert!(matches!(&summary.stations, Stations::List(l) if l.len() == 1));
    assert_eq!(o.map().layer(Layer::Stations).len(), 1);
    assert_eq!(o.ui().submit.label, SUBMIT_LABEL);
    assert!(o.ui().submit.enabled);
}

#[tokio::test]
async fn same_city_never_reaches_the_server() {
    let (base, calls) = common::spawn_mock_api().await;
    let cfg = http_cfg(base);
    let gw = HttpGateway::from_cfg(&cfg).unwrap();
    let mut session = Session::new(&gw, Orchestrator::new(&cfg, GeoJsonMap::new()));
    session.dispatch(Event::Start);
    session.settle().await;

    for ev in fill("lyon", "lyon", 7) {
        session.dispatch(ev);
    }
    session.dispatch(act(UserAction::Submit));
    let err = session.orchestrator().ui().error.clone().expect("error banner");
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(err.message, SAME_CITY_ERROR);
    session.settle().await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(session.orchestrator().ui().error.is_none());
}

#[tokio::test]
async fn server_rejection_is_shown_verbatim() {
    let (base, _) = common::spawn_mock_api().await;
    let cfg = AppCfg { error_ttl_ms: 60_000, ..http_cfg(base) };
    let gw = HttpGateway::from_cfg(&cfg).unwrap();
    let mut session = Session::new(&gw, Orchestrator::new(&cfg, GeoJsonMap::new()));
    session.dispatch(Event::Start);
    session.settle().await;

    for ev in fill("paris", "nice", 7) {
        session.dispatch(ev);
    }
    session.dispatch(act(UserAction::Submit));
    // solo la respuesta del plan; el temporizador del error queda en vuelo
    assert!(session.step().await);

    let o = session.orchestrator();
    let err = o.ui().error.as_ref().expect("error banner");
    assert_eq!(err.kind, ErrorKind::PlanningFailure);
    assert_eq!(err.message, common::NO_RANGE);
    assert_eq!(o.map().overlay_count(), 0);
    assert!(o.ui().results.is_none());
    assert_eq!(o.phase(), Phase::Ready);
}

#[tokio::test]
async fn unreachable_api_marks_both_widgets_unavailable() {
    let cfg = http_cfg(common::dead_base().await);
    let gw = HttpGateway::from_cfg(&cfg).unwrap();
    let mut session = Session::new(&gw, Orchestrator::new(&cfg, GeoJsonMap::new()));
    session.dispatch(Event::Start);
    session.settle().await;

    let ui = session.orchestrator().ui();
    assert_eq!(session.orchestrator().phase(), Phase::Ready);
    assert!(ui.departure.items().is_none());
    assert!(ui.vehicles.items().is_none());
    assert!(ui.error.is_none(), "errors expire after the ttl");
    assert!(!ui.submit.enabled);
}

// ---- API en memoria, reloj pausado ----

struct FakeApi {
    fail_cities: bool,
    plan: Option<PlanOutcome>,
    plan_calls: AtomicUsize,
}

impl FakeApi {
    fn new(plan: Option<PlanOutcome>) -> Self {
        Self { fail_cities: false, plan, plan_calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl TripApi for FakeApi {
    async fn fetch_cities(&self) -> Result<Vec<City>> {
        if self.fail_cities {
            return Err(PlannerError::network("/api/cities", "connection refused"));
        }
        Ok(vec![
            City { name: "Paris".into(), population: 2_148_000 },
            City { name: "Lyon".into(), population: 513_000 },
        ])
    }

    async fn fetch_vehicles(&self) -> Result<Vec<Vehicle>> {
        Ok(vec![Vehicle { id: 1.into(), name: "Renault Zoe R135".into(), autonomy: 395.0, battery: 52.0, charge_time: 0.75, seats: 5 }])
    }

    async fn plan_trip(&self, _req: &PlanRequest) -> Result<PlanOutcome> {
        self.plan_calls.fetch_add(1, Ordering::SeqCst);
        self.plan.clone().ok_or_else(|| PlannerError::network("/api/plan-trip", "reset"))
    }
}

fn trip() -> TripPlan {
    serde_json::from_value(common::paris_lyon_trip()).unwrap()
}

#[tokio::test(start_paused = true)]
async fn load_error_clears_after_five_seconds() {
    let api = FakeApi { fail_cities: true, ..FakeApi::new(None) };
    let mut session = Session::new(&api, Orchestrator::new(&AppCfg::default(), GeoJsonMap::new()));
    let t0 = Instant::now();
    session.dispatch(Event::Start);
    session.step().await;
    session.step().await;

    let ui = session.orchestrator().ui();
    assert_eq!(ui.error.as_ref().map(|e| e.message.as_str()), Some(CITIES_LOAD_ERROR));
    assert_eq!(ui.departure.items(), None);
    assert!(matches!(&ui.destination, evtrip::orchestrator::Widget::Unavailable(m) if m == CITIES_UNAVAILABLE));
    assert!(ui.vehicles.items().is_some());

    session.settle().await;
    assert!(t0.elapsed() >= Duration::from_secs(5));
    assert!(session.orchestrator().ui().error.is_none());
}

#[tokio::test(start_paused = true)]
async fn newer_error_gets_its_own_full_delay() {
    let api = FakeApi::new(None);
    let mut session = Session::new(&api, Orchestrator::new(&AppCfg::default(), GeoJsonMap::new()));
    session.dispatch(Event::Start);
    session.step().await;
    session.step().await;
    let t0 = Instant::now();

    for ev in fill("paris", "lyon", 1) {
        session.dispatch(ev);
    }
    // fallo de transporte en t=0
    session.dispatch(act(UserAction::Submit));
    session.step().await;
    assert_eq!(session.orchestrator().ui().error.as_ref().unwrap().kind, ErrorKind::Network);

    advance(Duration::from_secs(3)).await;
    // error de validación en t=3
    session.dispatch(act(UserAction::SelectDestination { key: Some("paris".into()) }));
    session.dispatch(act(UserAction::Submit));

    // t=5: vence el primer temporizador, el mensaje nuevo sigue
    session.step().await;
    let err = session.orchestrator().ui().error.clone().expect("still visible");
    assert_eq!(err.message, SAME_CITY_ERROR);

    // t=8: vence el segundo
    session.step().await;
    assert!(t0.elapsed() >= Duration::from_secs(8));
    assert!(session.orchestrator().ui().error.is_none());
    assert_eq!(api.plan_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn run_drives_scripted_actions() {
    let api = FakeApi::new(Some(PlanOutcome::Planned(trip())));
    let mut session = Session::new(&api, Orchestrator::new(&AppCfg::default(), GeoJsonMap::new()));

    let script = vec![
        UserAction::SearchDeparture { text: "par".into() },
        UserAction::SelectDeparture { key: Some("paris".into()) },
        UserAction::SelectDestination { key: Some("lyon".into()) },
        UserAction::SelectVehicle { id: 1.into() },
        UserAction::Submit,
        UserAction::Submit,
    ];
    // cada acción llega un segundo después de la anterior
    let actions = Box::pin(stream::iter(script).then(|a| async move {
        sleep(Duration::from_secs(1)).await;
        a
    }));

    let mut phases = Vec::new();
    session.run(actions, |o| phases.push(o.phase())).await;

    assert_eq!(phases.first(), Some(&Phase::LoadingReference));
    assert!(phases.contains(&Phase::Planning));
    let o = session.orchestrator();
    assert_eq!(o.phase(), Phase::Ready);
    // dos planes, uno tras otro: el segundo submit llega cuando el primero ya terminó
    assert_eq!(api.plan_calls.load(Ordering::SeqCst), 2);
    assert_eq!(o.plans_rendered(), 2);
    assert_eq!(o.map().overlay_count(), 4);
    assert_eq!(session.in_flight(), 0);
}
