//! session.rs
//! Driver asíncrono del orquestador: ejecuta los `Command` (llamadas a la
//! API y temporizadores de error) y le devuelve sus resultados como eventos,
//! de uno en uno. Todo corre en la misma tarea; nada de estado compartido.

use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, Stream, StreamExt};
use futures::FutureExt;
use tokio::time::sleep;
use tracing::debug;

use crate::cities::CityDirectory;
use crate::gateway::TripApi;
use crate::orchestrator::{Command, Event, Orchestrator, UserAction};
use crate::render::MapSurface;

pub struct Session<'a, M: MapSurface> {
    api: &'a dyn TripApi,
    orch: Orchestrator<M>,
    pending: FuturesUnordered<LocalBoxFuture<'a, Event>>,
}

enum Next {
    Input(Option<UserAction>),
    Completed(Event),
}

impl<'a, M: MapSurface> Session<'a, M> {
    pub fn new(api: &'a dyn TripApi, orch: Orchestrator<M>) -> Self {
        Self { api, orch, pending: FuturesUnordered::new() }
    }

    pub fn orchestrator(&self) -> &Orchestrator<M> { &self.orch }

    /// Operaciones en vuelo (llamadas remotas y temporizadores).
    pub fn in_flight(&self) -> usize { self.pending.len() }

    pub fn dispatch(&mut self, event: Event) {
        for cmd in self.orch.handle(event) {
            debug!("comando {cmd:?}");
            let fut = self.execute(cmd);
            self.pending.push(fut);
        }
    }

    fn execute(&self, cmd: Command) -> LocalBoxFuture<'a, Event> {
        let api = self.api;
        match cmd {
            Command::LoadCities => async move { Event::CitiesLoaded(CityDirectory::load(api).await) }.boxed_local(),
            Command::LoadVehicles => async move { Event::VehiclesLoaded(api.fetch_vehicles().await) }.boxed_local(),
            Command::PlanTrip(req) => async move { Event::PlanCompleted(api.plan_trip(&req).await) }.boxed_local(),
            Command::ClearErrorAfter { generation, after } => async move {
                sleep(after).await;
                Event::ErrorExpired(generation)
            }
            .boxed_local(),
        }
    }

    /// Procesa la siguiente operación que termine. `false` si no quedaba ninguna.
    pub async fn step(&mut self) -> bool {
        match self.pending.next().await {
            Some(ev) => {
                self.dispatch(ev);
                true
            }
            None => false,
        }
    }

    /// Espera a que termine todo lo que está en vuelo.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    /// Bucle principal: arranca las cargas y mezcla acciones del usuario con
    /// las respuestas. Sale cuando se cierra la entrada y no queda nada en vuelo.
    pub async fn run<S>(&mut self, mut actions: S, mut observe: impl FnMut(&Orchestrator<M>))
    where
        S: Stream<Item = UserAction> + Unpin,
    {
        self.dispatch(Event::Start);
        observe(&self.orch);
        let mut input_open = true;
        loop {
            let next = tokio::select! {
                a = actions.next(), if input_open => Next::Input(a),
                Some(ev) = self.pending.next(), if !self.pending.is_empty() => Next::Completed(ev),
                else => break,
            };
            match next {
                Next::Input(Some(a)) => self.dispatch(Event::User(a)),
                Next::Input(None) => {
                    input_open = false;
                    continue;
                }
                Next::Completed(ev) => self.dispatch(ev),
            }
            observe(&self.orch);
        }
    }
}
