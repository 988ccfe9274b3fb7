use std::{
    collections::HashMap,
    sync::Mutex as StdMutex,
    time::Duration,
};

use async_trait::async_trait;
use shared::domain::{
    AccidentId, AccidentRecord, Coordinate, RiskLevel, RouteResult, StatsSnapshot,
};
use tokio::sync::oneshot;

use crate::{
    api::{ApiClient, CsvUpload},
    error::ApiError,
};

pub(crate) enum Reply<T> {
    Ready(Result<T, ApiError>),
    Gated(oneshot::Receiver<Result<T, ApiError>>),
}

impl<T> Reply<T> {
    async fn resolve(self) -> Result<T, ApiError> {
        match self {
            Reply::Ready(result) => result,
            Reply::Gated(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::Network("gate dropped".into()))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Stats,
    Upload(String),
    Route {
        origin: Coordinate,
        destination: Coordinate,
    },
    Nearby {
        center: Coordinate,
        radius_km: f64,
    },
}

/// In-memory ApiClient. Route and nearby replies are keyed by the origin's
/// latitude so tests can release them in any order.
pub(crate) struct ScriptedApi {
    stats: StdMutex<Vec<Result<StatsSnapshot, ApiError>>>,
    uploads: StdMutex<HashMap<String, Reply<String>>>,
    routes: StdMutex<HashMap<u64, Reply<RouteResult>>>,
    nearby: StdMutex<HashMap<u64, Reply<Vec<AccidentRecord>>>>,
    calls: StdMutex<Vec<Call>>,
}

fn key(coordinate: Coordinate) -> u64 {
    coordinate.latitude.to_bits()
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self {
            stats: StdMutex::new(Vec::new()),
            uploads: StdMutex::new(HashMap::new()),
            routes: StdMutex::new(HashMap::new()),
            nearby: StdMutex::new(HashMap::new()),
            calls: StdMutex::new(Vec::new()),
        }
    }

    /// Stats replies are served in order; the last one repeats.
    pub(crate) fn push_stats(&self, result: Result<StatsSnapshot, ApiError>) {
        self.stats.lock().unwrap().push(result);
    }

    pub(crate) fn upload_ready(&self, filename: &str, result: Result<String, ApiError>) {
        self.uploads
            .lock()
            .unwrap()
            .insert(filename.to_string(), Reply::Ready(result));
    }

    pub(crate) fn upload_gate(&self, filename: &str) -> oneshot::Sender<Result<String, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.uploads
            .lock()
            .unwrap()
            .insert(filename.to_string(), Reply::Gated(rx));
        tx
    }

    pub(crate) fn route_ready(&self, origin: Coordinate, result: Result<RouteResult, ApiError>) {
        self.routes
            .lock()
            .unwrap()
            .insert(key(origin), Reply::Ready(result));
    }

    pub(crate) fn route_gate(
        &self,
        origin: Coordinate,
    ) -> oneshot::Sender<Result<RouteResult, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.routes
            .lock()
            .unwrap()
            .insert(key(origin), Reply::Gated(rx));
        tx
    }

    pub(crate) fn nearby_ready(
        &self,
        origin: Coordinate,
        result: Result<Vec<AccidentRecord>, ApiError>,
    ) {
        self.nearby
            .lock()
            .unwrap()
            .insert(key(origin), Reply::Ready(result));
    }

    pub(crate) fn nearby_gate(
        &self,
        origin: Coordinate,
    ) -> oneshot::Sender<Result<Vec<AccidentRecord>, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.nearby
            .lock()
            .unwrap()
            .insert(key(origin), Reply::Gated(rx));
        tx
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Yields until `count` calls matching `predicate` have been issued.
    pub(crate) async fn wait_for_calls(&self, count: usize, predicate: impl Fn(&Call) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if self.calls().iter().filter(|call| predicate(call)).count() >= count {
                    return;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("expected calls were never issued");
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn unscripted<T>(what: &str) -> Result<T, ApiError> {
    Err(ApiError::Network(format!("no scripted reply for {what}")))
}

#[async_trait]
impl ApiClient for ScriptedApi {
    async fn get_stats(&self) -> Result<StatsSnapshot, ApiError> {
        self.record(Call::Stats);
        let mut stats = self.stats.lock().unwrap();
        match stats.len() {
            0 => unscripted("stats"),
            1 => stats[0].clone(),
            _ => stats.remove(0),
        }
    }

    async fn upload_csv(&self, file: CsvUpload) -> Result<String, ApiError> {
        self.record(Call::Upload(file.filename.clone()));
        let reply = self.uploads.lock().unwrap().remove(&file.filename);
        match reply {
            Some(reply) => reply.resolve().await,
            None => unscripted("upload"),
        }
    }

    async fn get_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteResult, ApiError> {
        self.record(Call::Route {
            origin,
            destination,
        });
        let reply = self.routes.lock().unwrap().remove(&key(origin));
        match reply {
            Some(reply) => reply.resolve().await,
            None => unscripted("route"),
        }
    }

    async fn get_nearby(
        &self,
        center: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<AccidentRecord>, ApiError> {
        self.record(Call::Nearby { center, radius_km });
        let reply = self.nearby.lock().unwrap().remove(&key(center));
        match reply {
            Some(reply) => reply.resolve().await,
            None => unscripted("nearby"),
        }
    }
}

pub(crate) fn route_fixture(distance_km: f64) -> RouteResult {
    RouteResult {
        polyline: vec![Coordinate::new(-8.05, -34.9), Coordinate::new(-8.1, -34.95)],
        distance_km,
        risk_level: RiskLevel::Low,
        total_risk_score: distance_km * 2.0,
        origin_risk: 1.0,
        destination_risk: 0.5,
    }
}

pub(crate) fn accident_fixture(id: i64) -> AccidentRecord {
    AccidentRecord {
        id: AccidentId(id),
        position: Coordinate::new(-8.05, -34.9),
        municipality: "RECIFE".into(),
        accident_type: "Colisão transversal".into(),
        fatalities: 0,
        serious_injuries: 1,
        distance_km: 0.4,
    }
}

pub(crate) fn stats_fixture(total: u64) -> StatsSnapshot {
    let mut snapshot = StatsSnapshot {
        total_accidents: total,
        ..StatsSnapshot::default()
    };
    snapshot.by_city.insert("RECIFE".into(), total);
    snapshot.by_type.insert("Colisão transversal".into(), total);
    snapshot
}
