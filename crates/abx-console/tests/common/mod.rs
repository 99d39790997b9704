//! In-process experiment backend for client and command tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use abx_console::{ConsoleConfig, ConsoleContext};
use abx_protocol::{
    ndjson, Experiment, ExperimentResults, Page, PageMetadata, Variant, VariantEvent,
    VariantResult, CLIENT_ID_HEADER,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct MockBackend {
    pub experiments: Arc<Mutex<BTreeMap<String, Experiment>>>,
    pub queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    pub client_ids: Arc<Mutex<Vec<String>>>,
    pub imports: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockBackend {
    pub async fn insert(&self, exp: Experiment) {
        self.experiments.lock().await.insert(exp.id.clone(), exp);
    }

    pub async fn get(&self, id: &str) -> Option<Experiment> {
        self.experiments.lock().await.get(id).cloned()
    }

    async fn record_headers(&self, headers: &HeaderMap) {
        if let Some(id) = headers.get(CLIENT_ID_HEADER).and_then(|v| v.to_str().ok()) {
            self.client_ids.lock().await.push(id.to_string());
        }
    }
}

async fn list_experiments(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Page<Experiment>> {
    backend.record_headers(&headers).await;
    backend.queries.lock().await.push(query.clone());
    let pattern = query.get("pattern").cloned().unwrap_or_else(|| "*".into());
    let needle = pattern.trim_matches('*').to_string();
    let all: Vec<Experiment> = backend
        .experiments
        .lock()
        .await
        .values()
        .filter(|e| needle.is_empty() || e.id.contains(&needle))
        .cloned()
        .collect();
    let count = all.len() as u64;
    Json(Page {
        results: all,
        metadata: PageMetadata {
            page: 1,
            page_size: 20,
            count,
            nb_pages: 1,
        },
    })
}

async fn create_experiment(
    State(backend): State<MockBackend>,
    Json(exp): Json<Experiment>,
) -> Response {
    let mut store = backend.experiments.lock().await;
    if store.contains_key(&exp.id) {
        return (StatusCode::CONFLICT, "already exists").into_response();
    }
    store.insert(exp.id.clone(), exp.clone());
    (StatusCode::CREATED, Json(exp)).into_response()
}

async fn get_experiment(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    backend.record_headers(&headers).await;
    match backend.get(&id).await {
        Some(exp) => Json(exp).into_response(),
        None => (StatusCode::NOT_FOUND, "experiment not found").into_response(),
    }
}

async fn update_experiment(
    State(backend): State<MockBackend>,
    Path(id): Path<String>,
    Json(exp): Json<Experiment>,
) -> Response {
    let mut store = backend.experiments.lock().await;
    if !store.contains_key(&id) {
        return (StatusCode::NOT_FOUND, "experiment not found").into_response();
    }
    store.insert(id, exp.clone());
    Json(exp).into_response()
}

async fn delete_experiment(State(backend): State<MockBackend>, Path(id): Path<String>) -> StatusCode {
    match backend.experiments.lock().await.remove(&id) {
        Some(_) => StatusCode::OK,
        None => StatusCode::NOT_FOUND,
    }
}

async fn experiment_results(State(backend): State<MockBackend>, Path(id): Path<String>) -> Response {
    let Some(experiment) = backend.get(&id).await else {
        return (StatusCode::NOT_FOUND, "experiment not found").into_response();
    };
    Json(sample_results(experiment)).into_response()
}

async fn export_experiments(State(backend): State<MockBackend>) -> Response {
    let all: Vec<Experiment> = backend.experiments.lock().await.values().cloned().collect();
    match ndjson::encode(&all) {
        Ok(body) => body.into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn import_experiments(State(backend): State<MockBackend>, body: String) -> Json<serde_json::Value> {
    let count = ndjson::count_records(&body);
    backend.imports.lock().await.push(("experiments".into(), body));
    Json(serde_json::json!({"success": count, "errors": []}))
}

async fn export_events() -> &'static str {
    "{\"variantId\":\"A\"}\n{\"variantId\":\"B\"}\n"
}

async fn import_events(State(backend): State<MockBackend>, body: String) -> Json<serde_json::Value> {
    let count = ndjson::count_records(&body);
    backend.imports.lock().await.push(("events".into(), body));
    Json(serde_json::json!({"success": count, "errors": []}))
}

pub fn sample_results(experiment: Experiment) -> ExperimentResults {
    let date = |s: &str| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
    let result = |id: &str, population: u64, events: Vec<VariantEvent>, won: u64, displayed: u64| {
        let mut variant = Variant::new(id, format!("Variant {id}"), 0.5);
        variant.current_population = Some(population);
        VariantResult {
            variant,
            events,
            transformation: 10.0,
            won,
            displayed,
        }
    };
    ExperimentResults {
        results: vec![
            result(
                "A",
                10,
                vec![VariantEvent {
                    variant_id: "A".into(),
                    date: date("2018-03-01 10:00:00"),
                    transformation: 10.0,
                }],
                1,
                10,
            ),
            result(
                "B",
                12,
                vec![VariantEvent {
                    variant_id: "B".into(),
                    date: date("2018-03-01 11:00:00"),
                    transformation: 20.0,
                }],
                2,
                12,
            ),
        ],
        winner: None,
        experiment,
    }
}

/// Start the mock backend on a free local port.
///
/// Returns `None` when the sandbox does not allow binding a socket.
pub async fn spawn_backend() -> anyhow::Result<Option<(String, MockBackend, tokio::task::JoinHandle<()>)>> {
    let backend = MockBackend::default();
    let app = Router::new()
        .route("/api/experiments", get(list_experiments).post(create_experiment))
        .route(
            "/api/experiments.ndjson",
            get(export_experiments).post(import_experiments),
        )
        .route(
            "/api/experiments/events.ndjson",
            get(export_events).post(import_events),
        )
        .route(
            "/api/experiments/:id",
            get(get_experiment).put(update_experiment).delete(delete_experiment),
        )
        .route("/api/experiments/:id/results", get(experiment_results))
        .with_state(backend.clone());

    let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
            eprintln!("skipping backend tests: local socket bind is not permitted");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    tokio::time::sleep(Duration::from_millis(40)).await;
    Ok(Some((format!("http://{addr}"), backend, handle)))
}

pub fn context_for(base_url: &str) -> ConsoleContext {
    let mut config = ConsoleConfig::default();
    config.server.base_url = base_url.to_string();
    ConsoleContext::new(config).unwrap()
}
