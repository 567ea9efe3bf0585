//! HTTP surface over the collector: JSON runs and an SSE progress stream.

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, get, post, web};
use bytes::Bytes;
use tokio::sync::{Mutex, mpsc};
use tracing::warn;

use crate::collector::{JobCollector, RunEvent, RunOptions};
use crate::error::FetchError;
use crate::fetch::PageFetcher;
use crate::query::Query;

/// Shared by all workers. Runs are serialized because they share the output
/// and seen-id files.
pub struct AppState {
    fetcher: Arc<dyn PageFetcher>,
    options: RunOptions,
    run_lock: Mutex<()>,
}

impl AppState {
    pub fn new(fetcher: Arc<dyn PageFetcher>, options: RunOptions) -> Self {
        Self {
            fetcher,
            options,
            run_lock: Mutex::new(()),
        }
    }

    fn collector(&self) -> Result<JobCollector, FetchError> {
        JobCollector::new(self.fetcher.clone(), self.options.clone())
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(healthz)
        .service(query_post)
        .service(query_get)
        .service(query_stream);
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().body(
        "jobtrawl online.\n\
         JSON:\n  POST /jobs/query {\"keyword\":\"rust\",\"location\":\"Berlin\",\"jobType\":\"full time\",\"limit\":20}\n  GET  /jobs/query?keyword=...&limit=20\n\
         Stream:\n  GET  /jobs/query/stream?keyword=...&limit=20 (SSE)",
    )
}

#[get("/healthz")]
async fn healthz() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

#[post("/jobs/query")]
async fn query_post(state: web::Data<AppState>, body: web::Json<Query>) -> impl Responder {
    run_once(&state, &body).await
}

#[get("/jobs/query")]
async fn query_get(state: web::Data<AppState>, q: web::Query<Query>) -> impl Responder {
    run_once(&state, &q).await
}

async fn run_once(state: &AppState, query: &Query) -> HttpResponse {
    let _guard = state.run_lock.lock().await;
    let result = match state.collector() {
        Ok(collector) => collector.run(query).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => error_response(&e),
    }
}

fn error_response(e: &FetchError) -> HttpResponse {
    let err = serde_json::json!({ "error": format!("{e}") });
    match e {
        FetchError::InvalidQuery(_) => HttpResponse::BadRequest().json(err),
        FetchError::Transport(_) => HttpResponse::BadGateway().json(err),
        FetchError::Extraction(_) | FetchError::Storage(_) => {
            HttpResponse::InternalServerError().json(err)
        }
    }
}

// --------------
// SSE streaming
// --------------

fn sse_event(event: &RunEvent) -> Bytes {
    let data = serde_json::to_string(event)
        .unwrap_or_else(|e| format!(r#"{{"kind":"failed","error":"{e}"}}"#));
    Bytes::from(format!("event: {}\ndata: {}\n\n", event.name(), data))
}

#[get("/jobs/query/stream")]
async fn query_stream(state: web::Data<AppState>, q: web::Query<Query>) -> impl Responder {
    let (tx, mut rx) = mpsc::channel::<RunEvent>(32);
    let query = q.into_inner();

    actix_web::rt::spawn(async move {
        let _guard = state.run_lock.lock().await;
        let collector = match state.collector() {
            Ok(c) => c.with_events(tx.clone()),
            Err(e) => {
                let _ = tx
                    .send(RunEvent::Failed {
                        error: e.to_string(),
                    })
                    .await;
                return;
            }
        };
        // failures already reached the client as an `error` event
        if let Err(e) = collector.run(&query).await {
            warn!(error = %e, "streamed run failed");
        }
    });

    let stream = async_stream::stream! {
        while let Some(event) = rx.recv().await {
            yield Ok::<Bytes, actix_web::Error>(sse_event(&event));
        }
    };

    HttpResponse::Ok()
        .insert_header(("Content-Type", "text/event-stream"))
        .insert_header(("Cache-Control", "no-cache"))
        .insert_header(("Connection", "keep-alive"))
        .streaming(stream)
}
