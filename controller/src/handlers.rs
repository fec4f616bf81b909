//! HTTP surface (spec.md §6 "HTTP — Controller").

use crate::admission::{self, AdmissionContext, SubmitRequest};
use crate::error::Result;
use crate::AppState;
use actix_web::{web, HttpResponse};

pub async fn root() -> HttpResponse {
    HttpResponse::Ok().body("up")
}

pub async fn healthz() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "ok"}))
}

pub async fn transcode(
    state: web::Data<AppState>,
    req: web::Json<SubmitRequest>,
) -> Result<HttpResponse> {
    let ctx = AdmissionContext {
        kv: &state.kv,
        db: &state.db,
        bus: &state.bus,
    };
    let resp = admission::submit(&ctx, req.into_inner()).await?;
    Ok(HttpResponse::Accepted().json(resp))
}

pub async fn list_jobs(state: web::Data<AppState>) -> Result<HttpResponse> {
    let jobs = state.db.list_recent(50).await?;
    Ok(HttpResponse::Ok().json(jobs))
}
