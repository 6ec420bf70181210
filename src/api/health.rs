// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Service banner returned at the root.
#[derive(Debug, Serialize, ToSchema)]
pub struct RootResponse {
    pub ok: bool,
    pub name: &'static str,
    pub version: &'static str,
}

/// Liveness probe response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        ok: true,
        name: "myXL Gateway",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is running", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
