// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! myXL Gateway - Signed-Request Gateway for the myXL Carrier Backend
//!
//! This crate fronts the carrier's private API with a thin HTTP layer. The
//! substance is the outbound side: every request to the backend is
//! encrypted and signed through external signing oracles, every response is
//! decrypted before use, and purchases run as a multi-step orchestrated
//! chain with step-tagged outcomes.
//!
//! ## Modules
//!
//! - `api` - HTTP front door (Axum)
//! - `xl` - signed-request pipeline, session manager, purchase orchestrator
//! - `config` - environment-derived process configuration

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod xl;
