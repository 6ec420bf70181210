// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::config::AppConfig;
use crate::xl::{PurchaseOrchestrator, SessionManager, XlClient, XlError};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionManager,
    pub client: XlClient,
    pub purchases: PurchaseOrchestrator,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, XlError> {
        let config = Arc::new(config);
        let client = XlClient::new(Arc::clone(&config))?;
        let sessions = SessionManager::new(Arc::clone(&config), client.oracle().clone())?;
        let purchases = PurchaseOrchestrator::new(client.clone());
        Ok(Self {
            config,
            sessions,
            client,
            purchases,
        })
    }
}
