// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::api::proxy::Forwarder;

#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
}

impl AppState {
    pub fn new(forwarder: Forwarder) -> Self {
        Self {
            forwarder: Arc::new(forwarder),
        }
    }
}
