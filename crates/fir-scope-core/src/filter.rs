// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::aggregate::ActiveScope;
use crate::matcher::matches;
use crate::mode::ScopeMode;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Field names that may hold the departure airport, in priority order.
/// Upstream feeds disagree on naming; the first non-blank one wins.
pub const DEPARTURE_FIELDS: &[&str] = &[
    "departure_icao",
    "dep_icao",
    "departure",
    "dep",
    "origin",
    "fp_dept_icao",
];

/// Anything a flight feed hands the renderer.
pub trait FlightRecord {
    fn field(&self, name: &str) -> Option<&str>;

    fn departure_code(&self) -> Option<&str> {
        DEPARTURE_FIELDS
            .iter()
            .filter_map(|name| self.field(name))
            .map(str::trim)
            .find(|code| !code.is_empty())
    }
}

impl FlightRecord for Value {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }
}

impl FlightRecord for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Read-only view handed to the flight list renderer. Holds a snapshot of the
/// scope; a recompute does not change an existing filter.
#[derive(Debug, Clone)]
pub struct FlightScopeFilter {
    mode: ScopeMode,
    scope: Arc<ActiveScope>,
}

impl FlightScopeFilter {
    pub fn new(mode: ScopeMode, scope: Arc<ActiveScope>) -> Self {
        Self { mode, scope }
    }

    /// Always true outside international mode; domestic filtering is the
    /// legacy selector's job.
    pub fn is_in_scope<F: FlightRecord + ?Sized>(&self, flight: &F) -> bool {
        if self.mode != ScopeMode::International {
            return true;
        }
        matches(flight.departure_code(), self.scope.patterns())
    }

    pub fn retain<'a, F: FlightRecord>(&self, flights: &'a [F]) -> Vec<&'a F> {
        flights.iter().filter(|f| self.is_in_scope(*f)).collect()
    }

    pub fn scope(&self) -> &ActiveScope {
        &self.scope
    }
}
