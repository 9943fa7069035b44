// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::catalog::ScopeEntry;
use crate::matcher::{is_global, strip_wildcards};
use crate::mode::ScopeMode;
use crate::surface::SelectionSurface;
use log::{debug, warn};
use std::sync::Arc;

/// Namespace the server boundary uses to tell FIR tokens from legacy ones.
pub const TOKEN_NAMESPACE: &str = "FIR:";

pub const INTERNATIONAL_FALLBACK_LABEL: &str = "International";
pub const DOMESTIC_LABEL: &str = "Domestic";

/// The resolved selection. Label and token are derived from the patterns and
/// the three are always replaced together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveScope {
    patterns: Vec<String>,
    label: String,
    token: String,
}

impl ActiveScope {
    /// Scope with no patterns, i.e. no filter.
    pub fn unrestricted(mode: ScopeMode) -> Self {
        Self::assemble(std::iter::empty::<(&str, Vec<String>)>(), mode)
    }

    pub fn from_entries(entries: &[ScopeEntry], mode: ScopeMode) -> Self {
        Self::assemble(
            entries.iter().map(|e| (e.label.as_str(), e.patterns.clone())),
            mode,
        )
    }

    fn assemble<'a>(selections: impl Iterator<Item = (&'a str, Vec<String>)>, mode: ScopeMode) -> Self {
        let mut patterns = Vec::new();
        let mut labels = Vec::new();
        for (label, entry_patterns) in selections {
            labels.push(label);
            patterns.extend(entry_patterns);
        }

        let label = if labels.is_empty() {
            match mode {
                ScopeMode::International => INTERNATIONAL_FALLBACK_LABEL.to_string(),
                ScopeMode::Domestic => DOMESTIC_LABEL.to_string(),
            }
        } else {
            labels.join(", ")
        };

        let token = build_token(&patterns);
        Self {
            patterns,
            label,
            token,
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_unrestricted(&self) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| is_global(p))
    }
}

/// `["EG*", "LF*"]` serializes to `"FIR:EG FIR:LF"`. Every pattern is
/// written, so a global `*` becomes a bare `FIR:` and an empty selection is
/// the only thing that yields `""`.
pub fn build_token<S: AsRef<str>>(patterns: &[S]) -> String {
    patterns
        .iter()
        .map(|p| format!("{}{}", TOKEN_NAMESPACE, strip_wildcards(p.as_ref()).to_uppercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn Fn(&ActiveScope) + Send + Sync>;

/// Owns the current ActiveScope and the observers told about every change.
pub struct SelectionAggregator {
    current: Arc<ActiveScope>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
}

impl Default for SelectionAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionAggregator {
    pub fn new() -> Self {
        Self {
            current: Arc::new(ActiveScope::unrestricted(ScopeMode::Domestic)),
            observers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn current(&self) -> Arc<ActiveScope> {
        Arc::clone(&self.current)
    }

    /// Observers run in registration order, once per recompute.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&ActiveScope) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        before != self.observers.len()
    }

    pub fn recompute(&mut self, selected: &[ScopeEntry], mode: ScopeMode) -> Arc<ActiveScope> {
        self.replace(ActiveScope::from_entries(selected, mode))
    }

    /// Aggregates the selected options of `surface`. An option whose stored
    /// patterns fail to decode still counts toward the label but adds no
    /// patterns.
    pub fn recompute_from_surface(&mut self, surface: &SelectionSurface, mode: ScopeMode) -> Arc<ActiveScope> {
        let selections = surface.selected().map(|option| {
            let patterns = option.decode_patterns().unwrap_or_else(|e| {
                warn!("Ignoring patterns of selected option — key={} error={}", option.key, e);
                Vec::new()
            });
            (option.label.as_str(), patterns)
        });
        let scope = ActiveScope::assemble(selections, mode);
        self.replace(scope)
    }

    pub fn clear(&mut self, mode: ScopeMode) -> Arc<ActiveScope> {
        self.replace(ActiveScope::unrestricted(mode))
    }

    fn replace(&mut self, scope: ActiveScope) -> Arc<ActiveScope> {
        debug!(
            "Active scope recomputed — label={} patterns={} token={}",
            scope.label,
            scope.patterns.len(),
            scope.token
        );
        self.current = Arc::new(scope);
        for (_, observer) in &self.observers {
            observer(&*self.current);
        }
        Arc::clone(&self.current)
    }
}
