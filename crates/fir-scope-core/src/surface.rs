// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! In-memory model of the scope selection widget.
//!
//! Each option carries its pattern list JSON-encoded, the same way the widget
//! stores it on the element; it is decoded only when the selection is
//! aggregated.

use crate::catalog::{normalize_patterns, ScopeCatalog, ScopeEntry, Section};
use crate::error::ScopeError;
use crate::region::group_individual;
use log::debug;
use std::collections::HashSet;

pub const MANUAL_KEY: &str = "MANUAL";
pub const GROUP_GLOBAL: &str = "Global";
pub const GROUP_REGIONAL: &str = "Regional";
pub const GROUP_CUSTOM: &str = "Custom patterns";
pub const GROUP_DOMESTIC: &str = "Domestic";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// "Loading…" or "failed" marker, never selectable.
    Placeholder,
    /// Supplied by the legacy single-region taxonomy.
    Legacy,
    Scope(Section),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceStatus {
    Domestic,
    Loading,
    LoadFailed,
    International,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceOption {
    pub key: String,
    pub label: String,
    pub description: Option<String>,
    pub group: String,
    pub kind: OptionKind,
    pub encoded_patterns: String,
    pub selected: bool,
}

impl SurfaceOption {
    pub fn from_entry(entry: &ScopeEntry, group: impl Into<String>) -> Self {
        Self {
            key: entry.key.clone(),
            label: entry.label.clone(),
            description: entry.description.clone(),
            group: group.into(),
            kind: OptionKind::Scope(entry.section),
            encoded_patterns: encode_patterns(&entry.patterns),
            selected: false,
        }
    }

    pub fn legacy(
        key: impl Into<String>,
        label: impl Into<String>,
        patterns: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: None,
            group: GROUP_DOMESTIC.to_string(),
            kind: OptionKind::Legacy,
            encoded_patterns: encode_patterns(&normalize_patterns(patterns)),
            selected: false,
        }
    }

    fn placeholder(key: &str, label: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            label: label.into(),
            description: None,
            group: String::new(),
            kind: OptionKind::Placeholder,
            encoded_patterns: "[]".to_string(),
            selected: false,
        }
    }

    pub fn is_selectable(&self) -> bool {
        self.kind != OptionKind::Placeholder
    }

    pub fn decode_patterns(&self) -> Result<Vec<String>, ScopeError> {
        serde_json::from_str::<Vec<String>>(&self.encoded_patterns)
            .map(normalize_patterns)
            .map_err(|e| ScopeError::PatternParseFailure {
                key: self.key.clone(),
                reason: e.to_string(),
            })
    }
}

fn encode_patterns(patterns: &[String]) -> String {
    serde_json::to_string(patterns).unwrap_or_else(|_| "[]".to_string())
}

/// Splits user-typed patterns on commas and whitespace.
pub fn parse_manual_patterns(text: &str) -> Vec<String> {
    normalize_patterns(text.split(|c: char| c == ',' || c.is_whitespace()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSurface {
    options: Vec<SurfaceOption>,
    status: SurfaceStatus,
}

impl Default for SelectionSurface {
    fn default() -> Self {
        Self::empty(SurfaceStatus::Domestic)
    }
}

impl SelectionSurface {
    pub fn empty(status: SurfaceStatus) -> Self {
        Self {
            options: Vec::new(),
            status,
        }
    }

    pub fn loading() -> Self {
        Self {
            options: vec![SurfaceOption::placeholder("__loading", "Loading FIR catalog…")],
            status: SurfaceStatus::Loading,
        }
    }

    pub fn load_failed(reason: &str) -> Self {
        Self {
            options: vec![SurfaceOption::placeholder(
                "__failed",
                format!("FIR catalog unavailable ({})", reason),
            )],
            status: SurfaceStatus::LoadFailed,
        }
    }

    /// Global presets, then regional groups, then individual prefixes bucketed
    /// by continent, then the custom pattern slot.
    pub fn from_catalog(catalog: &ScopeCatalog) -> Self {
        let mut options = Vec::with_capacity(catalog.len() + 1);

        options.extend(catalog.global().map(|e| SurfaceOption::from_entry(e, GROUP_GLOBAL)));
        options.extend(catalog.regional().map(|e| SurfaceOption::from_entry(e, GROUP_REGIONAL)));

        for (region, entries) in group_individual(catalog) {
            for entry in entries {
                options.push(SurfaceOption::from_entry(entry, region.as_str()));
            }
        }

        options.push(SurfaceOption {
            key: MANUAL_KEY.to_string(),
            label: "Custom".to_string(),
            description: Some("Comma-separated prefixes, e.g. EG*, LF*".to_string()),
            group: GROUP_CUSTOM.to_string(),
            kind: OptionKind::Scope(Section::Manual),
            encoded_patterns: "[]".to_string(),
            selected: false,
        });

        Self {
            options,
            status: SurfaceStatus::International,
        }
    }

    /// Used when the legacy taxonomy is absent or fails.
    pub fn domestic_fallback() -> Self {
        Self {
            options: vec![
                SurfaceOption::legacy("CONUS", "Continental US", ["K*"]),
                SurfaceOption::legacy("ALASKA", "Alaska", ["PA*"]),
                SurfaceOption::legacy("HAWAII", "Hawaii", ["PH*"]),
            ],
            status: SurfaceStatus::Domestic,
        }
    }

    pub fn push(&mut self, option: SurfaceOption) {
        self.options.push(option);
    }

    pub fn options(&self) -> &[SurfaceOption] {
        &self.options
    }

    pub fn status(&self) -> SurfaceStatus {
        self.status
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn option(&self, key: &str) -> Option<&SurfaceOption> {
        self.options.iter().find(|o| o.key == key)
    }

    /// Replaces the selection. Unknown keys and placeholders are ignored.
    pub fn select<S: AsRef<str>>(&mut self, keys: &[S]) {
        let wanted: HashSet<&str> = keys.iter().map(|k| k.as_ref()).collect();
        for option in &mut self.options {
            option.selected = option.is_selectable() && wanted.contains(option.key.as_str());
        }
        for key in &wanted {
            if self.option(key).is_none() {
                debug!("Ignoring unknown scope option — key={}", key);
            }
        }
    }

    pub fn clear_selection(&mut self) {
        for option in &mut self.options {
            option.selected = false;
        }
    }

    /// Stores user-typed patterns on the custom slot and selects it when any
    /// pattern was given. Returns false when there is no custom slot.
    pub fn set_manual_patterns(&mut self, text: &str) -> bool {
        let patterns = parse_manual_patterns(text);
        match self.options.iter_mut().find(|o| o.key == MANUAL_KEY) {
            Some(option) => {
                option.selected = !patterns.is_empty();
                option.label = if patterns.is_empty() {
                    "Custom".to_string()
                } else {
                    format!("Custom ({})", patterns.join(", "))
                };
                option.encoded_patterns = encode_patterns(&patterns);
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> impl Iterator<Item = &SurfaceOption> {
        self.options.iter().filter(|o| o.selected)
    }

    /// Escape hatch for hosts that edit options in place (legacy wiring).
    pub fn options_mut(&mut self) -> &mut [SurfaceOption] {
        &mut self.options
    }
}
