// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::error::ScopeError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which part of the selection surface an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Global,
    Regional,
    Individual,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeEntry {
    pub key: String,
    pub label: String,
    pub description: Option<String>,
    /// Upper-cased prefix patterns, never empty.
    pub patterns: Vec<String>,
    pub section: Section,
}

impl ScopeEntry {
    /// Builds an entry, normalizing patterns. Returns `None` when no usable
    /// pattern survives.
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        patterns: impl IntoIterator<Item = impl AsRef<str>>,
        section: Section,
    ) -> Option<Self> {
        let patterns = normalize_patterns(patterns);
        if patterns.is_empty() {
            return None;
        }
        Some(Self {
            key: key.into(),
            label: label.into(),
            description: None,
            patterns,
            section,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Trims, upper-cases and drops blank patterns, keeping order.
pub fn normalize_patterns(patterns: impl IntoIterator<Item = impl AsRef<str>>) -> Vec<String> {
    patterns
        .into_iter()
        .map(|p| p.as_ref().trim().to_uppercase())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Raw entry as it appears in the catalog document.
#[derive(Debug, Clone, Deserialize)]
struct RawEntry {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    patterns: Vec<String>,
}

/// Shape of the fetched JSON document. Any missing section is empty.
#[derive(Debug, Clone, Default, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    global: BTreeMap<String, RawEntry>,
    #[serde(default)]
    regional: BTreeMap<String, RawEntry>,
    #[serde(default, rename = "byIcaoPrefix")]
    by_icao_prefix: BTreeMap<String, RawEntry>,
}

/// The international taxonomy. Immutable once built; shared behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeCatalog {
    global: BTreeMap<String, ScopeEntry>,
    regional: BTreeMap<String, ScopeEntry>,
    by_prefix: BTreeMap<String, ScopeEntry>,
}

impl ScopeCatalog {
    pub fn from_json(content: &str) -> Result<Self, ScopeError> {
        let doc: CatalogDocument = serde_json::from_str(content)
            .map_err(|e| ScopeError::LoadFailure(format!("invalid catalog document: {}", e)))?;

        let catalog = Self {
            global: build_section(doc.global, Section::Global),
            regional: build_section(doc.regional, Section::Regional),
            by_prefix: build_section(doc.by_icao_prefix, Section::Individual),
        };

        debug!(
            "Parsed scope catalog — global={} regional={} individual={}",
            catalog.global.len(),
            catalog.regional.len(),
            catalog.by_prefix.len()
        );
        Ok(catalog)
    }

    pub fn global(&self) -> impl Iterator<Item = &ScopeEntry> {
        self.global.values()
    }

    pub fn regional(&self) -> impl Iterator<Item = &ScopeEntry> {
        self.regional.values()
    }

    pub fn individual(&self) -> impl Iterator<Item = &ScopeEntry> {
        self.by_prefix.values()
    }

    /// Lookup of an individual entry by its ICAO region prefix (case-insensitive).
    pub fn by_prefix(&self, prefix: &str) -> Option<&ScopeEntry> {
        self.by_prefix.get(&prefix.trim().to_uppercase())
    }

    /// Finds an entry in any section. Global wins over regional, regional over
    /// individual, when keys collide across sections.
    pub fn find(&self, key: &str) -> Option<&ScopeEntry> {
        self.global
            .get(key)
            .or_else(|| self.regional.get(key))
            .or_else(|| self.by_prefix(key))
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.regional.len() + self.by_prefix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn build_section(raw: BTreeMap<String, RawEntry>, section: Section) -> BTreeMap<String, ScopeEntry> {
    let mut out = BTreeMap::new();
    for (key, entry) in raw {
        let key = match section {
            Section::Individual => key.trim().to_uppercase(),
            _ => key.trim().to_string(),
        };
        if key.is_empty() {
            warn!("Skipping catalog entry with blank key — section={:?}", section);
            continue;
        }
        let label = entry
            .label
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| key.clone());

        match ScopeEntry::new(key.clone(), label, entry.patterns, section) {
            Some(mut scope_entry) => {
                scope_entry.description = entry.description.filter(|d| !d.trim().is_empty());
                out.insert(key, scope_entry);
            }
            None => {
                warn!(
                    "Skipping catalog entry without patterns — section={:?} key={}",
                    section, key
                );
            }
        }
    }
    out
}
