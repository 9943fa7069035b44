// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Coarse continental grouping of ICAO region prefixes, for display only.

use crate::catalog::{ScopeCatalog, ScopeEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Variant order is the display order of the grouped surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegionLabel {
    Europe,
    AsiaPacific,
    MiddleEast,
    Africa,
    SouthAmerica,
    NorthAmericaInternational,
}

impl RegionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionLabel::Europe => "Europe",
            RegionLabel::AsiaPacific => "Asia-Pacific",
            RegionLabel::MiddleEast => "Middle East",
            RegionLabel::Africa => "Africa",
            RegionLabel::SouthAmerica => "South America",
            RegionLabel::NorthAmericaInternational => "North America (International)",
        }
    }
}

impl fmt::Display for RegionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consulted top to bottom, first hit wins. The catch-all row is last, so a
/// letter listed both there and in a named row resolves to the named row.
const REGION_TABLE: &[(&[char], RegionLabel)] = &[
    // E: northern Europe, L: southern Europe, B: Iceland/Greenland/Kosovo
    (&['E', 'L', 'B'], RegionLabel::Europe),
    (&['R', 'V', 'W', 'Z', 'Y', 'A', 'N'], RegionLabel::AsiaPacific),
    (&['O'], RegionLabel::MiddleEast),
    (&['D', 'F', 'G', 'H'], RegionLabel::Africa),
    (&['S'], RegionLabel::SouthAmerica),
    // P: Alaska/Hawaii/Pacific territories, A and N overlap with Asia-Pacific above
    (
        &['C', 'K', 'M', 'T', 'P', 'A', 'N'],
        RegionLabel::NorthAmericaInternational,
    ),
];

/// First letter of the Russian and former-Soviet block.
const RUSSIAN_BLOCK: char = 'U';

/// Second letters of U-prefixes west of the Urals (Moscow, St Petersburg,
/// Rostov, Volga, Kaliningrad/Belarus, Ukraine).
const RUSSIAN_EUROPE: &[char] = &['U', 'L', 'R', 'W', 'M', 'K'];

/// Classifies a 1–2 letter ICAO region prefix. Never fails: anything that is
/// not a recognized prefix is North America (International).
pub fn classify(prefix: &str) -> RegionLabel {
    let upper = prefix.trim().to_uppercase();
    if !is_region_prefix(&upper) {
        return RegionLabel::NorthAmericaInternational;
    }

    let mut chars = upper.chars();
    let Some(first) = chars.next() else {
        return RegionLabel::NorthAmericaInternational;
    };

    if first == RUSSIAN_BLOCK {
        return match chars.next() {
            Some(second) if RUSSIAN_EUROPE.contains(&second) => RegionLabel::Europe,
            _ => RegionLabel::AsiaPacific,
        };
    }

    REGION_TABLE
        .iter()
        .find(|(letters, _)| letters.contains(&first))
        .map(|(_, label)| *label)
        .unwrap_or(RegionLabel::NorthAmericaInternational)
}

fn is_region_prefix(prefix: &str) -> bool {
    (1..=2).contains(&prefix.len()) && prefix.chars().all(|c| c.is_ascii_alphabetic())
}

/// Individual catalog entries bucketed by region, in display order.
pub fn group_individual(catalog: &ScopeCatalog) -> BTreeMap<RegionLabel, Vec<&ScopeEntry>> {
    let mut groups: BTreeMap<RegionLabel, Vec<&ScopeEntry>> = BTreeMap::new();
    for entry in catalog.individual() {
        groups.entry(classify(&entry.key)).or_default().push(entry);
    }
    for entries in groups.values_mut() {
        entries.sort_by(|a, b| a.label.cmp(&b.label));
    }
    groups
}
