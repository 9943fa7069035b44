// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which taxonomy feeds the selection surface. Every session starts domestic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    #[default]
    Domestic,
    International,
}

impl ScopeMode {
    pub fn other(self) -> Self {
        match self {
            ScopeMode::Domestic => ScopeMode::International,
            ScopeMode::International => ScopeMode::Domestic,
        }
    }
}

impl fmt::Display for ScopeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeMode::Domestic => f.write_str("domestic"),
            ScopeMode::International => f.write_str("international"),
        }
    }
}

impl FromStr for ScopeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "domestic" | "dom" => Ok(ScopeMode::Domestic),
            "international" | "intl" => Ok(ScopeMode::International),
            other => Err(format!("unknown scope mode '{}'", other)),
        }
    }
}
