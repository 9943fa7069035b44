// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Scope resolution for the traffic-management console: which FIRs the user
//! selected, and whether a flight's departure airport falls inside them.

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod loader;
pub mod matcher;
pub mod mode;
pub mod region;
pub mod surface;

pub use aggregate::{build_token, ActiveScope, SelectionAggregator, SubscriptionId, TOKEN_NAMESPACE};
pub use catalog::{ScopeCatalog, ScopeEntry, Section};
pub use config::ScopeConfig;
pub use controller::{LegacyTaxonomy, ModeTransition, ScopeController};
pub use error::ScopeError;
pub use filter::{FlightRecord, FlightScopeFilter};
pub use loader::{CatalogLoader, CatalogSource, FileCatalogSource, HttpCatalogSource};
pub use matcher::{matches, matches_code, strip_wildcards};
pub use mode::ScopeMode;
pub use region::{classify, RegionLabel};
pub use surface::{SelectionSurface, SurfaceOption, SurfaceStatus};
