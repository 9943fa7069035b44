// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Owner of the scope mode, the selection surface and the active scope.
//!
//! All mutation goes through `&mut ScopeController`, one event at a time.
//! Other components only ever see snapshots (`Arc<ActiveScope>`,
//! `FlightScopeFilter`, cloned pattern lists).

use crate::aggregate::{ActiveScope, SelectionAggregator, SubscriptionId};
use crate::catalog::ScopeCatalog;
use crate::error::ScopeError;
use crate::filter::{FlightRecord, FlightScopeFilter};
use crate::loader::CatalogLoader;
use crate::mode::ScopeMode;
use crate::surface::{SelectionSurface, SurfaceStatus};
use log::{debug, info, warn};
use std::sync::Arc;
use std::thread::JoinHandle;

type PendingLoad = JoinHandle<Result<Arc<ScopeCatalog>, ScopeError>>;

/// The single-region taxonomy that fills the surface in domestic mode.
pub trait LegacyTaxonomy {
    fn populate(&self, surface: &mut SelectionSurface) -> Result<(), ScopeError>;
}

impl<F> LegacyTaxonomy for F
where
    F: Fn(&mut SelectionSurface) -> Result<(), ScopeError>,
{
    fn populate(&self, surface: &mut SelectionSurface) -> Result<(), ScopeError> {
        self(surface)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTransition {
    /// Already in the requested mode.
    Unchanged,
    Domestic,
    /// Catalog was cached; the surface is populated.
    InternationalReady,
    /// Fetch started in the background; the surface shows the loading
    /// placeholder until `complete_catalog_load` sees the result.
    InternationalLoading,
    /// No catalog source was wired in; the controller stays domestic.
    Unavailable,
}

#[derive(Default)]
pub struct ScopeControllerBuilder {
    loader: Option<Arc<CatalogLoader>>,
    legacy: Option<Box<dyn LegacyTaxonomy>>,
}

impl ScopeControllerBuilder {
    pub fn catalog_loader(mut self, loader: Arc<CatalogLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn legacy(mut self, legacy: Box<dyn LegacyTaxonomy>) -> Self {
        self.legacy = Some(legacy);
        self
    }

    pub fn build(self) -> ScopeController {
        if self.loader.is_none() {
            warn!(
                "{}; international scope toggle disabled",
                ScopeError::MissingElement("catalog source".into())
            );
        }
        let surface = domestic_surface(self.legacy.as_deref());
        ScopeController {
            mode: ScopeMode::Domestic,
            loader: self.loader,
            legacy: self.legacy,
            surface,
            aggregator: SelectionAggregator::new(),
            pending: None,
        }
    }
}

pub struct ScopeController {
    mode: ScopeMode,
    loader: Option<Arc<CatalogLoader>>,
    legacy: Option<Box<dyn LegacyTaxonomy>>,
    surface: SelectionSurface,
    aggregator: SelectionAggregator,
    /// Background fetch started by a switch to international. Survives a
    /// switch back to domestic so the result still lands in the cache.
    pending: Option<PendingLoad>,
}

impl ScopeController {
    pub fn builder() -> ScopeControllerBuilder {
        ScopeControllerBuilder::default()
    }

    pub fn mode(&self) -> ScopeMode {
        self.mode
    }

    pub fn is_international_mode_active(&self) -> bool {
        self.mode == ScopeMode::International
    }

    /// False when no catalog source was provided at construction.
    pub fn is_toggle_available(&self) -> bool {
        self.loader.is_some()
    }

    pub fn surface(&self) -> &SelectionSurface {
        &self.surface
    }

    pub fn catalog(&self) -> Option<Arc<ScopeCatalog>> {
        self.loader.as_ref().and_then(|l| l.cached())
    }

    pub fn set_mode(&mut self, mode: ScopeMode) -> ModeTransition {
        if mode == self.mode {
            return ModeTransition::Unchanged;
        }

        match mode {
            ScopeMode::International => {
                if self.pending.as_ref().is_some_and(|h| h.is_finished()) {
                    // A stale result from an earlier visit; the cache already holds any success.
                    self.pending = None;
                }
                let Some(loader) = self.loader.as_ref() else {
                    warn!(
                        "Ignoring switch to international — {}",
                        ScopeError::MissingElement("catalog source".into())
                    );
                    return ModeTransition::Unavailable;
                };
                let cached = loader.cached();

                self.mode = ScopeMode::International;
                info!("Scope mode switched — mode={}", self.mode);

                let transition = match cached {
                    Some(catalog) => {
                        self.surface = SelectionSurface::from_catalog(&catalog);
                        ModeTransition::InternationalReady
                    }
                    None => {
                        self.surface = SelectionSurface::loading();
                        self.start_fetch();
                        ModeTransition::InternationalLoading
                    }
                };
                self.aggregator.clear(ScopeMode::International);
                transition
            }
            ScopeMode::Domestic => {
                self.mode = ScopeMode::Domestic;
                info!("Scope mode switched — mode={}", self.mode);

                self.aggregator.clear(ScopeMode::Domestic);
                self.surface = domestic_surface(self.legacy.as_deref());
                ModeTransition::Domestic
            }
        }
    }

    pub fn toggle(&mut self) -> ModeTransition {
        self.set_mode(self.mode.other())
    }

    /// Catalog-load completion event. Never blocks: while the background
    /// fetch is still running this reports `Loading` and keeps the handle.
    /// A finished result repopulates the surface for whatever mode is active
    /// now; the catalog itself is cached either way. After a failed load in
    /// international mode, calling this again starts a retry.
    pub fn complete_catalog_load(&mut self) -> SurfaceStatus {
        match self.pending.take() {
            Some(handle) if handle.is_finished() => {
                let outcome = join_fetch(handle);
                self.apply_catalog(outcome)
            }
            Some(handle) => {
                self.pending = Some(handle);
                self.surface.status()
            }
            None => {
                if self.needs_catalog() {
                    self.surface = SelectionSurface::loading();
                    self.start_fetch();
                }
                self.surface.status()
            }
        }
    }

    /// Blocking form of `complete_catalog_load` for hosts without an event
    /// loop (the CLI, tests). Waits for the background fetch, starting one
    /// first if international mode still lacks a catalog.
    pub fn wait_catalog_load(&mut self) -> SurfaceStatus {
        if self.pending.is_none() && self.needs_catalog() {
            self.start_fetch();
        }
        match self.pending.take() {
            Some(handle) => {
                let outcome = join_fetch(handle);
                self.apply_catalog(outcome)
            }
            None => self.surface.status(),
        }
    }

    /// Switches to international and resolves the catalog in one step.
    pub fn enter_international(&mut self) -> SurfaceStatus {
        if self.set_mode(ScopeMode::International) == ModeTransition::Unavailable {
            return self.surface.status();
        }
        self.wait_catalog_load()
    }

    fn needs_catalog(&self) -> bool {
        self.mode == ScopeMode::International
            && self.surface.status() != SurfaceStatus::International
    }

    fn start_fetch(&mut self) {
        if self.pending.is_some() {
            return;
        }
        if let Some(loader) = self.loader.as_ref() {
            debug!("Starting background catalog fetch");
            self.pending = Some(loader.prefetch());
        }
    }

    fn apply_catalog(&mut self, outcome: Result<Arc<ScopeCatalog>, ScopeError>) -> SurfaceStatus {
        if self.mode != ScopeMode::International {
            debug!("Catalog load finished after leaving international mode; surface unchanged");
            return self.surface.status();
        }

        self.surface = match outcome {
            Ok(catalog) => SelectionSurface::from_catalog(&catalog),
            Err(e) => SelectionSurface::load_failed(&e.to_string()),
        };
        self.aggregator
            .recompute_from_surface(&self.surface, ScopeMode::International);
        self.surface.status()
    }

    pub fn select<S: AsRef<str>>(&mut self, keys: &[S]) -> Arc<ActiveScope> {
        self.surface.select(keys);
        self.selection_changed()
    }

    pub fn set_manual_patterns(&mut self, text: &str) -> Arc<ActiveScope> {
        if !self.surface.set_manual_patterns(text) {
            debug!("No custom pattern slot on the current surface — mode={}", self.mode);
        }
        self.selection_changed()
    }

    /// Selection-surface change event. Only international selections feed the
    /// active scope; in domestic mode it stays unrestricted.
    pub fn selection_changed(&mut self) -> Arc<ActiveScope> {
        match self.mode {
            ScopeMode::International => self
                .aggregator
                .recompute_from_surface(&self.surface, ScopeMode::International),
            ScopeMode::Domestic => self.aggregator.clear(ScopeMode::Domestic),
        }
    }

    pub fn active_scope(&self) -> Arc<ActiveScope> {
        self.aggregator.current()
    }

    /// A copy; later recomputes do not touch it.
    pub fn active_patterns(&self) -> Vec<String> {
        self.aggregator.current().patterns().to_vec()
    }

    pub fn flight_filter(&self) -> FlightScopeFilter {
        FlightScopeFilter::new(self.mode, self.aggregator.current())
    }

    pub fn is_in_scope<F: FlightRecord + ?Sized>(&self, flight: &F) -> bool {
        self.flight_filter().is_in_scope(flight)
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(&ActiveScope) + Send + Sync + 'static,
    {
        self.aggregator.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.aggregator.unsubscribe(id)
    }
}

fn join_fetch(handle: PendingLoad) -> Result<Arc<ScopeCatalog>, ScopeError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(ScopeError::LoadFailure("catalog fetch panicked".into())))
}

fn domestic_surface(legacy: Option<&dyn LegacyTaxonomy>) -> SelectionSurface {
    let Some(legacy) = legacy else {
        debug!("No legacy taxonomy wired in; using built-in domestic entries");
        return SelectionSurface::domestic_fallback();
    };

    let mut surface = SelectionSurface::empty(SurfaceStatus::Domestic);
    match legacy.populate(&mut surface) {
        Ok(()) if !surface.is_empty() => surface,
        Ok(()) => {
            warn!("Legacy taxonomy produced no entries; using built-in domestic entries");
            SelectionSurface::domestic_fallback()
        }
        Err(e) => {
            warn!("Legacy taxonomy failed; using built-in domestic entries — error={}", e);
            SelectionSurface::domestic_fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::CatalogSource;
    use crate::surface::SurfaceOption;
    use serde_json::json;

    struct Fixed(&'static str);

    impl CatalogSource for Fixed {
        fn fetch(&self) -> Result<String, ScopeError> {
            Ok(self.0.to_string())
        }

        fn describe(&self) -> String {
            "fixed".into()
        }
    }

    const DOC: &str = r#"{
        "regional": { "EUR": { "label": "Europe", "patterns": ["E*", "L*"] } },
        "byIcaoPrefix": {
            "EG": { "label": "United Kingdom", "patterns": ["EG*"] },
            "LF": { "label": "France", "patterns": ["LF*"] }
        }
    }"#;

    fn controller() -> ScopeController {
        ScopeController::builder()
            .catalog_loader(Arc::new(CatalogLoader::new(Box::new(Fixed(DOC)))))
            .build()
    }

    #[test]
    fn test_starts_domestic_with_fallback_surface() {
        let c = controller();
        assert_eq!(c.mode(), ScopeMode::Domestic);
        assert!(!c.is_international_mode_active());
        assert!(c.surface().option("CONUS").is_some());
        assert!(c.active_patterns().is_empty());
    }

    #[test]
    fn test_loading_then_ready() {
        let mut c = controller();
        assert_eq!(c.set_mode(ScopeMode::International), ModeTransition::InternationalLoading);
        assert_eq!(c.surface().status(), SurfaceStatus::Loading);
        assert_eq!(c.active_scope().label(), "International");

        assert_eq!(c.wait_catalog_load(), SurfaceStatus::International);
        assert!(c.surface().option("EG").is_some());

        c.toggle();
        assert_eq!(c.set_mode(ScopeMode::International), ModeTransition::InternationalReady);
    }

    #[test]
    fn test_repeated_activation_is_noop() {
        let mut c = controller();
        c.enter_international();
        c.select(&["EG"]);
        assert_eq!(c.set_mode(ScopeMode::International), ModeTransition::Unchanged);
        assert_eq!(c.active_patterns(), vec!["EG*"]);
    }

    #[test]
    fn test_selection_and_filter() {
        let mut c = controller();
        c.enter_international();
        let scope = c.select(&["EG", "LF"]);
        // surface order: France sorts before United Kingdom within Europe
        assert_eq!(scope.token(), "FIR:LF FIR:EG");
        assert_eq!(scope.label(), "France, United Kingdom");
        assert!(c.is_in_scope(&json!({ "dep": "EGLL" })));
        assert!(!c.is_in_scope(&json!({ "dep": "EDDF" })));
    }

    #[test]
    fn test_late_load_after_leaving_international() {
        let mut c = controller();
        c.set_mode(ScopeMode::International);
        c.set_mode(ScopeMode::Domestic);

        assert_eq!(c.wait_catalog_load(), SurfaceStatus::Domestic);
        assert!(c.surface().option("CONUS").is_some());
        assert!(c.catalog().is_some());
    }

    #[test]
    fn test_missing_loader_disables_toggle() {
        let mut c = ScopeController::builder().build();
        assert!(!c.is_toggle_available());
        assert_eq!(c.toggle(), ModeTransition::Unavailable);
        assert_eq!(c.mode(), ScopeMode::Domestic);
    }

    #[test]
    fn test_legacy_taxonomy_and_fallback() {
        let legacy = |surface: &mut SelectionSurface| -> Result<(), ScopeError> {
            surface.push(SurfaceOption::legacy("ZNY", "New York Center", ["K*"]));
            Ok(())
        };
        let c = ScopeController::builder().legacy(Box::new(legacy)).build();
        assert!(c.surface().option("ZNY").is_some());
        assert!(c.surface().option("CONUS").is_none());

        let broken = |_: &mut SelectionSurface| -> Result<(), ScopeError> {
            Err(ScopeError::MissingElement("legacy selector".into()))
        };
        let c = ScopeController::builder().legacy(Box::new(broken)).build();
        assert!(c.surface().option("CONUS").is_some());
    }

    #[test]
    fn test_domestic_selection_keeps_scope_unrestricted() {
        let mut c = controller();
        let scope = c.select(&["CONUS"]);
        assert!(scope.patterns().is_empty());
        assert_eq!(scope.label(), "Domestic");
    }
}
