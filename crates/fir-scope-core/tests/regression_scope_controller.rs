// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz
//
// End-to-end behaviour of the scope controller: mode toggles, selections,
// wire tokens and degraded operation when the catalog cannot be loaded.

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use fir_scope_core::surface::MANUAL_KEY;
use fir_scope_core::{
    classify, CatalogLoader, CatalogSource, ModeTransition, RegionLabel, ScopeCatalog,
    ScopeController, ScopeError, ScopeMode, SelectionAggregator, SelectionSurface, SurfaceStatus,
};

const CATALOG: &str = r#"{
    "global": {
        "ALL": { "label": "All International", "patterns": ["*"] }
    },
    "regional": {
        "UKFR": { "label": "UK & France", "patterns": ["EG*", "LF*"] },
        "EURNAT": { "label": "Europe & North Africa", "patterns": ["E*", "L*", "GM*", "DA*", "DT*", "HL*", "HE*"] }
    },
    "byIcaoPrefix": {
        "EG": { "label": "United Kingdom", "patterns": ["EG*"] },
        "LF": { "label": "France", "patterns": ["LF*"] },
        "RJ": { "label": "Japan", "patterns": ["RJ*", "RO*"] },
        "UU": { "label": "Russia (Moscow)", "patterns": ["UU*"] }
    }
}"#;

struct Scripted {
    body: Result<&'static str, &'static str>,
    calls: Arc<AtomicUsize>,
}

impl CatalogSource for Scripted {
    fn fetch(&self) -> Result<String, ScopeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.body
            .map(str::to_string)
            .map_err(|e| ScopeError::LoadFailure(e.to_string()))
    }

    fn describe(&self) -> String {
        "scripted".into()
    }
}

/// Answers after a delay, like a slow network.
struct Slow {
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

impl CatalogSource for Slow {
    fn fetch(&self) -> Result<String, ScopeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        Ok(CATALOG.to_string())
    }

    fn describe(&self) -> String {
        "slow".into()
    }
}

fn slow_controller(delay: Duration) -> (ScopeController, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let loader = CatalogLoader::new(Box::new(Slow {
        delay,
        calls: Arc::clone(&calls),
    }));
    let controller = ScopeController::builder()
        .catalog_loader(Arc::new(loader))
        .build();
    (controller, calls)
}

fn controller_with(body: Result<&'static str, &'static str>) -> (ScopeController, Arc<AtomicUsize>) {
    let _ = simplelog::TestLogger::init(simplelog::LevelFilter::Debug, simplelog::Config::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let loader = CatalogLoader::new(Box::new(Scripted {
        body,
        calls: Arc::clone(&calls),
    }));
    let controller = ScopeController::builder()
        .catalog_loader(Arc::new(loader))
        .build();
    (controller, calls)
}

// =====================================================================
// Mode toggles
// =====================================================================

#[test]
fn test_mode_round_trip_restores_empty_scope() {
    let (mut c, _) = controller_with(Ok(CATALOG));

    assert_eq!(c.enter_international(), SurfaceStatus::International);
    let scope = c.select(&["UKFR", "RJ"]);
    assert!(!scope.patterns().is_empty());
    assert!(!scope.token().is_empty());

    assert_eq!(c.set_mode(ScopeMode::Domestic), ModeTransition::Domestic);
    assert!(c.active_patterns().is_empty());
    assert_eq!(c.active_scope().token(), "");
    assert_eq!(c.surface().status(), SurfaceStatus::Domestic);
}

#[test]
fn test_catalog_fetched_once_across_toggles() {
    let (mut c, calls) = controller_with(Ok(CATALOG));
    c.enter_international();
    c.toggle();
    assert_eq!(c.toggle(), ModeTransition::InternationalReady);
    c.complete_catalog_load();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_last_toggle_wins() {
    let (mut c, calls) = controller_with(Ok(CATALOG));
    c.toggle();
    c.toggle();
    c.toggle();
    // the completion event sees international, the last mode toggled to
    assert_eq!(c.wait_catalog_load(), SurfaceStatus::International);
    assert!(c.surface().option("EG").is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_switch_to_international_starts_fetch_that_survives_toggle_back() {
    let (mut c, calls) = slow_controller(Duration::from_millis(300));

    assert_eq!(c.set_mode(ScopeMode::International), ModeTransition::InternationalLoading);
    assert_eq!(c.set_mode(ScopeMode::Domestic), ModeTransition::Domestic);

    // no completion event is delivered; the fetch still runs and caches
    let deadline = Instant::now() + Duration::from_secs(5);
    while c.catalog().is_none() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    assert!(c.catalog().is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(c.surface().status(), SurfaceStatus::Domestic);

    assert_eq!(c.set_mode(ScopeMode::International), ModeTransition::InternationalReady);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_completion_event_does_not_block_while_fetching() {
    let (mut c, calls) = slow_controller(Duration::from_millis(400));
    c.set_mode(ScopeMode::International);

    let started = Instant::now();
    assert_eq!(c.complete_catalog_load(), SurfaceStatus::Loading);
    assert!(started.elapsed() < Duration::from_millis(200));

    assert_eq!(c.wait_catalog_load(), SurfaceStatus::International);
    assert!(c.surface().option("EG").is_some());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// =====================================================================
// Wire token and aggregation
// =====================================================================

#[test]
fn test_token_for_uk_and_france() {
    let (mut c, _) = controller_with(Ok(CATALOG));
    c.enter_international();
    let scope = c.select(&["UKFR"]);
    assert_eq!(scope.token(), "FIR:EG FIR:LF");
    assert_eq!(scope.label(), "UK & France");
}

#[test]
fn test_overlapping_entries() {
    let (mut c, _) = controller_with(Ok(CATALOG));
    c.enter_international();
    let scope = c.select(&["EG", "UKFR"]);

    assert_eq!(scope.patterns().iter().filter(|p| *p == "EG*").count(), 2);
    assert!(c.is_in_scope(&json!({ "departure_icao": "EGLL" })));
    assert!(c.is_in_scope(&json!({ "dep": "LFPG" })));
    assert!(!c.is_in_scope(&json!({ "dep": "RJTT" })));
}

#[test]
fn test_global_preset_is_serialized_and_permits_all() {
    let (mut c, _) = controller_with(Ok(CATALOG));
    c.enter_international();
    assert_eq!(c.select::<&str>(&[]).token(), "");

    let scope = c.select(&["ALL", "EG"]);
    assert_eq!(scope.token(), "FIR: FIR:EG");
    assert!(c.is_in_scope(&json!({ "dep": "KJFK" })));

    assert_eq!(c.select(&["ALL"]).token(), "FIR:");
}

#[test]
fn test_manual_patterns_join_selection() {
    let (mut c, _) = controller_with(Ok(CATALOG));
    c.enter_international();
    c.select(&["EG"]);
    let scope = c.set_manual_patterns("ed*, lo*");
    assert_eq!(scope.patterns(), &["EG*", "ED*", "LO*"]);
    assert_eq!(scope.token(), "FIR:EG FIR:ED FIR:LO");
    assert!(c.surface().option(MANUAL_KEY).unwrap().selected);
}

#[test]
fn test_corrupt_option_contributes_nothing() {
    let catalog = ScopeCatalog::from_json(CATALOG).unwrap();
    let mut surface = SelectionSurface::from_catalog(&catalog);
    surface.select(&["EG", "LF"]);
    for option in surface.options_mut() {
        if option.key == "EG" {
            option.encoded_patterns = "[\"EG*\"".into();
        }
    }

    let mut aggregator = SelectionAggregator::new();
    let scope = aggregator.recompute_from_surface(&surface, ScopeMode::International);
    assert_eq!(scope.patterns(), &["LF*"]);
    assert_eq!(scope.label(), "France, United Kingdom");
}

#[test]
fn test_active_patterns_is_a_copy() {
    let (mut c, _) = controller_with(Ok(CATALOG));
    c.enter_international();
    c.select(&["EG"]);
    let mut copy = c.active_patterns();
    copy.push("KZ*".into());
    assert_eq!(c.active_patterns(), vec!["EG*"]);

    let filter = c.flight_filter();
    c.select(&["RJ"]);
    // an existing filter keeps the snapshot it was built from
    assert!(filter.is_in_scope(&json!({ "dep": "EGLL" })));
    assert!(!c.is_in_scope(&json!({ "dep": "EGLL" })));
}

#[test]
fn test_observers_see_every_recompute_in_order() {
    let (mut c, _) = controller_with(Ok(CATALOG));
    let seen = Arc::new(Mutex::new(Vec::new()));

    let first = Arc::clone(&seen);
    c.subscribe(move |scope| first.lock().unwrap().push(format!("advisory:{}", scope.label())));
    let second = Arc::clone(&seen);
    c.subscribe(move |scope| second.lock().unwrap().push(format!("list:{}", scope.label())));

    c.enter_international();
    seen.lock().unwrap().clear();

    c.select(&["EG"]);
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["advisory:United Kingdom", "list:United Kingdom"]
    );
}

// =====================================================================
// Degraded operation
// =====================================================================

#[test]
fn test_load_failure_shows_placeholder_and_permits_all() {
    let (mut c, calls) = controller_with(Err("connection reset"));

    assert_eq!(c.enter_international(), SurfaceStatus::LoadFailed);
    assert!(c.is_international_mode_active());
    let placeholder = &c.surface().options()[0];
    assert!(!placeholder.is_selectable());
    assert!(placeholder.label.contains("connection reset"));

    assert!(c.active_patterns().is_empty());
    assert_eq!(c.active_scope().label(), "International");
    for dep in ["EGLL", "KJFK", "RJTT"] {
        assert!(c.is_in_scope(&json!({ "dep": dep })));
    }
    assert!(c.is_in_scope(&json!({})));

    // another completion event retries the fetch
    assert_eq!(c.complete_catalog_load(), SurfaceStatus::Loading);
    assert_eq!(c.wait_catalog_load(), SurfaceStatus::LoadFailed);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_unparseable_catalog_is_load_failure() {
    let (mut c, _) = controller_with(Ok("{\"global\": 7"));
    assert_eq!(c.enter_international(), SurfaceStatus::LoadFailed);
}

#[test]
fn test_domestic_mode_bypasses_filter() {
    let (c, _) = controller_with(Ok(CATALOG));
    assert!(c.is_in_scope(&json!({ "dep": "BEGL" })));
    assert!(c.is_in_scope(&json!({})));
}

// =====================================================================
// Region grouping is presentation only
// =====================================================================

#[test]
fn test_region_grouping_on_surface() {
    let (mut c, _) = controller_with(Ok(CATALOG));
    c.enter_international();

    assert_eq!(classify("E"), RegionLabel::Europe);
    assert_eq!(classify("Z9"), RegionLabel::NorthAmericaInternational);
    assert_eq!(c.surface().option("UU").unwrap().group, "Europe");
    assert_eq!(c.surface().option("RJ").unwrap().group, "Asia-Pacific");
}
