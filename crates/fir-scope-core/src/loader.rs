// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Fetching and caching of the international scope catalog.
//!
//! The catalog is loaded at most once per session. Concurrent callers share
//! a single in-flight fetch and all observe its outcome; a failed fetch leaves
//! the cache empty so the next call retries.

use crate::catalog::ScopeCatalog;
use crate::error::ScopeError;
use log::{debug, error, info};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

/// Where the raw catalog document comes from.
pub trait CatalogSource: Send + Sync {
    fn fetch(&self) -> Result<String, ScopeError>;

    /// Short human-readable origin, used in logs.
    fn describe(&self) -> String;
}

pub struct HttpCatalogSource {
    url: String,
    timeout: Duration,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl CatalogSource for HttpCatalogSource {
    fn fetch(&self) -> Result<String, ScopeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        let response = client.get(&self.url).send()?.error_for_status()?;
        let body = response.text()?;

        debug!("Downloaded scope catalog — url={} bytes={}", self.url, body.len());
        Ok(body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for FileCatalogSource {
    fn fetch(&self) -> Result<String, ScopeError> {
        std::fs::read_to_string(&self.path).map_err(|e| {
            ScopeError::LoadFailure(format!("{}: {}", self.path.display(), e))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

type Outcome = Result<Arc<ScopeCatalog>, ScopeError>;

/// One outstanding fetch that any number of callers can wait on.
struct Flight {
    outcome: Mutex<Option<Outcome>>,
    done: Condvar,
}

impl Flight {
    fn new() -> Self {
        Self {
            outcome: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn complete(&self, outcome: Outcome) {
        *relock(&self.outcome) = Some(outcome);
        self.done.notify_all();
    }

    fn wait(&self) -> Outcome {
        let mut guard = relock(&self.outcome);
        loop {
            if let Some(outcome) = guard.as_ref() {
                return outcome.clone();
            }
            guard = self
                .done
                .wait(guard)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }
}

enum Slot {
    Empty,
    Pending(Arc<Flight>),
    Ready(Arc<ScopeCatalog>),
}

pub struct CatalogLoader {
    source: Box<dyn CatalogSource>,
    slot: Mutex<Slot>,
}

impl CatalogLoader {
    pub fn new(source: Box<dyn CatalogSource>) -> Self {
        Self {
            source,
            slot: Mutex::new(Slot::Empty),
        }
    }

    /// Returns the catalog, fetching it if nobody has yet. Callers arriving
    /// while a fetch is running wait for that fetch instead of starting one.
    pub fn load(&self) -> Result<Arc<ScopeCatalog>, ScopeError> {
        let (flight, leader) = {
            let mut slot = relock(&self.slot);
            match &*slot {
                Slot::Ready(catalog) => return Ok(Arc::clone(catalog)),
                Slot::Pending(flight) => (Arc::clone(flight), false),
                Slot::Empty => {
                    let flight = Arc::new(Flight::new());
                    *slot = Slot::Pending(Arc::clone(&flight));
                    (flight, true)
                }
            }
        };

        if !leader {
            debug!("Joining in-flight catalog fetch — source={}", self.source.describe());
            return flight.wait();
        }

        info!("Fetching scope catalog — source={}", self.source.describe());
        // A panicking source must still release the waiters and reset the slot.
        let fetched = panic::catch_unwind(AssertUnwindSafe(|| self.source.fetch()))
            .unwrap_or_else(|_| Err(ScopeError::LoadFailure("catalog fetch panicked".into())));
        let outcome = fetched
            .and_then(|body| ScopeCatalog::from_json(&body))
            .map(Arc::new);

        {
            let mut slot = relock(&self.slot);
            *slot = match &outcome {
                Ok(catalog) => Slot::Ready(Arc::clone(catalog)),
                Err(_) => Slot::Empty,
            };
        }

        match &outcome {
            Ok(catalog) => info!("Scope catalog loaded — entries={}", catalog.len()),
            Err(e) => error!("Scope catalog load failed — source={} error={}", self.source.describe(), e),
        }

        flight.complete(outcome.clone());
        outcome
    }

    /// Starts a fetch on a background thread. A later `load()` joins it.
    pub fn prefetch(self: &Arc<Self>) -> JoinHandle<Result<Arc<ScopeCatalog>, ScopeError>> {
        let loader = Arc::clone(self);
        std::thread::spawn(move || loader.load())
    }

    /// The cached catalog, without triggering a fetch.
    pub fn cached(&self) -> Option<Arc<ScopeCatalog>> {
        match &*relock(&self.slot) {
            Slot::Ready(catalog) => Some(Arc::clone(catalog)),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(&*relock(&self.slot), Slot::Pending(_))
    }
}

fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
