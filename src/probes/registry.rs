//! Suite registry
//!
//! Central registry of the built-in suites. New suites should be registered
//! here.
//!
//! Registration order is the order `railcheck list` prints them in.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

use super::suite::Suite;
use super::{CorsSuite, DeploymentSuite, RailwayConfigSuite};

/// Suite run when neither the command line nor the config names one
pub const DEFAULT_SUITE: &str = "config";

/// Global registry of all built-in suites
pub static SUITES: Lazy<IndexMap<&'static str, Arc<dyn Suite>>> = Lazy::new(|| {
    let mut m: IndexMap<&'static str, Arc<dyn Suite>> = IndexMap::new();

    m.insert("config", Arc::new(RailwayConfigSuite));
    m.insert("deployment", Arc::new(DeploymentSuite));
    m.insert("cors", Arc::new(CorsSuite));

    m
});

/// Get a suite by name
pub fn get_suite(name: &str) -> Option<Arc<dyn Suite>> {
    SUITES.get(name).cloned()
}

/// List all built-in suite names, in registration order
pub fn list_suites() -> Vec<&'static str> {
    SUITES.keys().copied().collect()
}
