#![doc(test(attr(deny(warnings))))]

//! SpendWise core: expense categories with recurrence rules, the month
//! occurrence calendar built from them, and the periodic spending reports.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod notify;
pub mod recurrence;
pub mod report;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("SpendWise tracing initialized.");
    });
}
