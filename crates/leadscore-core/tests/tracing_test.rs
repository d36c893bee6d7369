//! Tests for the tracing setup.

use std::sync::Mutex;

use leadscore_core::tracing::init_tracing;

static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_init_tracing_idempotent() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
}

#[test]
fn test_invalid_filter_falls_back() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("LEADSCORE_LOG", "this_is_garbage=not_a_level");
    init_tracing();
    std::env::remove_var("LEADSCORE_LOG");
}
