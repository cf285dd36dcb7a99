//! Registry of dialect profiles.

use super::Dialect;
use std::sync::{OnceLock, PoisonError, RwLock};

/// Global registry of dialects.
static DIALECTS: RwLock<Vec<&'static Dialect>> = RwLock::new(Vec::new());
static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Register a custom dialect.
///
/// A dialect registered under an existing name shadows the earlier one.
/// Built-in dialects are registered automatically on first use.
pub fn register_dialect(dialect: &'static Dialect) {
    init_builtin();
    DIALECTS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .push(dialect);
}

/// Initialize built-in dialects (called automatically on first use).
fn init_builtin() {
    INITIALIZED.get_or_init(|| {
        let mut dialects = DIALECTS.write().unwrap_or_else(PoisonError::into_inner);
        dialects.push(&super::OPENAI);
        dialects.push(&super::CLAUDE);
        dialects.push(&super::GEMINI);
        dialects.push(&super::LLAMA);
        dialects.push(&super::OPENAPI_3_0);
        dialects.push(&super::OPENAPI_3_1);
    });
}

/// Get a dialect by name.
pub fn dialect(name: &str) -> Option<&'static Dialect> {
    init_builtin();
    DIALECTS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .iter()
        .rev()
        .find(|d| d.name == name)
        .copied()
}

/// All registered dialects, later registrations shadowing earlier ones.
pub fn dialects() -> Vec<&'static Dialect> {
    init_builtin();
    let all = DIALECTS.read().unwrap_or_else(PoisonError::into_inner);
    let mut visible: Vec<&'static Dialect> = Vec::new();
    for dialect in all.iter() {
        match visible.iter_mut().find(|d| d.name == dialect.name) {
            Some(slot) => *slot = dialect,
            None => visible.push(dialect),
        }
    }
    visible
}

/// Names of all registered dialects.
pub fn dialect_names() -> Vec<&'static str> {
    dialects().iter().map(|d| d.name).collect()
}
