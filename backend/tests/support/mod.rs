//! Shared helpers for integration tests.

use parking_lot::{const_mutex, Mutex};

/// Serializes tests that touch process-wide environment variables.
static ENV_LOCK: Mutex<()> = const_mutex(());

/// Set or remove environment variables for the duration of `f`.
///
/// `vars` pairs a name with `Some(value)` to set it or `None` to remove it.
/// Previous values are restored afterwards, also when `f` panics.
pub fn with_env<R>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> R) -> R {
    let _lock = ENV_LOCK.lock();
    let _restore = EnvRestore::apply(vars);
    f()
}

struct EnvRestore(Vec<(String, Option<String>)>);

impl EnvRestore {
    fn apply(vars: &[(&str, Option<&str>)]) -> Self {
        let mut saved: Vec<(String, Option<String>)> = Vec::with_capacity(vars.len());
        for (name, value) in vars {
            if !saved.iter().any(|(seen, _)| seen == name) {
                saved.push((name.to_string(), std::env::var(name).ok()));
            }
            set(name, *value);
        }
        Self(saved)
    }
}

impl Drop for EnvRestore {
    fn drop(&mut self) {
        for (name, value) in self.0.drain(..).rev() {
            set(&name, value.as_deref());
        }
    }
}

fn set(name: &str, value: Option<&str>) {
    match value {
        Some(value) => std::env::set_var(name, value),
        None => std::env::remove_var(name),
    }
}
