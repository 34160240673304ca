//! Environment lookups for `${NAME}` substitution
//!
//! Reading the process environment is global state, so the lookup is a
//! capability installed on each [`Config`](crate::Config). Tests hand in a
//! map or a closure instead of touching `std::env`.

use std::collections::HashMap;

/// A key to value lookup used by the environment substitution pass
pub trait Environment: Send + Sync {
    /// Return the value of `name`, or `None` when it is unset
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads variables from the running process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<F> Environment for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn var(&self, name: &str) -> Option<String> {
        self(name)
    }
}
