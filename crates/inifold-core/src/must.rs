//! Convenience accessors with fallbacks
//!
//! The `*_or` accessors never fail: any error (missing option, unfolding
//! failure, bad type) yields the supplied default. The `must_*` accessors
//! take an optional default and panic when there is none; they are meant
//! for start-up code that cannot continue without the value.

use crate::config::Config;
use crate::error::Result;

/// Return the value, else the default, else panic with the error
fn accept_or_terminate<T>(result: Result<T>, default: Option<T>) -> T {
    match (result, default) {
        (Ok(value), _) => value,
        (Err(_), Some(default)) => default,
        (Err(err), None) => panic!("{}", err),
    }
}

impl Config {
    /// [`get_string`](Config::get_string), falling back to `default`
    pub fn get_string_or(&self, section: &str, option: &str, default: impl Into<String>) -> String {
        self.get_string(section, option)
            .unwrap_or_else(|_| default.into())
    }

    /// [`get_int`](Config::get_int), falling back to `default`
    pub fn get_int_or(&self, section: &str, option: &str, default: i64) -> i64 {
        self.get_int(section, option).unwrap_or(default)
    }

    /// [`get_float`](Config::get_float), falling back to `default`
    pub fn get_float_or(&self, section: &str, option: &str, default: f64) -> f64 {
        self.get_float(section, option).unwrap_or(default)
    }

    /// [`get_bool`](Config::get_bool), falling back to `default`
    pub fn get_bool_or(&self, section: &str, option: &str, default: bool) -> bool {
        self.get_bool(section, option).unwrap_or(default)
    }

    /// Resolved string, or `default` on error
    ///
    /// # Panics
    ///
    /// Panics with the lookup error when it fails and `default` is `None`.
    pub fn must_string(&self, section: &str, option: &str, default: Option<&str>) -> String {
        accept_or_terminate(
            self.get_string(section, option),
            default.map(str::to_string),
        )
    }

    /// Integer value, or `default` on error
    ///
    /// # Panics
    ///
    /// Panics with the lookup error when it fails and `default` is `None`.
    pub fn must_int(&self, section: &str, option: &str, default: Option<i64>) -> i64 {
        accept_or_terminate(self.get_int(section, option), default)
    }

    /// Float value, or `default` on error
    ///
    /// # Panics
    ///
    /// Panics with the lookup error when it fails and `default` is `None`.
    pub fn must_float(&self, section: &str, option: &str, default: Option<f64>) -> f64 {
        accept_or_terminate(self.get_float(section, option), default)
    }

    /// Boolean value, or `default` on error
    ///
    /// # Panics
    ///
    /// Panics with the lookup error when it fails and `default` is `None`.
    pub fn must_bool(&self, section: &str, option: &str, default: Option<bool>) -> bool {
        accept_or_terminate(self.get_bool(section, option), default)
    }
}
