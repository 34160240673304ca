//! Main Config type for inifold
//!
//! A `Config` owns every section and its raw values. Reads fall back to the
//! DEFAULT section and unfold `%(name)s` / `${NAME}` references on the way
//! out; stored values are never modified by a read.

use std::fmt;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::env::{Environment, ProcessEnv};
use crate::error::{option_path, Error, Result};
use crate::interpolation::{self, Pattern};
use crate::options::Options;
use crate::section::Section;
use crate::{parser, value, writer};

/// Name of the section every other section inherits from
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// The empty name is an alias for DEFAULT
fn canonical(section: &str) -> &str {
    if section.is_empty() {
        DEFAULT_SECTION
    } else {
        section
    }
}

/// The main configuration container
#[derive(Clone)]
pub struct Config {
    /// Sections in insertion order; DEFAULT is always present
    sections: IndexMap<String, Section>,
    /// Formatting options used by the writer
    options: Options,
    /// Source of `${NAME}` values
    env: Arc<dyn Environment>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("sections", &self.sections)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Create an empty configuration with default formatting
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Create an empty configuration with the given formatting options
    pub fn with_options(options: Options) -> Self {
        let mut sections = IndexMap::new();
        sections.insert(DEFAULT_SECTION.to_string(), Section::new());
        Self {
            sections,
            options,
            env: Arc::new(ProcessEnv),
        }
    }

    /// Replace the environment used for `${NAME}` substitution
    pub fn with_env(mut self, env: impl Environment + 'static) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Formatting options
    pub fn formatting(&self) -> &Options {
        &self.options
    }

    pub fn set_formatting(&mut self, options: Options) {
        self.options = options;
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Parse INI text with default options
    pub fn from_ini(text: &str) -> Result<Self> {
        Self::from_ini_with_options(text, Options::default())
    }

    /// Parse INI text with the given options
    pub fn from_ini_with_options(text: &str, options: Options) -> Result<Self> {
        Self::from_reader(text.as_bytes(), options)
    }

    /// Parse INI text from any buffered reader
    pub fn from_reader<R: BufRead>(reader: R, options: Options) -> Result<Self> {
        let mut config = Self::with_options(options);
        parser::read_into(&mut config, reader, "<input>")?;
        Ok(config)
    }

    /// Load an INI file with default options
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_options(path, Options::default())
    }

    /// Load an INI file with the given options
    pub fn load_with_options(path: impl AsRef<Path>, options: Options) -> Result<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let file = std::fs::File::open(path).map_err(|e| Error::io(&label, e))?;

        let mut config = Self::with_options(options);
        parser::read_into(&mut config, BufReader::new(file), &label)?;
        log::debug!(
            "loaded {} section(s) from {}",
            config.sections.len(),
            label
        );
        Ok(config)
    }

    /// Load several INI files, merging each one into the first
    ///
    /// Later files win for options they define; an empty list gives an empty
    /// configuration.
    pub fn load_merged<P: AsRef<Path>>(paths: &[P], options: Options) -> Result<Self> {
        let Some((first, rest)) = paths.split_first() else {
            return Ok(Self::with_options(options));
        };

        let mut merged = Self::load_with_options(first, options)?;
        for path in rest {
            let next = Self::load_with_options(path, options)?;
            merged.merge(&next);
        }
        Ok(merged)
    }

    // ------------------------------------------------------------------
    // Sections
    // ------------------------------------------------------------------

    /// Add a section; true if it did not exist yet
    pub fn add_section(&mut self, section: &str) -> bool {
        let section = canonical(section);
        if self.sections.contains_key(section) {
            return false;
        }
        self.sections.insert(section.to_string(), Section::new());
        true
    }

    /// Remove a section and all its options
    ///
    /// DEFAULT cannot be removed. Returns false when nothing was removed.
    pub fn remove_section(&mut self, section: &str) -> bool {
        let section = canonical(section);
        if section == DEFAULT_SECTION {
            return false;
        }
        self.sections.shift_remove(section).is_some()
    }

    /// Check whether a section exists (DEFAULT always does)
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(canonical(section))
    }

    /// Section names in insertion order, DEFAULT included
    pub fn sections(&self) -> Vec<String> {
        self.sections.keys().cloned().collect()
    }

    /// Borrow a section
    pub fn section(&self, section: &str) -> Option<&Section> {
        self.sections.get(canonical(section))
    }

    /// `(name, section)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The section's own option names in insertion order
    ///
    /// DEFAULT options are not included. A missing section gives an empty
    /// list.
    pub fn section_options(&self, section: &str) -> Vec<String> {
        self.section(section)
            .map(|s| s.options().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Every option readable from a section: DEFAULT's options followed by
    /// the section's own options not already listed
    pub fn options(&self, section: &str) -> Result<Vec<String>> {
        let own = self
            .section(section)
            .ok_or_else(|| Error::section_not_found(canonical(section)))?;

        let mut names: Vec<String> = self
            .default_section()
            .into_iter()
            .flat_map(Section::options)
            .map(str::to_string)
            .collect();
        for option in own.options() {
            if !names.iter().any(|n| n == option) {
                names.push(option.to_string());
            }
        }
        Ok(names)
    }

    // ------------------------------------------------------------------
    // Options
    // ------------------------------------------------------------------

    /// Add or overwrite an option, creating the section when needed
    ///
    /// Returns true for a fresh insert and false when an existing value was
    /// overwritten. An overwritten option keeps its position.
    pub fn add_entry(
        &mut self,
        section: &str,
        option: impl Into<String>,
        value: impl Into<String>,
    ) -> bool {
        let section = canonical(section);
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(option, value)
    }

    /// Remove an option; false if the section or the option is missing
    pub fn remove_entry(&mut self, section: &str, option: &str) -> bool {
        self.sections
            .get_mut(canonical(section))
            .is_some_and(|s| s.remove(option))
    }

    /// Check whether the section itself defines the option
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.section(section).is_some_and(|s| s.contains(option))
    }

    /// Raw value with DEFAULT fallback, no unfolding
    pub fn raw(&self, section: &str, option: &str) -> Result<&str> {
        let section = canonical(section);
        self.sections
            .get(section)
            .and_then(|s| s.get(option))
            .or_else(|| self.default_section().and_then(|d| d.get(option)))
            .ok_or_else(|| Error::option_not_found(section, option))
    }

    /// Raw value from the DEFAULT section only
    pub fn raw_default(&self, option: &str) -> Result<&str> {
        self.default_section()
            .and_then(|d| d.get(option))
            .ok_or_else(|| Error::option_not_found(DEFAULT_SECTION, option))
    }

    // ------------------------------------------------------------------
    // Resolved access
    // ------------------------------------------------------------------

    /// Get the unfolded value of an option
    ///
    /// `%(name)s` references are looked up in `section` first, then in
    /// DEFAULT. `${NAME}` references are read from the environment, unset
    /// variables becoming empty.
    pub fn get_string(&self, section: &str, option: &str) -> Result<String> {
        let section = canonical(section);
        let raw = self.raw(section, option)?;
        self.resolve(section, raw)
            .map_err(|e| e.with_path(option_path(section, option)))
    }

    /// Get an option as a signed integer
    pub fn get_int(&self, section: &str, option: &str) -> Result<i64> {
        let resolved = self.get_string(section, option)?;
        value::parse_int(&resolved)
            .map_err(|e| e.with_path(option_path(canonical(section), option)))
    }

    /// Get an option as a float
    pub fn get_float(&self, section: &str, option: &str) -> Result<f64> {
        let resolved = self.get_string(section, option)?;
        value::parse_float(&resolved)
            .map_err(|e| e.with_path(option_path(canonical(section), option)))
    }

    /// Get an option as a boolean
    ///
    /// See [`value::TRUE_TOKENS`] and [`value::FALSE_TOKENS`] for the
    /// accepted spellings.
    pub fn get_bool(&self, section: &str, option: &str) -> Result<bool> {
        let resolved = self.get_string(section, option)?;
        value::parse_bool(&resolved)
            .map_err(|e| e.with_path(option_path(canonical(section), option)))
    }

    /// Unfold an arbitrary raw string in the context of a section
    pub fn resolve(&self, section: &str, raw: &str) -> Result<String> {
        if !interpolation::contains_references(raw) {
            return Ok(raw.to_string());
        }

        let section = canonical(section);
        let unfolded = interpolation::unfold(raw, Pattern::Variable, |name| {
            self.variable(section, name).map(str::to_string)
        })?;
        interpolation::unfold(&unfolded, Pattern::Environment, |name| self.env.var(name))
    }

    /// Lookup used by the `%(name)s` pass: own section first, then DEFAULT
    fn variable(&self, section: &str, name: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(name))
            .or_else(|| self.default_section().and_then(|d| d.get(name)))
    }

    fn default_section(&self) -> Option<&Section> {
        self.sections.get(DEFAULT_SECTION)
    }

    // ------------------------------------------------------------------
    // Merge and export
    // ------------------------------------------------------------------

    /// Copy every option of `source` into this configuration
    ///
    /// Source values overwrite existing ones; options only present here are
    /// left alone. Raw values are copied without unfolding.
    pub fn merge(&mut self, source: &Config) {
        let mut copied = 0;
        for (section, entries) in source.iter() {
            for (option, value) in entries.iter() {
                self.add_entry(section, option, value);
                copied += 1;
            }
        }
        log::debug!("merged {} option(s)", copied);
    }

    /// Export all sections as nested ordered maps
    ///
    /// With `resolve` set, values are unfolded; otherwise raw values are
    /// returned.
    pub fn to_map(&self, resolve: bool) -> Result<IndexMap<String, IndexMap<String, String>>> {
        let mut out = IndexMap::with_capacity(self.sections.len());
        for (name, section) in self.iter() {
            let entries = if resolve {
                section
                    .options()
                    .map(|option| Ok((option.to_string(), self.get_string(name, option)?)))
                    .collect::<Result<IndexMap<_, _>>>()?
            } else {
                section.as_map().clone()
            };
            out.insert(name.to_string(), entries);
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    /// Render the configuration as INI text
    pub fn to_ini_string(&self, header: Option<&str>) -> String {
        writer::render(self, header)
    }

    /// Write the configuration as INI text
    pub fn write_to<W: Write>(&self, mut out: W, header: Option<&str>) -> Result<()> {
        out.write_all(self.to_ini_string(header).as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| Error::io("<output>", e))
    }

    /// Save the configuration to a file, replacing it
    pub fn save(&self, path: impl AsRef<Path>, header: Option<&str>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_ini_string(header))
            .map_err(|e| Error::io(path.display().to_string(), e))?;
        log::debug!("saved configuration to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_new_has_default_section() {
        let config = Config::new();
        assert_eq!(config.sections(), vec![DEFAULT_SECTION]);
        assert!(config.has_section(DEFAULT_SECTION));
        assert!(config.has_section(""));
        assert!(!config.has_section("no-section"));
    }

    #[test]
    fn test_empty_store_lookups_fail() {
        let config = Config::new();

        assert!(!config.has_option("no-section", "no-option"));
        assert!(config.get_string("no-section", "no-option").is_err());
        assert!(config.get_int("no-section", "no-option").is_err());
        assert!(config.section_options("no-section").is_empty());
    }

    #[test]
    fn test_add_and_remove_section() {
        let mut config = Config::new();

        assert!(config.add_section("section1"));
        assert!(!config.add_section("section1"));
        assert!(!config.add_section(DEFAULT_SECTION));
        assert!(!config.add_section(""));

        assert!(config.remove_section("section1"));
        assert!(!config.remove_section("section1"));
        assert!(!config.remove_section("no-section"));
    }

    #[test]
    fn test_default_section_cannot_be_removed() {
        let mut config = Config::new();
        config.add_entry(DEFAULT_SECTION, "a", "1");

        assert!(!config.remove_section(DEFAULT_SECTION));
        assert!(!config.remove_section(""));
        assert_eq!(config.sections(), vec![DEFAULT_SECTION]);
        assert_eq!(config.raw_default("a").unwrap(), "1");
    }

    #[test]
    fn test_add_entry_insert_and_overwrite() {
        let mut config = Config::new();

        assert!(config.add_entry("section1", "option1", "value1"));
        assert_eq!(config.get_string("section1", "option1").unwrap(), "value1");

        assert!(!config.add_entry("section1", "option1", "value2"));
        assert_eq!(config.get_string("section1", "option1").unwrap(), "value2");

        assert!(config.remove_entry("section1", "option1"));
        assert!(!config.remove_entry("section1", "option1"));
        assert!(!config.remove_entry("no-section", "option1"));
        assert!(config.get_string("section1", "option1").is_err());
    }

    #[test]
    fn test_add_entry_creates_section() {
        let mut config = Config::new();
        config.add_entry("new", "k", "v");

        assert!(config.has_section("new"));
        assert_eq!(config.sections(), vec![DEFAULT_SECTION, "new"]);
    }

    #[test]
    fn test_empty_section_name_is_default() {
        let mut config = Config::new();
        config.add_entry("", "host", "www.example.com");

        assert_eq!(config.raw_default("host").unwrap(), "www.example.com");
        assert_eq!(config.section_options(DEFAULT_SECTION), vec!["host"]);
        assert_eq!(config.get_string("", "host").unwrap(), "www.example.com");
    }

    #[test]
    fn test_section_order_is_insertion_order() {
        let mut config = Config::new();
        config.add_section("zeta");
        config.add_section("alpha");
        config.add_entry("mid", "k", "v");
        config.add_section("zeta");

        assert_eq!(config.sections(), vec![DEFAULT_SECTION, "zeta", "alpha", "mid"]);

        config.remove_section("alpha");
        config.add_section("alpha");
        assert_eq!(config.sections(), vec![DEFAULT_SECTION, "zeta", "mid", "alpha"]);
    }

    #[test]
    fn test_option_order_ignores_default() {
        let mut config = Config::new();
        config.add_entry(DEFAULT_SECTION, "inherited", "x");
        config.add_entry("s", "b", "1");
        config.add_entry("s", "a", "2");
        config.add_entry("s", "b", "3");

        assert_eq!(config.section_options("s"), vec!["b", "a"]);
        assert_eq!(config.options("s").unwrap(), vec!["inherited", "b", "a"]);
    }

    #[test]
    fn test_options_deduplicates_and_requires_section() {
        let mut config = Config::new();
        config.add_entry(DEFAULT_SECTION, "shared", "d");
        config.add_entry("s", "shared", "s");
        config.add_entry("s", "own", "o");

        assert_eq!(config.options("s").unwrap(), vec!["shared", "own"]);

        let err = config.options("missing").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::SectionNotFound {
                section: "missing".into()
            }
        );
    }

    #[test]
    fn test_default_fallback_on_read() {
        let mut config = Config::new();
        config.add_entry(DEFAULT_SECTION, "flag", "true");
        config.add_entry("s", "flag", "false");

        assert!(!config.get_bool("s", "flag").unwrap());
        assert!(config.get_bool("other", "flag").unwrap());
        assert!(!config.has_option("other", "flag"));
    }

    #[test]
    fn test_option_not_found_error() {
        let config = Config::new();
        let err = config.get_string("s", "missing").unwrap_err();

        assert_eq!(
            err.kind,
            ErrorKind::OptionNotFound {
                section: "s".into(),
                option: "missing".into()
            }
        );
        assert_eq!(err.path.as_deref(), Some("s.missing"));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut config = Config::new();
        config.add_entry("secTION-2", "IS-flag-TRUE", "Yes");

        assert!(config.get_bool("secTION-2", "IS-flag-TRUE").unwrap());
        assert!(config.get_bool("section-2", "IS-flag-TRUE").is_err());
        assert!(config.get_bool("secTION-2", "is-flag-true").is_err());
    }

    #[test]
    fn test_unfold_through_default() {
        let mut config = Config::new();
        config.add_entry(DEFAULT_SECTION, "protocol", "https://");
        config.add_entry(DEFAULT_SECTION, "host", "example.com");
        config.add_entry(DEFAULT_SECTION, "base", "%(protocol)s%(host)s");
        config.add_entry("S", "url", "%(base)s/path");

        assert_eq!(
            config.get_string("S", "url").unwrap(),
            "https://example.com/path"
        );
        assert_eq!(config.raw("S", "url").unwrap(), "%(base)s/path");
    }

    #[test]
    fn test_section_variable_wins_over_default() {
        let mut config = Config::new();
        config.add_entry(DEFAULT_SECTION, "host", "default.example.com");
        config.add_entry(DEFAULT_SECTION, "url", "http://%(host)s/");
        config.add_entry("local", "host", "localhost");

        assert_eq!(config.get_string("local", "url").unwrap(), "http://localhost/");
        assert_eq!(
            config.get_string("remote", "url").unwrap(),
            "http://default.example.com/"
        );
    }

    #[test]
    fn test_cycle_in_default_fails() {
        let mut config = Config::new();
        config.add_entry(DEFAULT_SECTION, "opt1", "%(opt2)s");
        config.add_entry(DEFAULT_SECTION, "opt2", "%(opt1)s");

        let err = config.get_string(DEFAULT_SECTION, "opt1").unwrap_err();
        assert_eq!(err.kind, ErrorKind::PossibleCycle { max_depth: 64 });
        assert_eq!(err.path.as_deref(), Some("DEFAULT.opt1"));
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_missing_variable_fails_with_partial() {
        let mut config = Config::new();
        config.add_entry("s", "url", "%(scheme)s://%(host)s");
        config.add_entry("s", "scheme", "ftp");

        let err = config.get_string("s", "url").unwrap_err();
        assert_eq!(err.kind, ErrorKind::VariableNotFound { name: "host".into() });
        assert_eq!(err.partial.as_deref(), Some("ftp://%(host)s"));
        assert_eq!(err.path.as_deref(), Some("s.url"));
    }

    #[test]
    fn test_environment_substitution_with_injected_env() {
        let mut config = Config::new().with_env(env(&[("VAR", "xyz")]));
        config.add_entry("s", "value", "this_${VAR}_end");
        config.add_entry("s", "unset", "a${NOT_SET}b");

        assert_eq!(config.get_string("s", "value").unwrap(), "this_xyz_end");
        assert_eq!(config.get_string("s", "unset").unwrap(), "ab");
    }

    #[test]
    fn test_variable_pass_runs_before_environment_pass() {
        let mut config = Config::new().with_env(env(&[("HOME", "/home/fold")]));
        config.add_entry(DEFAULT_SECTION, "root", "${HOME}/data");
        config.add_entry("s", "path", "%(root)s/cache");

        assert_eq!(config.get_string("s", "path").unwrap(), "/home/fold/data/cache");
    }

    #[test]
    fn test_resolved_value_is_idempotent() {
        let mut config = Config::new();
        config.add_entry("s", "plain", "nothing to unfold: 100% $5 {x}");

        let once = config.get_string("s", "plain").unwrap();
        assert_eq!(once, "nothing to unfold: 100% $5 {x}");
        assert_eq!(config.resolve("s", &once).unwrap(), once);
    }

    #[test]
    fn test_typed_accessors() {
        let mut config = Config::new();
        config.add_entry("section2", "test-number", "666");
        config.add_entry("section2", "test-yes", "yes");
        config.add_entry("section2", "test-false", "false");
        config.add_entry("section2", "ratio", "0.25");

        assert_eq!(config.get_int("section2", "test-number").unwrap(), 666);
        assert!(config.get_bool("section2", "test-yes").unwrap());
        assert!(!config.get_bool("section2", "test-false").unwrap());
        assert_eq!(config.get_float("section2", "ratio").unwrap(), 0.25);
    }

    #[test]
    fn test_bool_scenarios() {
        let mut config = Config::new();
        config.add_entry("S", "flag", "Yes");
        assert!(config.get_bool("S", "flag").unwrap());

        config.add_entry("S", "flag", "off");
        assert!(!config.get_bool("S", "flag").unwrap());

        config.add_entry("S", "flag", "maybe");
        let err = config.get_bool("S", "flag").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::TypeCoercion { .. }));
        assert_eq!(err.path.as_deref(), Some("S.flag"));
    }

    #[test]
    fn test_typed_accessor_resolves_first() {
        let mut config = Config::new();
        config.add_entry(DEFAULT_SECTION, "base", "80");
        config.add_entry("web", "port", "%(base)s80");

        assert_eq!(config.get_int("web", "port").unwrap(), 8080);
    }

    #[test]
    fn test_merge_source_wins() {
        let mut target = Config::new();
        target.add_entry(DEFAULT_SECTION, "one", "1");
        target.add_entry(DEFAULT_SECTION, "five", "5");

        let mut source = Config::new();
        source.add_entry(DEFAULT_SECTION, "one", "source1");
        source.add_entry("X", "x.one", "sourcex1");

        target.merge(&source);

        assert_eq!(target.get_string(DEFAULT_SECTION, "one").unwrap(), "source1");
        assert_eq!(target.get_string(DEFAULT_SECTION, "five").unwrap(), "5");
        assert_eq!(target.get_string("X", "x.one").unwrap(), "sourcex1");
        assert_eq!(target.section_options(DEFAULT_SECTION), vec!["one", "five"]);
    }

    #[test]
    fn test_merge_copies_raw_values() {
        let mut target = Config::new();
        target.add_entry(DEFAULT_SECTION, "name", "target");

        let mut source = Config::new();
        source.add_entry("s", "greeting", "hello %(name)s");
        source.add_entry(DEFAULT_SECTION, "unused", "x");

        target.merge(&source);

        assert_eq!(target.raw("s", "greeting").unwrap(), "hello %(name)s");
        assert_eq!(target.get_string("s", "greeting").unwrap(), "hello target");
    }

    #[test]
    fn test_to_map_raw_and_resolved() {
        let mut config = Config::new();
        config.add_entry(DEFAULT_SECTION, "host", "example.com");
        config.add_entry("web", "url", "http://%(host)s");

        let raw = config.to_map(false).unwrap();
        assert_eq!(raw["web"]["url"], "http://%(host)s");

        let resolved = config.to_map(true).unwrap();
        assert_eq!(resolved["web"]["url"], "http://example.com");
        assert_eq!(
            resolved.keys().collect::<Vec<_>>(),
            vec![DEFAULT_SECTION, "web"]
        );
    }

    #[test]
    fn test_to_map_propagates_resolution_errors() {
        let mut config = Config::new();
        config.add_entry("s", "broken", "%(missing)s");

        assert!(config.to_map(false).is_ok());
        assert!(config.to_map(true).is_err());
    }
}
