//! inifold-core: ordered INI configuration with variable unfolding
//!
//! This crate loads, edits, merges and saves INI files. Sections and options
//! keep their insertion order, every section inherits from `DEFAULT`, and
//! values may reference other options (`%(name)s`) or environment variables
//! (`${NAME}`), which are unfolded when the value is read.
//!
//! # Example
//!
//! ```rust
//! use inifold_core::Config;
//!
//! let ini = "
//! [DEFAULT]
//! host = example.com
//!
//! [web]
//! url = https://%(host)s/index.html
//! ";
//!
//! let config = Config::from_ini(ini).unwrap();
//! assert_eq!(
//!     config.get_string("web", "url").unwrap(),
//!     "https://example.com/index.html"
//! );
//! ```

pub mod env;
pub mod error;
pub mod interpolation;
pub mod options;
pub mod value;

mod config;
mod must;
mod parser;
mod section;
mod writer;

pub use config::{Config, DEFAULT_SECTION};
pub use env::{Environment, ProcessEnv};
pub use error::{Error, ErrorKind, Result};
pub use interpolation::MAX_DEPTH;
pub use options::{CommentMarker, Options, Separator};
pub use section::Section;
