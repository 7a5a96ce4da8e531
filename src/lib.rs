//! Unpack files from a git repository into a new directory.
//!
//! The repository is shallow-cloned to a temporary directory, then either
//! copied wholesale or according to the `unpackr.config.json` manifest at its
//! root. Dependencies declared by the unpacked `package.json` can then be
//! installed into the host project.
//!
//! ```no_run
//! use unpackr::{Config, Mode, UnpackRequest, unpack};
//!
//! let mut request = UnpackRequest::new("https://github.com/user/template.git", "src/template");
//! request.tag = Some("v1.2.0".to_string());
//! request.install_dependencies = Some("npm".to_string());
//!
//! let outcome = unpack(&request, Mode::Programmatic, &Config::load())?;
//! println!("unpacked to {}", outcome.destination.display());
//! # Ok::<(), unpackr::UnpackrError>(())
//! ```

pub mod config;
pub mod error;
pub mod locate;
pub mod manifest;
pub mod operations;
pub mod prompt;

pub use config::Config;
pub use error::{Result, UnpackrError};
pub use operations::{DependencyOutcome, Mode, UnpackOutcome, UnpackRequest, unpack};
