//! Bibdata Convert - conversion pipeline for bibdata records.
//!
//! Reads a bibdata record or collection from XML or YAML and writes it out as
//! XML, YAML or an HTML page. Collections can additionally be split into one
//! file per record.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use bibdata_convert::{convert_file, ConvertOptions, TargetFormat};
//!
//! let options = ConvertOptions::new(TargetFormat::Yaml)
//!     .with_outdir("records")
//!     .with_prefix("cc-");
//! let written = convert_file(Path::new("registry.xml"), options).unwrap();
//! println!("wrote {} files", written.len());
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Options, target formats and defaults
//! - [`error`]: Error types and Result alias
//! - [`render`]: Renderers producing artifacts from source text
//! - [`distribute`]: Output paths and file writing
//! - [`convertor`]: The pipeline tying the above together
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod convertor;
pub mod distribute;
pub mod error;
pub mod render;

pub use config::{ConvertOptions, TargetFormat};
pub use convertor::{convert_file, Convertor};
pub use distribute::OutputDistributor;
pub use error::{ConvertError, Result};
pub use render::{Artifact, BibdataRenderer, HtmlRenderer, Renderer};
