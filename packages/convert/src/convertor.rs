//! The conversion pipeline.
//!
//! A [`Convertor`] reads a source file, hands its text to a renderer and
//! passes the resulting artifact to the [`OutputDistributor`]. Renderer
//! dependencies are loaded when the convertor is built, so a missing
//! stylesheet or template fails before any file is read or written.

use std::fs;
use std::path::{Path, PathBuf};

use bibdata::Format;

use crate::config::ConvertOptions;
use crate::distribute::OutputDistributor;
use crate::error::{ConvertError, Result};
use crate::render::{renderer_for, Renderer};

pub struct Convertor {
    options: ConvertOptions,
    renderer: Box<dyn Renderer>,
    distributor: OutputDistributor,
}

impl Convertor {
    /// Build a convertor with the built-in renderer for the target format.
    pub fn new(options: ConvertOptions) -> Result<Self> {
        let renderer = renderer_for(options.target);
        Self::with_renderer(options, renderer)
    }

    /// Build a convertor around a custom renderer.
    pub fn with_renderer(
        options: ConvertOptions,
        mut renderer: Box<dyn Renderer>,
    ) -> Result<Self> {
        renderer.load(&options.stylesheet, &options.template_dir)?;
        let distributor = OutputDistributor::from_options(&options);
        Ok(Self {
            options,
            renderer,
            distributor,
        })
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert one source file, returning the paths written.
    pub fn convert(&self, file: &Path) -> Result<Vec<PathBuf>> {
        let source = fs::read_to_string(file).map_err(|source| ConvertError::ReadSource {
            path: file.to_path_buf(),
            source,
        })?;
        tracing::info!(file = %file.display(), target = %self.options.target, "converting");

        let artifact = self.renderer.render(
            &source,
            &self.options.stylesheet,
            &self.options.template_dir,
        )?;
        tracing::debug!(kind = artifact.kind(), "rendered source");

        let format = self.options.target.format().unwrap_or(Format::Markup);
        self.distributor.distribute(file, &artifact, format)
    }
}

/// Convert `file` with `options` in one call.
pub fn convert_file(file: &Path, options: ConvertOptions) -> Result<Vec<PathBuf>> {
    Convertor::new(options)?.convert(file)
}
