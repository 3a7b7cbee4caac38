//! Command-line interface for the converter.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use console::style;

use crate::config::{ConvertOptions, TargetFormat};
use crate::convertor::Convertor;
use crate::error::Result;

/// Convert bibdata records and collections between XML, YAML and HTML.
#[derive(Parser, Debug)]
#[command(name = "bibdata-convert")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source file (bibdata XML, relaton-collection XML or YAML)
    pub file: PathBuf,

    /// Target format: xml, yaml or html
    #[arg(short, long, default_value = "yaml", value_parser = TargetFormat::from_str)]
    pub to: TargetFormat,

    /// Directory receiving one file per record of a collection
    #[arg(short, long)]
    pub outdir: Option<PathBuf>,

    /// Prefix for per-record file names
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Output file extension (default depends on the target format)
    #[arg(short = 'x', long)]
    pub extension: Option<String>,

    /// Stylesheet for HTML output
    #[arg(short, long)]
    pub style: Option<PathBuf>,

    /// Template directory for HTML output
    #[arg(short = 'T', long)]
    pub template: Option<PathBuf>,

    /// Print the output paths without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Conversion options from the environment, overridden by flags.
    pub fn options(&self) -> ConvertOptions {
        let mut options = ConvertOptions::from_env(self.to).with_write(!self.dry_run);
        if let Some(outdir) = &self.outdir {
            options = options.with_outdir(outdir);
        }
        if let Some(prefix) = &self.prefix {
            options = options.with_prefix(prefix);
        }
        if let Some(extension) = &self.extension {
            options = options.with_extension(extension);
        }
        if let Some(stylesheet) = &self.style {
            options = options.with_stylesheet(stylesheet);
        }
        if let Some(template_dir) = &self.template {
            options = options.with_template_dir(template_dir);
        }
        options
    }
}

/// Run the CLI.
pub fn run(cli: Cli) -> Result<()> {
    let convertor = Convertor::new(cli.options())?;

    println!(
        "{} {} to {}",
        style("Converting").bold(),
        style(cli.file.display()).cyan(),
        style(cli.to).green()
    );

    let written = convertor.convert(&cli.file)?;

    let label = if cli.dry_run { "Would write:" } else { "Wrote:" };
    println!();
    println!("{} {} file(s)", style(label).green().bold(), written.len());
    for path in &written {
        println!("  {}", path.display());
    }

    Ok(())
}
