//! Writing conversion output to disk.
//!
//! The primary output sits next to the source file with its extension
//! replaced. When an output directory is configured, every record of a
//! collection is also written to `outdir/[prefix]identifier-code.ext`.
//!
//! Identifier codes are not checked for collisions: two records that map to
//! the same file name are both written, and the later one wins.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use bibdata::{Format, Record, Serializable};

use crate::config::ConvertOptions;
use crate::error::{ConvertError, Result};
use crate::render::Artifact;

/// Decides where output goes and writes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDistributor {
    extension: String,
    outdir: Option<PathBuf>,
    prefix: Option<String>,
    write: bool,
}

impl OutputDistributor {
    /// A distributor writing files with `extension` (leading dot optional).
    pub fn new(extension: impl Into<String>) -> Self {
        let extension: String = extension.into();
        Self {
            extension: extension.trim_start_matches('.').to_string(),
            outdir: None,
            prefix: None,
            write: true,
        }
    }

    pub fn from_options(options: &ConvertOptions) -> Self {
        Self {
            extension: options.extension().to_string(),
            outdir: options.outdir.clone(),
            prefix: options.prefix.clone(),
            write: options.write,
        }
    }

    pub fn with_outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = Some(outdir.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Compute paths without touching the file system.
    pub fn dry_run(mut self) -> Self {
        self.write = false;
        self
    }

    /// `source` with its extension replaced.
    pub fn primary_path(&self, source: &Path) -> PathBuf {
        source.with_extension(&self.extension)
    }

    /// Fan-out path of `record`, if an output directory is configured.
    pub fn record_path(&self, record: &Record) -> Option<PathBuf> {
        let outdir = self.outdir.as_ref()?;
        let prefix = self.prefix.as_deref().unwrap_or_default();
        Some(outdir.join(format!(
            "{prefix}{}.{}",
            record.identifier_code(),
            self.extension
        )))
    }

    /// Write `artifact` for the source file at `source`.
    ///
    /// Returns every path written, primary output first and then one per
    /// record in flattened collection order.
    pub fn distribute(
        &self,
        source: &Path,
        artifact: &Artifact,
        format: Format,
    ) -> Result<Vec<PathBuf>> {
        let primary = self.primary_path(source);
        self.write_file(&primary, &artifact.to_text(format)?)?;

        let mut written = vec![primary];
        if let Artifact::Collection(collection) = artifact {
            if let Some(outdir) = &self.outdir {
                if self.write {
                    fs::create_dir_all(outdir).map_err(|source| ConvertError::WriteOutput {
                        path: outdir.clone(),
                        source,
                    })?;
                }
                tracing::debug!(outdir = %outdir.display(), "writing one file per record");

                for record in collection.items_flattened() {
                    let Some(path) = self.record_path(record) else {
                        continue;
                    };
                    let text = record.serialize(format)?.into_text()?;
                    self.write_file(&path, &text)?;
                    written.push(path);
                }
            }
        }

        if self.write {
            tracing::info!(files = written.len(), kind = artifact.kind(), "wrote output");
        } else {
            tracing::info!(
                files = written.len(),
                kind = artifact.kind(),
                "dry run, nothing written"
            );
        }
        Ok(written)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if !self.write {
            tracing::debug!(path = %path.display(), "dry run, skipping write");
            return Ok(());
        }
        write_atomic(path, content).map_err(|source| ConvertError::WriteOutput {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "wrote file");
        Ok(())
    }
}

/// Write `content` to a temp sibling of `path`, sync it and rename it into
/// place.
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_file = path.with_file_name(format!(".{file_name}.tmp"));

    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }

    fs::rename(&temp_file, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bibdata::{Collection, RecordConfig};
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    fn record(docidentifier: &str, title: &str) -> Record {
        Record::new(RecordConfig {
            docidentifier: Some(docidentifier.to_string()),
            title: Some(title.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_primary_path_replaces_extension() {
        let distributor = OutputDistributor::new(".yaml");
        assert_eq!(
            distributor.primary_path(Path::new("dir/registry.xml")),
            PathBuf::from("dir/registry.yaml")
        );
        assert_eq!(
            distributor.primary_path(Path::new("registry")),
            PathBuf::from("registry.yaml")
        );
    }

    #[test]
    fn test_record_path() {
        let distributor = OutputDistributor::new("rxl")
            .with_outdir("out")
            .with_prefix("cc-");
        assert_eq!(
            distributor.record_path(&record("CC/DIR 10005:2019", "Directive")),
            Some(PathBuf::from("out/cc-cc-dir-10005-2019.rxl"))
        );
        assert_eq!(OutputDistributor::new("rxl").record_path(&record("CC 1", "")), None);
    }

    #[test]
    fn test_record_distributes_single_file() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("record.xml");
        let distributor = OutputDistributor::new("yaml").with_outdir(dir.path().join("records"));

        let written = distributor
            .distribute(&source, &Artifact::Record(record("CC 1", "One")), Format::SerializedMapping)
            .unwrap();

        assert_eq!(written, vec![dir.path().join("record.yaml")]);
        assert!(!dir.path().join("records").exists());
        assert_eq!(
            fs::read_to_string(&written[0]).unwrap(),
            "---\ndocidentifier: CC 1\ntitle: One\ndateType: circulated\n"
        );
    }

    #[test]
    fn test_collection_fan_out_last_writer_wins() {
        let dir = tempdir().unwrap();
        let outdir = dir.path().join("D");
        let mut collection = Collection::default();
        collection.push_record(record("A/B", "first"));
        collection.push_record(record("A/B", "second"));

        let distributor = OutputDistributor::new("yaml")
            .with_outdir(&outdir)
            .with_prefix("rec-");
        let written = distributor
            .distribute(
                &dir.path().join("collection.xml"),
                &Artifact::Collection(collection),
                Format::SerializedMapping,
            )
            .unwrap();

        assert_eq!(written.len(), 3);
        let entries: Vec<String> = fs::read_dir(&outdir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["rec-a-b.yaml"]);
        assert_eq!(
            fs::read_to_string(outdir.join("rec-a-b.yaml")).unwrap(),
            "---\ndocidentifier: A/B\ntitle: second\ndateType: circulated\n"
        );
    }

    #[test]
    fn test_existing_outdir_is_reused() {
        let dir = tempdir().unwrap();
        let mut collection = Collection::default();
        collection.push_record(record("CC 1", "One"));

        let distributor = OutputDistributor::new("yaml").with_outdir(dir.path());
        let written = distributor
            .distribute(
                &dir.path().join("collection.xml"),
                &Artifact::Collection(collection),
                Format::SerializedMapping,
            )
            .unwrap();

        assert_eq!(written[1], dir.path().join("cc-1.yaml"));
        assert!(written[1].is_file());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = tempdir().unwrap();
        let outdir = dir.path().join("out");
        let mut collection = Collection::default();
        collection.push_record(record("CC 1", "One"));

        let written = OutputDistributor::new("yaml")
            .with_outdir(&outdir)
            .dry_run()
            .distribute(
                &dir.path().join("collection.xml"),
                &Artifact::Collection(collection),
                Format::SerializedMapping,
            )
            .unwrap();

        assert_eq!(written.len(), 2);
        assert!(!written[0].exists());
        assert!(!outdir.exists());
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_dry_run_logs_no_writes() {
        let dir = tempdir().unwrap();
        let mut collection = Collection::default();
        collection.push_record(record("CC 1", "One"));

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            OutputDistributor::new("yaml")
                .with_outdir(dir.path().join("out"))
                .dry_run()
                .distribute(
                    &dir.path().join("collection.xml"),
                    &Artifact::Collection(collection),
                    Format::SerializedMapping,
                )
                .unwrap();
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("dry run, nothing written"));
        assert_eq!(output.matches("dry run, skipping write").count(), 2);
        assert!(!output.contains("wrote"));
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.yaml");
        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!dir.path().join(".out.yaml.tmp").exists());
    }
}
