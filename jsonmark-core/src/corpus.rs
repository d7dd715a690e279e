// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Corpus file resolution and lazy materialization.
//!
//! A corpus is either cached under a directory, keyed by
//! `(benchmark, version, serializer)` and kept forever, or transient, in
//! which case the file is removed when the [`CorpusFile`] is dropped.
//!
//! An existing non-empty file is always reused as-is. Its content is not
//! checked against the current schema; a schema change must come with a
//! version bump.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::TempPath;

use crate::benchmark::BenchmarkDefinition;
use crate::error::CorpusError;
use crate::serializer::SerializerKind;

const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Result of [`CorpusFile::materialize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Materialized {
    /// The file already existed and was non-empty.
    Hit,
    /// The corpus was (re)generated.
    Written { records: u64, elapsed: Duration },
}

impl Materialized {
    /// Records written per second, if the corpus was generated.
    pub fn lines_per_sec(&self) -> Option<f64> {
        match self {
            Materialized::Hit => None,
            Materialized::Written { records, elapsed } => {
                Some(*records as f64 / elapsed.as_secs_f64().max(f64::EPSILON))
            }
        }
    }
}

/// Location of the corpus for one invocation.
#[derive(Debug)]
pub enum CorpusFile {
    Cached { path: PathBuf },
    Transient { path: TempPath },
}

impl CorpusFile {
    /// Decide where the corpus lives.
    ///
    /// Without a cache directory a fresh temporary file is allocated. With
    /// one, the directory is created if missing.
    pub fn resolve(
        definition: &BenchmarkDefinition,
        serializer: SerializerKind,
        cache_dir: Option<&Path>,
    ) -> Result<Self, CorpusError> {
        match cache_dir {
            Some(dir) => {
                fs::create_dir_all(dir).map_err(|e| CorpusError::Io {
                    context: "creating cache directory",
                    path: dir.to_path_buf(),
                    source: e,
                })?;
                let path = dir.join(definition.cache_filename(serializer));
                tracing::debug!(path = %path.display(), "Using cached corpus path");
                Ok(CorpusFile::Cached { path })
            }
            None => {
                let path = tempfile::Builder::new()
                    .prefix("jsonmark-")
                    .tempfile()
                    .map_err(|e| CorpusError::Io {
                        context: "creating temporary corpus",
                        path: std::env::temp_dir(),
                        source: e,
                    })?
                    .into_temp_path();
                tracing::debug!(path = %path.display(), "Using temporary corpus path");
                Ok(CorpusFile::Transient { path })
            }
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            CorpusFile::Cached { path } => path.as_path(),
            CorpusFile::Transient { path } => &**path,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, CorpusFile::Transient { .. })
    }

    /// Generate the corpus unless a non-empty file is already in place.
    ///
    /// The file is flushed and synced before returning so a deserializer
    /// spawned afterwards never observes a partial corpus. A cached corpus
    /// only appears at its final path once fully written, so a failed write
    /// is regenerated on the next run instead of reused.
    pub fn materialize(
        &self,
        definition: &BenchmarkDefinition,
        serializer: SerializerKind,
    ) -> Result<Materialized, CorpusError> {
        let path = self.path();
        let existing_len = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        if existing_len > 0 {
            tracing::debug!(
                path = %path.display(),
                bytes = existing_len,
                "Reusing existing corpus"
            );
            return Ok(Materialized::Hit);
        }

        tracing::info!("Writing serialized file to: {}", path.display());
        let start = Instant::now();
        let fill = |writer: &mut dyn Write| write_records(writer, definition, serializer, path);
        let written = match self {
            CorpusFile::Cached { path } => write_staged(path, fill)?,
            CorpusFile::Transient { path } => {
                let file = File::create(path).map_err(io_err(path, "creating corpus file"))?;
                write_synced(&file, path, fill)?
            }
        };

        let elapsed = start.elapsed();
        let outcome = Materialized::Written {
            records: written,
            elapsed,
        };
        tracing::info!(
            "Serializer time taken: {:.2}s ({:.2} lines/sec)",
            elapsed.as_secs_f64(),
            outcome.lines_per_sec().unwrap_or_default()
        );

        Ok(outcome)
    }
}

fn io_err<'a>(path: &'a Path, context: &'static str) -> impl FnOnce(io::Error) -> CorpusError + 'a {
    move |e| CorpusError::Io {
        context,
        path: path.to_path_buf(),
        source: e,
    }
}

/// Serialize every record of `definition`, one per line.
fn write_records(
    mut writer: &mut dyn Write,
    definition: &BenchmarkDefinition,
    serializer: SerializerKind,
    path: &Path,
) -> Result<u64, CorpusError> {
    let total = definition.iterations;
    let progress_step = (total / 10).max(1);
    let mut written = 0u64;
    for record in definition.dataset() {
        serializer.write_line(&mut writer, &record).map_err(|e| {
            if e.is_io() {
                io_err(path, "writing corpus")(e.into())
            } else {
                CorpusError::Encode {
                    index: written,
                    source: e,
                }
            }
        })?;
        written += 1;
        if written % progress_step == 0 {
            tracing::debug!(written, total, "Corpus progress");
        }
    }
    Ok(written)
}

/// Fill `file` through a buffer, then flush and sync it.
fn write_synced<F>(file: &File, path: &Path, fill: F) -> Result<u64, CorpusError>
where
    F: FnOnce(&mut dyn Write) -> Result<u64, CorpusError>,
{
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
    let written = fill(&mut writer)?;
    writer.flush().map_err(io_err(path, "flushing corpus"))?;
    drop(writer);
    file.sync_all().map_err(io_err(path, "syncing corpus"))?;
    Ok(written)
}

/// Write a cached corpus next to `path` and rename it into place once
/// complete. On failure the staged file is removed and `path` is untouched.
fn write_staged<F>(path: &Path, fill: F) -> Result<u64, CorpusError>
where
    F: FnOnce(&mut dyn Write) -> Result<u64, CorpusError>,
{
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let staged = tempfile::Builder::new()
        .prefix(".jsonmark-")
        .suffix(".partial")
        .tempfile_in(dir)
        .map_err(io_err(path, "creating corpus file"))?;

    let written = write_synced(staged.as_file(), path, fill)?;
    staged
        .persist(path)
        .map_err(|e| io_err(path, "persisting corpus")(e.error))?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{simple_schema, Record};
    use tempfile::TempDir;

    fn tiny(iterations: u64) -> BenchmarkDefinition {
        BenchmarkDefinition {
            name: "tiny",
            version: 3,
            seed: 42,
            iterations,
            schema: simple_schema,
            expected_checksum: 0,
        }
    }

    #[test]
    fn test_cached_path_layout() {
        let dir = TempDir::new().unwrap();
        let cache = dir.path().join("nested").join("cache");
        let corpus = CorpusFile::resolve(&tiny(5), SerializerKind::Ascii, Some(&cache)).unwrap();

        assert!(cache.is_dir());
        assert!(!corpus.is_transient());
        assert_eq!(corpus.path(), cache.join("tiny.3.ascii"));
    }

    #[test]
    fn test_materialize_writes_once() {
        let dir = TempDir::new().unwrap();
        let definition = tiny(25);
        let corpus =
            CorpusFile::resolve(&definition, SerializerKind::Compact, Some(dir.path())).unwrap();

        let first = corpus
            .materialize(&definition, SerializerKind::Compact)
            .unwrap();
        assert!(matches!(first, Materialized::Written { records: 25, .. }));
        let content = fs::read_to_string(corpus.path()).unwrap();

        let second = corpus
            .materialize(&definition, SerializerKind::Compact)
            .unwrap();
        assert_eq!(second, Materialized::Hit);
        assert_eq!(fs::read_to_string(corpus.path()).unwrap(), content);
    }

    #[test]
    fn test_corpus_format() {
        let dir = TempDir::new().unwrap();
        let definition = tiny(10);
        let corpus =
            CorpusFile::resolve(&definition, SerializerKind::Compact, Some(dir.path())).unwrap();
        corpus
            .materialize(&definition, SerializerKind::Compact)
            .unwrap();

        let content = fs::read_to_string(corpus.path()).unwrap();
        assert!(content.ends_with('\n'));
        assert!(!content.starts_with('['));

        let records: Vec<Record> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        let expected: Vec<Record> = definition.dataset().collect();
        assert_eq!(records, expected);
    }

    #[test]
    fn test_empty_file_is_regenerated() {
        let dir = TempDir::new().unwrap();
        let definition = tiny(3);
        let corpus =
            CorpusFile::resolve(&definition, SerializerKind::Compact, Some(dir.path())).unwrap();
        File::create(corpus.path()).unwrap();

        let outcome = corpus
            .materialize(&definition, SerializerKind::Compact)
            .unwrap();
        assert!(matches!(outcome, Materialized::Written { records: 3, .. }));
    }

    #[test]
    fn test_stale_content_is_not_reverified() {
        let dir = TempDir::new().unwrap();
        let definition = tiny(3);
        let corpus =
            CorpusFile::resolve(&definition, SerializerKind::Compact, Some(dir.path())).unwrap();
        fs::write(corpus.path(), "{\"integer_1\":1,\"integer_2\":2}\n").unwrap();

        let outcome = corpus
            .materialize(&definition, SerializerKind::Compact)
            .unwrap();
        assert_eq!(outcome, Materialized::Hit);
    }

    #[test]
    fn test_transient_file_removed_on_drop() {
        let definition = tiny(4);
        let corpus = CorpusFile::resolve(&definition, SerializerKind::Compact, None).unwrap();
        assert!(corpus.is_transient());

        corpus
            .materialize(&definition, SerializerKind::Compact)
            .unwrap();
        let path = corpus.path().to_path_buf();
        assert!(path.exists());

        drop(corpus);
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_write_leaves_no_cached_file() {
        let dir = TempDir::new().unwrap();
        let definition = tiny(3);
        let corpus =
            CorpusFile::resolve(&definition, SerializerKind::Compact, Some(dir.path())).unwrap();

        let result = write_staged(corpus.path(), |writer| {
            writer.write_all(&[b'x'; 2 * WRITE_BUFFER_SIZE]).unwrap();
            Err(io_err(corpus.path(), "writing corpus")(io::Error::other(
                "No space left on device",
            )))
        });

        assert!(matches!(result, Err(CorpusError::Io { context: "writing corpus", .. })));
        assert!(!corpus.path().exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        let outcome = corpus
            .materialize(&definition, SerializerKind::Compact)
            .unwrap();
        assert!(matches!(outcome, Materialized::Written { records: 3, .. }));
    }

    #[test]
    fn test_cached_write_leaves_no_staging_file() {
        let dir = TempDir::new().unwrap();
        let definition = tiny(5);
        let corpus =
            CorpusFile::resolve(&definition, SerializerKind::Ascii, Some(dir.path())).unwrap();
        corpus.materialize(&definition, SerializerKind::Ascii).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, ["tiny.3.ascii"]);
        assert_eq!(fs::read_to_string(corpus.path()).unwrap().lines().count(), 5);
    }
}
