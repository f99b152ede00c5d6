use crate::{
    config::Config,
    error::{Error, Result},
    splitter::Chunk,
};
use std::{
    ffi::OsString,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

const OUTPUT_EXTENSION: &str = "txt";

/// Writes chunks to `<base>.txt` or `<base>_partN.txt`.
pub struct Writer {
    output_base: PathBuf,
}

impl Writer {
    /// Creates a new writer from configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            output_base: config.output_base.clone(),
        }
    }

    /// Writes all chunks and returns the paths written, in part order.
    ///
    /// Nothing is written for an empty slice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Write`] if the output directory cannot be created or a
    /// file cannot be written. Parts written before the failure are left as is.
    pub fn write_chunks(&self, chunks: &[Chunk]) -> Result<Vec<PathBuf>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(parent) = self
            .output_base
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
        }

        info!(
            "Writing {} chunk(s) to {}",
            chunks.len(),
            self.output_base.display()
        );

        chunks
            .iter()
            .map(|chunk| self.write_chunk(chunk, chunks.len()))
            .collect()
    }

    /// Writes a single chunk to file.
    fn write_chunk(&self, chunk: &Chunk, total_chunks: usize) -> Result<PathBuf> {
        let path = self.output_path(chunk.index, total_chunks);

        write_file_atomic(&path, &chunk.render())?;

        info!("Saved {} ({} tokens)", path.display(), chunk.total_tokens);
        debug!(
            "Chunk {}/{} holds {} lines",
            chunk.index + 1,
            total_chunks,
            chunk.line_count()
        );

        Ok(path)
    }

    /// Returns the file path for chunk `index` out of `total_chunks`.
    ///
    /// A lone chunk gets the bare `<base>.txt`; once there are two or more,
    /// every chunk, the first included, is `<base>_part{index + 1}.txt`.
    #[must_use]
    pub fn output_path(&self, index: usize, total_chunks: usize) -> PathBuf {
        let suffix = if total_chunks == 1 {
            format!(".{OUTPUT_EXTENSION}")
        } else {
            format!("_part{}.{OUTPUT_EXTENSION}", index + 1)
        };

        let mut name = OsString::from(self.output_base.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }
}

/// Writes a file through a temporary sibling and renames it into place.
fn write_file_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = temp_path_for(path);
    let mut temp_file =
        fs::File::create(&temp_path).map_err(|e| Error::write(&temp_path, e))?;

    temp_file
        .write_all(content.as_bytes())
        .map_err(|e| Error::write(&temp_path, e))?;

    temp_file
        .sync_all()
        .map_err(|e| Error::write(&temp_path, e))?;

    drop(temp_file);

    fs::rename(&temp_path, path).map_err(|e| Error::write(path, e))?;

    Ok(())
}

/// Hidden, per-process sibling name: `.<file_name>.<pid>.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    if let Some(file_name) = path.file_name() {
        name.push(file_name);
    }
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::Line;
    use assert_fs::prelude::*;

    fn writer(base: &Path) -> Writer {
        Writer {
            output_base: base.to_path_buf(),
        }
    }

    fn chunk(index: usize, names: &[&str]) -> Chunk {
        let lines = names.iter().map(|n| Line::new(n, "body")).collect();
        Chunk::new(index, lines, 2 * names.len())
    }

    #[test]
    fn test_single_chunk_gets_bare_name() {
        let temp = assert_fs::TempDir::new().unwrap();
        let base = temp.path().join("combined");

        let written = writer(&base)
            .write_chunks(&[chunk(0, &["a.txt", "b.txt"])])
            .unwrap();

        assert_eq!(written, vec![temp.path().join("combined.txt")]);
        temp.child("combined.txt")
            .assert("[a.txt] body\n[b.txt] body\n");
        temp.child("combined_part1.txt")
            .assert(predicates::path::missing());
    }

    #[test]
    fn test_multiple_chunks_all_numbered() {
        let temp = assert_fs::TempDir::new().unwrap();
        let base = temp.path().join("combined");

        let written = writer(&base)
            .write_chunks(&[chunk(0, &["a.txt"]), chunk(1, &["b.txt"])])
            .unwrap();

        assert_eq!(
            written,
            vec![
                temp.path().join("combined_part1.txt"),
                temp.path().join("combined_part2.txt"),
            ]
        );
        temp.child("combined.txt").assert(predicates::path::missing());
        temp.child("combined_part1.txt").assert("[a.txt] body\n");
        temp.child("combined_part2.txt").assert("[b.txt] body\n");
    }

    #[test]
    fn test_creates_parent_directories() {
        let temp = assert_fs::TempDir::new().unwrap();
        let base = temp.path().join("deep/nested/out");

        writer(&base).write_chunks(&[chunk(0, &["a.txt"])]).unwrap();

        temp.child("deep/nested/out.txt")
            .assert(predicates::path::is_file());
    }

    #[test]
    fn test_overwrites_existing_output() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("combined.txt").write_str("stale content\n").unwrap();

        writer(&temp.path().join("combined"))
            .write_chunks(&[chunk(0, &["a.txt"])])
            .unwrap();

        temp.child("combined.txt").assert("[a.txt] body\n");
        let leftovers: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![OsString::from("combined.txt")]);
    }

    #[test]
    fn test_existing_tmp_file_with_base_name_survives() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("combined.tmp").write_str("user data").unwrap();

        writer(&temp.path().join("combined"))
            .write_chunks(&[chunk(0, &["a.txt"])])
            .unwrap();

        temp.child("combined.txt").assert("[a.txt] body\n");
        temp.child("combined.tmp").assert("user data");
    }

    #[test]
    fn test_temp_path_is_hidden_sibling() {
        let temp_path = temp_path_for(Path::new("out/combined_part2.txt"));

        assert_eq!(temp_path.parent(), Some(Path::new("out")));
        let name = temp_path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".combined_part2.txt."));
        assert!(name.ends_with(".tmp"));
    }

    #[test]
    fn test_empty_chunks_write_nothing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let base = temp.path().join("sub/combined");

        let written = writer(&base).write_chunks(&[]).unwrap();

        assert!(written.is_empty());
        temp.child("sub").assert(predicates::path::missing());
    }

    #[test]
    fn test_write_failure_is_write_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("blocker").write_str("not a directory").unwrap();
        let base = temp.path().join("blocker/combined");

        let err = writer(&base)
            .write_chunks(&[chunk(0, &["a.txt"])])
            .unwrap_err();

        assert!(matches!(err, Error::Write { .. }));
    }

    #[test]
    fn test_output_path_keeps_dots_in_base() {
        let w = writer(Path::new("out/v1.2/combined"));

        assert_eq!(w.output_path(0, 1), PathBuf::from("out/v1.2/combined.txt"));
        assert_eq!(
            w.output_path(9, 12),
            PathBuf::from("out/v1.2/combined_part10.txt")
        );
    }
}
