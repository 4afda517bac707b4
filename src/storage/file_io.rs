//! Loading and saving the JSON documents under the data directory
//!
//! Each collection lives in one document. Saving replaces the document in a
//! single rename so a reader sees either the old or the new contents.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::CostbookError;

fn storage_error(action: &str, path: &Path, err: impl std::fmt::Display) -> CostbookError {
    CostbookError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

/// Load a document, falling back to `T::default()` when it is missing or
/// blank. A document that exists but does not parse is an error.
pub fn load_document<T, P>(path: P) -> Result<T, CostbookError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    let mut contents = String::new();
    match File::open(path) {
        Ok(mut file) => {
            file.read_to_string(&mut contents)
                .map_err(|e| storage_error("read", path, e))?;
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "document missing, starting empty");
            return Ok(T::default());
        }
        Err(e) => return Err(storage_error("open", path, e)),
    }

    if contents.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&contents).map_err(|e| storage_error("parse", path, e))
}

/// Scratch path next to `path`, unique to this process
fn scratch_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.tmp", process::id()));
    path.with_file_name(name)
}

fn write_scratch<T: Serialize>(scratch: &Path, data: &T) -> io::Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(scratch)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    writer.get_ref().sync_all()
}

/// Save a document, creating the data directory if needed
pub fn save_document<T, P>(path: P, data: &T) -> Result<(), CostbookError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| storage_error("create directory", dir, e))?;
    }

    let scratch = scratch_path(path);
    let outcome = write_scratch(&scratch, data).and_then(|()| fs::rename(&scratch, path));
    if let Err(e) = outcome {
        let _ = fs::remove_file(&scratch);
        return Err(storage_error("save", path, e));
    }

    debug!(path = %path.display(), "saved document");
    Ok(())
}
