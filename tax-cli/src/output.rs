//! Report destinations: the console and sanitised files in an output
//! directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

/// Directory reports are written to unless told otherwise.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Largest report that will be written to disk.
pub const MAX_REPORT_BYTES: usize = 10 * 1024 * 1024;

const SAFE_FILE_NAME: &str = r"^[A-Za-z0-9_.-]+$";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("invalid file name '{name}': {reason}")]
    InvalidFileName { name: String, reason: &'static str },

    #[error("output directory '{}' is not writable", .path.display())]
    DirectoryNotWritable { path: PathBuf },

    #[error("report is {size} bytes, more than the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("failed to write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

/// Checks that `name` is a plain file name that stays inside the output
/// directory.
///
/// Surrounding whitespace is trimmed. Empty names, absolute paths, `..`,
/// directory separators and anything outside `[A-Za-z0-9_.-]` are refused.
pub fn sanitize_filename(name: &str) -> Result<String, OutputError> {
    let trimmed = name.trim();
    let invalid = |reason| {
        warn!(reason, "file name rejected");
        Err(OutputError::InvalidFileName {
            name: name.to_string(),
            reason,
        })
    };

    if trimmed.is_empty() {
        return invalid("file name cannot be empty");
    }
    let bytes = trimmed.as_bytes();
    if trimmed.starts_with('/') || (bytes.len() > 1 && bytes[1] == b':') {
        return invalid("absolute paths are not allowed");
    }
    if trimmed.contains("..") {
        return invalid("path traversal patterns (..) are not allowed");
    }
    if trimmed.contains('/') || trimmed.contains('\\') {
        return invalid("directory separators are not allowed");
    }
    if !Regex::new(SAFE_FILE_NAME)?.is_match(trimmed) {
        return invalid("only letters, digits, underscore, hyphen and dot are allowed");
    }

    Ok(trimmed.to_string())
}

/// `tax_calculation_YYYY-MM-DD_HHMMSS.txt`
pub fn default_file_name(now: NaiveDateTime) -> String {
    format!("tax_calculation_{}.txt", now.format("%Y-%m-%d_%H%M%S"))
}

/// Creates `dir` when missing and checks that it can be written to.
pub fn ensure_output_dir(dir: &Path) -> Result<(), OutputError> {
    fs::create_dir_all(dir).map_err(|source| OutputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let metadata = fs::metadata(dir).map_err(|source| OutputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    if metadata.permissions().readonly() {
        return Err(OutputError::DirectoryNotWritable {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

/// `dir/file_name`, or `dir/stem_1.ext`, `dir/stem_2.ext`, … when taken.
pub fn unique_path(
    dir: &Path,
    file_name: &str,
) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
        _ => (file_name, None),
    };
    warn!(file = file_name, "report file already exists; picking a new name");

    (1u32..)
        .map(|counter| match extension {
            Some(extension) => dir.join(format!("{stem}_{counter}.{extension}")),
            None => dir.join(format!("{stem}_{counter}")),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Where a report ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Console,
    File(PathBuf),
}

pub trait ReportWriter {
    fn write_report(
        &mut self,
        report: &str,
    ) -> Result<Destination, OutputError>;
}

/// Writes reports to a stream, normally stdout.
pub struct ConsoleWriter<W> {
    out: W,
}

impl<W: Write> ConsoleWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> ReportWriter for ConsoleWriter<W> {
    fn write_report(
        &mut self,
        report: &str,
    ) -> Result<Destination, OutputError> {
        let to_io = |source| OutputError::Io {
            path: PathBuf::from("<stdout>"),
            source,
        };
        self.out.write_all(report.as_bytes()).map_err(to_io)?;
        self.out.flush().map_err(to_io)?;
        Ok(Destination::Console)
    }
}

/// Writes each report to its own file in an output directory.
#[derive(Debug, Clone)]
pub struct FileWriter {
    dir: PathBuf,
    file_name: String,
    /// Custom names overwrite; generated names never do.
    overwrite: bool,
}

impl FileWriter {
    /// A writer using the timestamped default name.
    pub fn with_default_name(
        dir: impl Into<PathBuf>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            dir: dir.into(),
            file_name: default_file_name(now),
            overwrite: false,
        }
    }

    /// A writer for a user-chosen name. Only the final path component of
    /// `requested` is used, and it must pass [`sanitize_filename`].
    pub fn with_custom_name(
        dir: impl Into<PathBuf>,
        requested: &str,
    ) -> Result<Self, OutputError> {
        let base = Path::new(requested.trim())
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("");
        Ok(Self {
            dir: dir.into(),
            file_name: sanitize_filename(base)?,
            overwrite: true,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl ReportWriter for FileWriter {
    fn write_report(
        &mut self,
        report: &str,
    ) -> Result<Destination, OutputError> {
        let size = report.len();
        if size > MAX_REPORT_BYTES {
            return Err(OutputError::TooLarge {
                size,
                limit: MAX_REPORT_BYTES,
            });
        }

        ensure_output_dir(&self.dir)?;
        let path = if self.overwrite {
            self.dir.join(&self.file_name)
        } else {
            unique_path(&self.dir, &self.file_name)
        };

        fs::write(&path, report).map_err(|source| OutputError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(bytes = size, file = %path.display(), "report written");
        Ok(Destination::File(path))
    }
}
