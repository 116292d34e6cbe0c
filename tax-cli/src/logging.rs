use anyhow::Result;
use chrono::Local;
use std::{
    fs::File,
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError},
};
use tracing::{Event, Level, Subscriber, warn};
use tracing_subscriber::{
    EnvFilter,
    Layer, // Layer is used by .with_filter() on both layers below
    filter::LevelFilter,
    fmt::{
        FmtContext, MakeWriter,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Default debug log written next to the working directory.
pub const DEFAULT_LOG_FILE: &str = "tax_calculator_debug.log";

// --- Formatter ---

struct LocalFmt;

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        if ansi {
            write!(writer, "\x1b[2m")?
        }
        write!(writer, "{} ", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        if ansi {
            write!(writer, "\x1b[0m")?
        }

        let (pre, post) = if ansi {
            match *meta.level() {
                Level::ERROR => ("\x1b[1;31m", "\x1b[0m"),
                Level::WARN => ("\x1b[1;33m", "\x1b[0m"),
                Level::INFO => ("\x1b[1;32m", "\x1b[0m"),
                Level::DEBUG => ("\x1b[1;34m", "\x1b[0m"),
                Level::TRACE => ("\x1b[1;35m", "\x1b[0m"),
            }
        } else {
            ("", "")
        };
        write!(writer, "{}{:>5}{} ", pre, meta.level(), post)?;

        // File and line only where they help: the debug log.
        if !ansi {
            let file = meta.file().map(|f| {
                f.strip_prefix("src/")
                    .or_else(|| f.strip_prefix("src\\"))
                    .unwrap_or(f)
            });
            if let (Some(file), Some(line)) = (file, meta.line()) {
                write!(writer, "{file}:{line} ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// --- Late-bound file writer ---

/// Debug log destination that can be opened after the subscriber is
/// installed. Writes are dropped while it is empty.
#[derive(Clone, Default)]
struct FileSlot(Arc<Mutex<Option<File>>>);

impl FileSlot {
    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(
        &self,
        file: File,
    ) {
        *self.lock() = Some(file);
    }
}

struct SlotWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for SlotWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.0.as_mut().map_or(Ok(buf.len()), |file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), File::flush)
    }
}

impl<'a> MakeWriter<'a> for FileSlot {
    type Writer = SlotWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SlotWriter(self.lock())
    }
}

static FILE_SLOT: OnceLock<FileSlot> = OnceLock::new();

// --- Public API ---

/// How chatty the console should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet,
    #[default]
    Normal,
    /// Everything down to DEBUG.
    Verbose,
}

impl Verbosity {
    pub fn from_flags(
        verbose: bool,
        quiet: bool,
    ) -> Self {
        match (verbose, quiet) {
            (true, _) => Self::Verbose,
            (false, true) => Self::Quiet,
            (false, false) => Self::Normal,
        }
    }

    fn level(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::WARN,
            Self::Normal => LevelFilter::INFO,
            Self::Verbose => LevelFilter::DEBUG,
        }
    }
}

/// Logging configuration derived from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub verbosity: Verbosity,
    /// Debug log destination; `None` disables file logging.
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Normal,
            log_file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }
}

fn console_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(verbosity.level().into()))
}

/// Starts appending DEBUG log output to `path`.
/// If a file is already open it is replaced.
/// The directory must already exist.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| anyhow::anyhow!("cannot open log file '{}': {e}", path.display()))?;

    let Some(slot) = FILE_SLOT.get() else {
        anyhow::bail!("logging not yet initialized");
    };
    slot.replace(file);
    Ok(())
}

/// Initializes logging. Call once at startup.
///
/// - Console (stderr): colored when attached to a terminal, plain when piped.
///   Level from `config.verbosity`, or the RUST_LOG env var when set.
/// - File: DEBUG and above, when `config.log_file` is set. A log file that
///   cannot be opened is reported as a warning; the program carries on.
pub fn init_logging(config: &LogConfig) {
    let slot = FILE_SLOT.get_or_init(FileSlot::default).clone();

    let console_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(console_filter(config.verbosity));

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(false)
        .with_writer(slot)
        .with_filter(LevelFilter::DEBUG);

    let installed = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        return;
    }

    let Some(path) = &config.log_file else {
        return;
    };
    if let Err(error) = enable_file_logging(path) {
        warn!(%error, "file logging disabled");
    }
}
