use std::{fs::File, io, path::Path, sync::Mutex};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

const DEFAULT_FILTER: &str = "warn";

// --- Formatter ---

/// Plain single-line records, identical on stderr and in the log file:
///
/// ```text
/// 14:03:07.218 [warn ] scenario_core::calculations::agi_proxy: negative AGI override clamped to zero supplied=-5
/// ```
struct ScenarioLineFormat;

fn level_label(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "error",
        Level::WARN => "warn ",
        Level::INFO => "info ",
        Level::DEBUG => "debug",
        Level::TRACE => "trace",
    }
}

impl<S, N> FormatEvent<S, N> for ScenarioLineFormat
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

        write!(
            writer,
            "{} [{}] {}: ",
            Local::now().format("%H:%M:%S%.3f"),
            level_label(meta.level()),
            meta.target()
        )?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Builds the global filter.
///
/// An explicit `level` wins over `RUST_LOG`. It may be a bare level
/// (`"debug"`) or any `EnvFilter` directive (`"scenario_core=trace"`).
fn make_filter(level: Option<&str>) -> Result<EnvFilter> {
    match level {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log level '{directive}'")),
        None => Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))
}

/// Initializes logging. Call once at startup.
///
/// Records go to stderr, leaving stdout to the JSON report, and are also
/// appended to `log_file` when one is given (its directory must exist).
/// The filter is `level`, else `RUST_LOG`, else warnings only.
pub fn init_logging(
    level: Option<&str>,
    log_file: Option<&Path>,
) -> Result<()> {
    let filter = make_filter(level)?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(ScenarioLineFormat)
        .with_ansi(false)
        .with_writer(io::stderr);

    let file_layer = log_file
        .map(open_log_file)
        .transpose()?
        .map(|file| {
            tracing_subscriber::fmt::layer()
                .event_format(ScenarioLineFormat)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("logging already initialized")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn level_labels_share_one_width() {
        let levels = [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE];

        for level in levels {
            assert_eq!(level_label(&level).len(), 5, "{level}");
        }
        assert_eq!(level_label(&Level::WARN).trim_end(), "warn");
    }

    #[test]
    fn explicit_level_is_accepted() {
        assert!(make_filter(Some("debug")).is_ok());
        assert!(make_filter(Some("info,scenario_core=trace")).is_ok());
    }

    #[test]
    fn malformed_level_is_rejected() {
        let err = make_filter(Some("scenario_core=loud")).unwrap_err();

        assert!(err.to_string().contains("invalid log level"), "{err}");
    }

    #[test]
    fn missing_log_directory_is_reported() {
        let path = Path::new("/nonexistent-scenario-dir/scenario.log");

        let err = open_log_file(path).unwrap_err();

        assert!(err.to_string().contains("cannot open log file"), "{err}");
    }
}
