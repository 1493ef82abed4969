// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use crate::{
    appender,
    error::{Error, Result},
    LogFormat, LogOutputDest,
};
use std::collections::BTreeMap;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_core::{Event, Level, Subscriber};
use tracing_subscriber::{
    filter::Targets,
    fmt::{
        self as tracing_fmt,
        format::Writer,
        time::{FormatTime, SystemTime},
        FmtContext, FormatEvent, FormatFields,
    },
    layer::Filter,
    registry::LookupSpan,
    reload::{self, Handle},
    Layer, Registry,
};

/// Env var holding the CSV of `target=level` pairs.
pub(crate) const BITSTREAM_LOG_ENV: &str = "BITSTREAM_LOG";

const MAX_LOG_SIZE: usize = 20 * 1024 * 1024;
const MAX_UNCOMPRESSED_LOG_FILES: usize = 10;
const MAX_LOG_FILES: usize = 1000;
// Trace for our crates and the http stack
const ALL_BITSTREAM_LOGS: &str = "all";
// Trace for our crates, info for the http stack
const VERBOSE_BITSTREAM_LOGS: &str = "v";

const BITSTREAM_CRATES: [&str; 3] = ["bitstream", "bitstream_cli", "bitstream_logging"];
const HTTP_CRATES: [&str; 3] = ["reqwest", "hyper", "hyper_util"];

type BoxedFilter = Box<dyn Filter<Registry> + Send + Sync>;

/// Handle to swap the target filter of a running subscriber.
pub struct ReloadHandle(pub(crate) Handle<BoxedFilter, Registry>);

impl ReloadHandle {
    /// Replace the active filter with the targets parsed from `logging_value`.
    ///
    /// Accepts the same syntax as `BITSTREAM_LOG`, e.g. `bitstream=DEBUG,all,reqwest=WARN`.
    pub fn modify_log_level(&self, logging_value: &str) -> Result<()> {
        let targets = get_logging_targets(logging_value)?;
        self.0.modify(|old_filter| {
            let new_filter: BoxedFilter = Box::new(Targets::new().with_targets(targets));
            *old_filter = new_filter;
        })?;

        Ok(())
    }
}

/// Writes `[time LEVEL module/span/span] message fields`.
#[derive(Default)]
pub(crate) struct LogFormatter;

impl<S, N> FormatEvent<S, N> for LogFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let level = *event.metadata().level();
        let module = event.metadata().module_path().unwrap_or("<unknown module>");

        write!(writer, "[")?;
        SystemTime.format_time(&mut writer)?;
        write!(writer, " {level} {module}")?;
        ctx.visit_spans(|span| write!(writer, "/{}", span.name()))?;
        write!(writer, "] ")?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

#[derive(Default)]
pub(crate) struct TracingLayers {
    pub(crate) layers: Vec<Box<dyn Layer<Registry> + Send + Sync>>,
    pub(crate) log_appender_guard: Option<WorkerGuard>,
}

impl TracingLayers {
    pub(crate) fn fmt_layer(
        &mut self,
        default_logging_targets: Vec<(String, Level)>,
        output_dest: &LogOutputDest,
        format: LogFormat,
        max_log_files: Option<usize>,
        max_archived_log_files: Option<usize>,
        print_updates_to_stdout: bool,
    ) -> Result<ReloadHandle> {
        let layer = match output_dest {
            LogOutputDest::Stdout => {
                if print_updates_to_stdout {
                    println!("Logging to stdout");
                }
                tracing_fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .event_format(LogFormatter)
                    .boxed()
            }
            LogOutputDest::Stderr => tracing_fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .event_format(LogFormatter)
                .with_writer(std::io::stderr)
                .boxed(),
            LogOutputDest::Path(path) => {
                std::fs::create_dir_all(path)?;
                if print_updates_to_stdout {
                    println!("Logging to directory: {path:?}");
                }

                let uncompressed = max_log_files.unwrap_or(MAX_UNCOMPRESSED_LOG_FILES);
                // total must exceed the uncompressed count for compression to kick in
                let total = match max_archived_log_files {
                    Some(archived) => archived + uncompressed,
                    None => std::cmp::max(uncompressed, MAX_LOG_FILES),
                };
                let (writer, guard) =
                    appender::file_rotater(path, MAX_LOG_SIZE, uncompressed, total);
                self.log_appender_guard = Some(guard);

                match format {
                    LogFormat::Json => tracing_fmt::layer()
                        .json()
                        .flatten_event(true)
                        .with_writer(writer)
                        .boxed(),
                    LogFormat::Default => tracing_fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer)
                        .event_format(LogFormatter)
                        .boxed(),
                }
            }
        };

        let targets = match std::env::var(BITSTREAM_LOG_ENV) {
            Ok(value) => {
                if print_updates_to_stdout {
                    println!("Using {BITSTREAM_LOG_ENV}={value}");
                }
                get_logging_targets(&value)?
            }
            Err(_) => default_logging_targets,
        };

        let target_filters: BoxedFilter = Box::new(Targets::new().with_targets(targets));
        let (filter, reload_handle) = reload::Layer::new(target_filters);
        self.layers.push(Box::new(layer.with_filter(filter)));

        Ok(ReloadHandle(reload_handle))
    }
}

/// Parses a CSV such as `bitstream=DEBUG,all,reqwest=WARN` into filter targets.
///
/// The `all` and `v` keywords expand to a preset for our crates and the http stack. Targets
/// named explicitly in the CSV win over the preset, whatever their position.
pub(crate) fn get_logging_targets(logging_env_value: &str) -> Result<Vec<(String, Level)>> {
    let mut explicit = BTreeMap::new();
    let mut all = false;
    let mut verbose = false;

    for entry in logging_env_value.split(',').map(str::trim) {
        if entry.is_empty() {
            continue;
        }
        if entry == ALL_BITSTREAM_LOGS {
            all = true;
            continue;
        }
        if entry == VERBOSE_BITSTREAM_LOGS {
            verbose = true;
            continue;
        }

        let mut split = entry.split('=');
        let target = split
            .next()
            .filter(|target| !target.is_empty())
            .ok_or_else(|| {
                Error::LoggingConfiguration(format!("Could not obtain a target from {entry:?}"))
            })?;
        let level = split.next().unwrap_or("trace");
        explicit.insert(target.to_string(), get_log_level_from_str(level)?);
    }

    let mut targets = BTreeMap::new();
    if all || verbose {
        for name in BITSTREAM_CRATES {
            targets.insert(name.to_string(), Level::TRACE);
        }
        let http_level = if all { Level::TRACE } else { Level::INFO };
        for name in HTTP_CRATES {
            targets.insert(name.to_string(), http_level);
        }
    }
    targets.extend(explicit);

    Ok(targets.into_iter().collect())
}

fn get_log_level_from_str(log_level: &str) -> Result<Level> {
    match log_level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::LoggingConfiguration(format!(
            "Log level {log_level} is not supported"
        ))),
    }
}
