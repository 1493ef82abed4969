// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

//! `tracing` setup shared by the BitStream binaries and test suites.
//!
//! Targets are read from the `BITSTREAM_LOG` env var when it is set, e.g.
//! `BITSTREAM_LOG=bitstream=DEBUG,reqwest=WARN`. The `all` keyword turns on trace logging for
//! every BitStream crate and the http stack, `v` does the same but keeps the http stack at info.

mod appender;
mod error;
mod layers;

use crate::error::Result;
use layers::TracingLayers;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;
use tracing_core::dispatcher::DefaultGuard;
use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt};

pub use error::Error;
pub use layers::ReloadHandle;
pub use tracing_appender::non_blocking::WorkerGuard;

// re-exported as it is part of our public API
pub use tracing_core::Level;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutputDest {
    Stderr,
    Stdout,
    Path(PathBuf),
}

impl LogOutputDest {
    pub fn parse_from_str(val: &str) -> Result<Self> {
        match val {
            "stdout" => Ok(LogOutputDest::Stdout),
            "stderr" => Ok(LogOutputDest::Stderr),
            "data-dir" => {
                let dir = default_log_dir().ok_or_else(|| {
                    Error::LoggingConfiguration("could not obtain data directory path".to_string())
                })?;
                Ok(LogOutputDest::Path(dir))
            }
            // The directory does not need to exist yet, it is created on initialisation.
            value => Ok(LogOutputDest::Path(PathBuf::from(value))),
        }
    }
}

impl std::fmt::Display for LogOutputDest {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LogOutputDest::Stderr => write!(f, "stderr"),
            LogOutputDest::Stdout => write!(f, "stdout"),
            LogOutputDest::Path(p) => write!(f, "{}", p.to_string_lossy()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogFormat {
    Default,
    Json,
}

impl LogFormat {
    pub fn parse_from_str(val: &str) -> Result<Self> {
        match val {
            "default" => Ok(LogFormat::Default),
            "json" => Ok(LogFormat::Json),
            _ => Err(Error::LoggingConfiguration(
                "The only valid values for this argument are \"default\" or \"json\"".to_string(),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Default => "default",
            LogFormat::Json => "json",
        }
    }
}

/// `<data dir>/bitstream/client/logs/log_<timestamp>`
fn default_log_dir() -> Option<PathBuf> {
    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    dirs_next::data_dir().map(|dir| {
        dir.join("bitstream")
            .join("client")
            .join("logs")
            .join(format!("log_{timestamp}"))
    })
}

pub struct LogBuilder {
    default_logging_targets: Vec<(String, Level)>,
    output_dest: LogOutputDest,
    format: LogFormat,
    max_log_files: Option<usize>,
    max_archived_log_files: Option<usize>,
    print_updates_to_stdout: bool,
}

impl LogBuilder {
    /// Create a new builder.
    ///
    /// `default_logging_targets` apply when `BITSTREAM_LOG` is not set. Output goes to stderr in
    /// the default format unless changed.
    pub fn new(default_logging_targets: Vec<(String, Level)>) -> Self {
        Self {
            default_logging_targets,
            output_dest: LogOutputDest::Stderr,
            format: LogFormat::Default,
            max_log_files: None,
            max_archived_log_files: None,
            print_updates_to_stdout: true,
        }
    }

    pub fn output_dest(&mut self, output_dest: LogOutputDest) {
        self.output_dest = output_dest;
    }

    pub fn format(&mut self, format: LogFormat) {
        self.format = format
    }

    /// The max number of uncompressed log files to keep.
    pub fn max_log_files(&mut self, files: usize) {
        self.max_log_files = Some(files);
    }

    /// The max number of compressed log files to keep.
    pub fn max_archived_log_files(&mut self, files: usize) {
        self.max_archived_log_files = Some(files);
    }

    /// Setting this to false stops the builder from announcing its choices on stdout.
    pub fn print_updates_to_stdout(&mut self, print: bool) {
        self.print_updates_to_stdout = print;
    }

    /// Installs the global subscriber.
    ///
    /// The returned guard flushes the file writer on drop and must be held for the life of the
    /// program. Call this once; later calls only print a warning.
    pub fn initialize(self) -> Result<(ReloadHandle, Option<WorkerGuard>)> {
        let mut layers = TracingLayers::default();

        let reload_handle = layers.fmt_layer(
            self.default_logging_targets,
            &self.output_dest,
            self.format,
            self.max_log_files,
            self.max_archived_log_files,
            self.print_updates_to_stdout,
        )?;

        if tracing_subscriber::registry()
            .with(layers.layers)
            .try_init()
            .is_err()
        {
            eprintln!("Tried to initialize and set global default subscriber more than once");
        }

        Ok((reload_handle, layers.log_appender_guard))
    }

    /// Thread-local subscriber for a single threaded (or current-thread tokio) test.
    ///
    /// Everything in `test_file_name` and our crates is traced to a timestamped directory under
    /// the data dir. Keep both guards alive until the end of the test.
    pub fn init_single_threaded_tokio_test(
        test_file_name: &str,
    ) -> (Option<WorkerGuard>, DefaultGuard) {
        let layers = Self::get_test_layers(test_file_name);
        let log_guard = tracing_subscriber::registry()
            .with(layers.layers)
            .set_default();
        if let Some(test_name) = std::thread::current().name() {
            info!("Running test: {test_name}");
        }
        (layers.log_appender_guard, log_guard)
    }

    fn get_test_layers(test_file_name: &str) -> TracingLayers {
        std::env::set_var(
            layers::BITSTREAM_LOG_ENV,
            format!("{test_file_name}=TRACE,all"),
        );

        let output_dest = default_log_dir()
            .map(LogOutputDest::Path)
            .unwrap_or(LogOutputDest::Stdout);

        println!("Logging test at {test_file_name:?} to {output_dest}");

        let mut layers = TracingLayers::default();
        if let Err(err) = layers.fmt_layer(
            vec![],
            &output_dest,
            LogFormat::Default,
            None,
            None,
            false,
        ) {
            eprintln!("Failed to set up test logging: {err}");
        }
        layers
    }
}

#[cfg(test)]
mod tests {
    use crate::{layers::LogFormatter, LogBuilder, LogFormat, LogOutputDest, ReloadHandle};
    use color_eyre::Result;
    use std::path::PathBuf;
    use tracing::{trace, warn, Level};
    use tracing_subscriber::{
        filter::Targets,
        fmt as tracing_fmt,
        layer::{Filter, SubscriberExt},
        reload,
        util::SubscriberInitExt,
        Layer, Registry,
    };
    use tracing_test::internal::global_buf;

    #[test]
    fn output_dest_parses_keywords_and_paths() -> Result<()> {
        assert_eq!(LogOutputDest::parse_from_str("stdout")?, LogOutputDest::Stdout);
        assert_eq!(LogOutputDest::parse_from_str("stderr")?, LogOutputDest::Stderr);
        assert_eq!(
            LogOutputDest::parse_from_str("/tmp/bitstream-logs")?,
            LogOutputDest::Path(PathBuf::from("/tmp/bitstream-logs"))
        );
        Ok(())
    }

    #[test]
    fn builder_keeps_file_limits_and_quiet_flag() {
        let mut builder = LogBuilder::new(vec![("bitstream".to_string(), Level::INFO)]);
        assert!(builder.print_updates_to_stdout);

        builder.max_log_files(3);
        builder.max_archived_log_files(5);
        builder.print_updates_to_stdout(false);

        assert_eq!(builder.max_log_files, Some(3));
        assert_eq!(builder.max_archived_log_files, Some(5));
        assert!(!builder.print_updates_to_stdout);
    }

    #[test]
    fn log_format_rejects_unknown_values() {
        assert!(LogFormat::parse_from_str("xml").is_err());
        assert_eq!(LogFormat::Json.as_str(), "json");
    }

    #[test]
    fn reload_handle_should_change_log_levels() -> Result<()> {
        let mock_writer = tracing_test::internal::MockWriter::new(global_buf());

        let layer = tracing_fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .event_format(LogFormatter)
            .with_writer(mock_writer)
            .boxed();

        let test_target = "bitstream_logging::tests".to_string();
        let target_filters: Box<dyn Filter<Registry> + Send + Sync> =
            Box::new(Targets::new().with_targets(vec![(test_target, Level::TRACE)]));

        let (filter, handle) = reload::Layer::new(target_filters);
        let reload_handle = ReloadHandle(handle);
        tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init()?;

        trace!("First trace event");

        {
            let buf = global_buf().lock().unwrap();
            let events: Vec<&str> = std::str::from_utf8(&buf)?.lines().collect();
            assert_eq!(events.len(), 1);
            assert!(events[0].contains("First trace event"));
        }

        reload_handle.modify_log_level("bitstream_logging::tests=WARN")?;

        trace!("Second trace event");
        warn!("First warn event");

        {
            let buf = global_buf().lock().unwrap();
            let events: Vec<&str> = std::str::from_utf8(&buf)?.lines().collect();
            assert_eq!(events.len(), 2);
            assert!(events[1].contains("First warn event"));
        }

        Ok(())
    }
}
