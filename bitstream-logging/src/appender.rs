// Copyright 2024 MaidSafe.net limited.
//
// This SAFE Network Software is licensed to you under The General Public License (GPL), version 3.
// Unless required by applicable law or agreed to in writing, the SAFE Network Software distributed
// under the GPL Licence is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied. Please review the Licences for the specific language governing
// permissions and limitations relating to use of the SAFE Network Software.

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use std::{
    env,
    ffi::OsStr,
    fmt,
    io::{self, Write},
    path::Path,
};
use tracing_appender::non_blocking::{NonBlocking, NonBlockingBuilder, WorkerGuard};

/// Builds a non-blocking writer over a size-rotated log file named after the running binary.
///
/// `uncompressed_files` of the newest rotations are kept as plain text, the rest are
/// compressed until `max_files` is reached, after which the oldest are removed.
pub(super) fn file_rotater(
    dir: &Path,
    max_bytes: usize,
    uncompressed_files: usize,
    max_files: usize,
) -> (NonBlocking, WorkerGuard) {
    let binary_name = env::current_exe()
        .map(|path| {
            path.file_stem()
                .unwrap_or(OsStr::new("bitstream"))
                .to_string_lossy()
                .into_owned()
        })
        .unwrap_or_else(|_| "bitstream".to_string());

    let appender = RotatingAppender::new(
        dir.join(format!("{binary_name}.log")),
        AppendTimestamp::default(FileLimit::MaxFiles(max_files)),
        ContentLimit::BytesSurpassed(max_bytes),
        Compression::OnRotate(uncompressed_files),
    );

    // Blocking on a full buffer is preferred over dropping lines.
    NonBlockingBuilder::default().lossy(false).finish(appender)
}

/// A `Write` adapter over `FileRotate`, so it can back a `tracing_appender` worker.
pub(super) struct RotatingAppender {
    writer: FileRotate<AppendTimestamp>,
}

impl RotatingAppender {
    fn new(
        path: impl AsRef<Path>,
        suffix: AppendTimestamp,
        content_limit: ContentLimit,
        compression: Compression,
    ) -> Self {
        let writer = FileRotate::new(
            path.as_ref(),
            suffix,
            content_limit,
            compression,
            #[cfg(unix)]
            None,
        );
        Self { writer }
    }
}

impl Write for RotatingAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl fmt::Debug for RotatingAppender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotatingAppender").finish()
    }
}
