//! Sink that writes a serialized document to a file.

use super::format::{encode_text, serialize_records};
use super::{OutputSink, SinkState};
use crate::config::{OutputEncoding, OutputFormat, OutputOptions};
use crate::errors::SinkError;
use crate::host::{ExecutionContextHandle, HostRuntimeHandle};
use crate::Record;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Action name passed to `HostRuntime::should_process`.
pub const WRITE_FILE_ACTION: &str = "Write output file";

/// Buffers records and writes them as one document at close.
///
/// Relative paths are resolved against the execution context's working
/// directory when one is bound. The host runtime, when bound, must approve
/// the write; a declined write is skipped rather than failed.
pub struct FileSink {
    path: PathBuf,
    format: OutputFormat,
    encoding: OutputEncoding,
    json_indent: u8,
    host: Option<HostRuntimeHandle>,
    context: Option<ExecutionContextHandle>,
    buffer: Vec<Record>,
    state: SinkState,
    written: Option<PathBuf>,
}

impl FileSink {
    /// Creates a file sink writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, output: &OutputOptions) -> Self {
        let format = match output.resolved_format() {
            OutputFormat::None => OutputFormat::Json,
            other => other,
        };
        Self {
            path: path.into(),
            format,
            encoding: output.resolved_encoding(),
            json_indent: output.resolved_json_indent(),
            host: None,
            context: None,
            buffer: Vec::new(),
            state: SinkState::Open,
            written: None,
        }
    }

    /// Returns the path the document was written to, if it was written.
    #[must_use]
    pub fn written(&self) -> Option<&Path> {
        self.written.as_deref()
    }

    /// Resolves the configured path against the bound working directory.
    #[must_use]
    pub fn resolved_path(&self) -> PathBuf {
        if self.path.is_absolute() {
            return self.path.clone();
        }
        self.context
            .as_ref()
            .and_then(|ctx| ctx.working_directory())
            .map_or_else(|| self.path.clone(), |dir| dir.join(&self.path))
    }

    fn approved(&self, target: &Path) -> bool {
        let target = target.display().to_string();
        match self.host {
            Some(ref host) => host.should_process(&target, WRITE_FILE_ACTION),
            None => true,
        }
    }
}

impl fmt::Debug for FileSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSink")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("encoding", &self.encoding)
            .field("buffered", &self.buffer.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl OutputSink for FileSink {
    fn kind(&self) -> &'static str {
        "file"
    }

    fn bind_host_runtime(&mut self, host: Option<HostRuntimeHandle>) {
        self.host = host;
    }

    fn bind_execution_context(&mut self, context: Option<ExecutionContextHandle>) {
        self.context = context;
    }

    fn write(&mut self, record: Record) -> Result<(), SinkError> {
        self.state.ensure_writable(self.kind())?;
        self.buffer.push(record);
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if !self.state.begin_close() {
            return Ok(());
        }

        let records = std::mem::take(&mut self.buffer);
        let target = self.resolved_path();

        if !self.approved(&target) {
            info!(path = %target.display(), "Host declined output file write");
            if let Some(ref host) = self.host {
                host.write_verbose(&format!("Skipped writing {}", target.display()));
            }
            return Ok(());
        }

        let document = serialize_records(&records, self.format, self.json_indent)?;
        let bytes = encode_text(&document, self.encoding);

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, bytes)?;

        debug!(path = %target.display(), records = records.len(), "Wrote output file");
        self.written = Some(target);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    fn release(&mut self) -> Result<(), SinkError> {
        if !self.buffer.is_empty() {
            debug!(
                path = %self.path.display(),
                records = self.buffer.len(),
                "Discarding unwritten output on release"
            );
        }
        self.buffer.clear();
        self.host = None;
        self.context = None;
        Ok(())
    }
}
