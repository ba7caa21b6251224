//! Sink that writes to the host runtime.

use super::format::serialize_records;
use super::{OutputSink, SinkState};
use crate::config::{OutputFormat, OutputOptions};
use crate::errors::SinkError;
use crate::host::{ExecutionContextHandle, HostRuntimeHandle};
use crate::Record;
use std::fmt;
use tracing::debug;

/// Writes results to the bound [`HostRuntime`](crate::host::HostRuntime).
///
/// With format `None` every record is forwarded as it arrives. With a
/// document format, records are buffered and emitted as one serialized
/// string at close. Without a bound host, output goes to `tracing`.
pub struct HostSink {
    format: OutputFormat,
    json_indent: u8,
    host: Option<HostRuntimeHandle>,
    context: Option<ExecutionContextHandle>,
    buffer: Vec<Record>,
    state: SinkState,
}

impl HostSink {
    /// Creates a host sink from the output options.
    #[must_use]
    pub fn new(output: &OutputOptions) -> Self {
        Self {
            format: output.resolved_format(),
            json_indent: output.resolved_json_indent(),
            host: None,
            context: None,
            buffer: Vec::new(),
            state: SinkState::Open,
        }
    }

    /// Returns the number of records waiting for close.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn emit(&self, record: &Record) {
        match self.host {
            Some(ref host) => host.write_object(record),
            None => debug!(record = %record, "No host bound, dropping output object"),
        }
    }
}

impl fmt::Debug for HostSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostSink")
            .field("format", &self.format)
            .field("host_bound", &self.host.is_some())
            .field("context_bound", &self.context.is_some())
            .field("buffered", &self.buffer.len())
            .field("state", &self.state)
            .finish()
    }
}

impl OutputSink for HostSink {
    fn kind(&self) -> &'static str {
        "host"
    }

    fn bind_host_runtime(&mut self, host: Option<HostRuntimeHandle>) {
        self.host = host;
    }

    fn bind_execution_context(&mut self, context: Option<ExecutionContextHandle>) {
        self.context = context;
    }

    fn write(&mut self, record: Record) -> Result<(), SinkError> {
        self.state.ensure_writable(self.kind())?;
        match self.format {
            OutputFormat::None => self.emit(&record),
            OutputFormat::Json | OutputFormat::Yaml => self.buffer.push(record),
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        if !self.state.begin_close() || self.format == OutputFormat::None {
            return Ok(());
        }

        let records = std::mem::take(&mut self.buffer);
        let document = serialize_records(&records, self.format, self.json_indent)?;
        self.emit(&Record::String(document));
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    fn release(&mut self) -> Result<(), SinkError> {
        self.buffer.clear();
        self.host = None;
        self.context = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockHostRuntime;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_forwards_records_in_order() {
        let mut host = MockHostRuntime::new();
        let mut seq = Sequence::new();
        host.expect_write_object()
            .with(eq(json!({"id": 1})))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        host.expect_write_object()
            .with(eq(json!({"id": 2})))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        let mut sink = HostSink::new(&OutputOptions::new());
        sink.bind_host_runtime(Some(Arc::new(host)));
        sink.write(json!({"id": 1})).unwrap();
        sink.write(json!({"id": 2})).unwrap();
        sink.close().unwrap();
    }

    #[test]
    fn test_json_format_emits_one_document_at_close() {
        let mut host = MockHostRuntime::new();
        host.expect_write_object()
            .with(eq(json!("[1,2]")))
            .times(1)
            .return_const(());

        let mut sink = HostSink::new(
            &OutputOptions::new()
                .with_format(OutputFormat::Json)
                .with_json_indent(0),
        );
        sink.bind_host_runtime(Some(Arc::new(host)));
        sink.write(json!(1)).unwrap();
        sink.write(json!(2)).unwrap();
        assert_eq!(sink.buffered(), 2);

        sink.close().unwrap();
        sink.close().unwrap();
    }

    #[test]
    fn test_without_host() {
        let mut sink = HostSink::new(&OutputOptions::new());
        sink.write(json!("dropped")).unwrap();
        sink.close().unwrap();
        assert!(sink.is_closed());
        assert!(sink.write(json!("late")).is_err());
    }

    #[test]
    fn test_release_discards_buffer() {
        let mut host = MockHostRuntime::new();
        host.expect_write_object().times(0);

        let mut sink = HostSink::new(&OutputOptions::new().with_format(OutputFormat::Yaml));
        sink.bind_host_runtime(Some(Arc::new(host)));
        sink.write(json!(1)).unwrap();
        sink.release().unwrap();
        assert_eq!(sink.buffered(), 0);
    }
}
