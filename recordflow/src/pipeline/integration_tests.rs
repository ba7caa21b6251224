//! End-to-end pipeline scenarios.

#[cfg(test)]
mod tests {
    use crate::config::{OutputFormat, OutputOptions, PipelineOptions};
    use crate::context::PipelineContext;
    use crate::errors::{ConfigurationError, ErrorInfo, RecordflowError, SinkError};
    use crate::host::{MockExecutionContext, MockHostRuntime, StaticExecutionContext};
    use crate::pipeline::{
        PassthroughProcessor, Pipeline, PipelineBuilder, PipelineKind, PipelineLifecycle,
        PipelineState,
    };
    use crate::sink::{BufferSink, SinkRecorder, WRITE_FILE_ACTION};
    use crate::testing::{FailingSink, FailurePoint, ProcessorCall, RecordingProcessor};
    use crate::Record;
    use mockall::predicate::eq;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn recorded_builder() -> (PipelineBuilder<crate::pipeline::PassthroughKind>, Arc<Mutex<Vec<SinkRecorder>>>) {
        let recorders: Arc<Mutex<Vec<SinkRecorder>>> = Arc::default();
        let mut builder = PipelineBuilder::passthrough();
        let shared = recorders.clone();
        builder.with_sink_factory(move |_| {
            let sink = BufferSink::new();
            shared.lock().push(sink.recorder());
            Box::new(sink)
        });
        (builder, recorders)
    }

    fn recording_pipeline(
        processor: RecordingProcessor,
        sink: FailingSink,
    ) -> Pipeline<RecordingProcessor> {
        let ctx = PipelineContext::new("recording", PipelineOptions::new());
        Pipeline::new(ctx, Box::new(sink), processor)
    }

    #[test]
    fn test_minimal_scenario_one_write_one_close() {
        let (builder, recorders) = recorded_builder();
        let mut pipeline = builder.build().unwrap();

        pipeline.begin().unwrap();
        pipeline.process(json!({"name": "x"})).unwrap();
        pipeline.end().unwrap();
        let report = pipeline.release();

        assert!(report.is_clean());
        let recorder = recorders.lock()[0].clone();
        assert_eq!(recorder.write_count(), 1);
        assert_eq!(recorder.close_calls(), 1);
        assert!(!recorder.host_bound());
        assert!(!recorder.context_bound());
    }

    #[test]
    fn test_release_before_begin_scenario() {
        let (builder, recorders) = recorded_builder();
        let mut pipeline = builder.build().unwrap();

        let report = pipeline.release();

        assert!(report.performed);
        assert_eq!(pipeline.state(), PipelineState::Released);
        assert_eq!(recorders.lock()[0].release_calls(), 1);
    }

    #[test]
    fn test_two_builds_are_independent() {
        let (mut builder, recorders) = recorded_builder();
        builder.configure(Some(
            &PipelineOptions::new().with_output(OutputOptions::new().with_format(OutputFormat::Json)),
        ));

        let mut first = builder.build().unwrap();
        let mut second = builder.build().unwrap();

        assert_ne!(first.context().run_id(), second.context().run_id());
        assert_eq!(first.context().options(), second.context().options());

        first.begin().unwrap();
        first.process(json!(1)).unwrap();
        first.end().unwrap();
        first.release();

        assert_eq!(second.state(), PipelineState::Created);
        second.begin().unwrap();
        second.process(json!(2)).unwrap();
        second.end().unwrap();

        let recorders = recorders.lock();
        assert_eq!(recorders.len(), 2);
        assert_eq!(recorders[0].records(), vec![json!(1)]);
        assert_eq!(recorders[1].records(), vec![json!(2)]);
    }

    #[test]
    fn test_builder_state_survives_build() {
        let (mut builder, _) = recorded_builder();
        builder.configure(Some(
            &PipelineOptions::new().with_output(OutputOptions::new().with_json_indent(1)),
        ));
        let first = builder.build().unwrap();

        builder.configure(Some(
            &PipelineOptions::new().with_output(OutputOptions::new().with_json_indent(3)),
        ));
        let second = builder.build().unwrap();

        assert_eq!(first.context().output().json_indent, Some(1));
        assert_eq!(second.context().output().json_indent, Some(3));
    }

    #[test]
    fn test_processor_hooks_and_release_step() {
        let processor = RecordingProcessor::new();
        let observer = processor.clone();
        let mut pipeline = recording_pipeline(processor, FailingSink::new());

        pipeline.run(vec![json!("a"), json!("b")]).unwrap();

        assert_eq!(
            observer.calls(),
            vec![
                ProcessorCall::Begin,
                ProcessorCall::Process(json!("a")),
                ProcessorCall::Process(json!("b")),
                ProcessorCall::End,
                ProcessorCall::ReleaseStep,
                ProcessorCall::Released,
            ]
        );
    }

    #[test]
    fn test_fan_out_preserves_order() {
        let sink = FailingSink::new();
        let recorder = sink.recorder();
        let mut pipeline = recording_pipeline(RecordingProcessor::new().with_fan_out(2), sink);

        pipeline.run(vec![json!(1), json!(2)]).unwrap();

        assert_eq!(recorder.records(), vec![json!(1), json!(1), json!(2), json!(2)]);
    }

    #[test]
    fn test_zero_fan_out_writes_nothing() {
        let sink = FailingSink::new();
        let recorder = sink.recorder();
        let mut pipeline = recording_pipeline(RecordingProcessor::new().with_fan_out(0), sink);

        assert_eq!(pipeline.run(vec![json!(1), json!(2)]).unwrap(), 2);
        assert_eq!(recorder.write_count(), 0);
    }

    #[test]
    fn test_sink_write_error_surfaces_from_process() {
        let sink = FailingSink::new().failing_at(FailurePoint::WriteAfter(1));
        let mut pipeline = recording_pipeline(RecordingProcessor::new(), sink);

        pipeline.begin().unwrap();
        pipeline.process(json!(1)).unwrap();
        let err = pipeline.process(json!(2)).unwrap_err();

        assert!(matches!(err, RecordflowError::Sink(SinkError::Host(_))));
        assert_eq!(pipeline.processed(), 1);
        assert_eq!(pipeline.state(), PipelineState::Begun);
    }

    #[test]
    fn test_processor_error_surfaces_from_process() {
        let mut pipeline =
            recording_pipeline(RecordingProcessor::new().failing_at(0), FailingSink::new());

        let err = pipeline.run(vec![json!(1)]).unwrap_err();

        assert_eq!(err.to_string(), "Processing failed: record 0 rejected");
        assert!(pipeline.is_released());
    }

    #[test]
    fn test_sink_open_error_surfaces_from_begin() {
        let sink = FailingSink::new().failing_at(FailurePoint::Open);
        let processor = RecordingProcessor::new();
        let observer = processor.clone();
        let mut pipeline = recording_pipeline(processor, sink);

        assert!(pipeline.begin().unwrap_err().is_sink());
        assert_eq!(pipeline.state(), PipelineState::Released);
        assert!(pipeline.begin().unwrap_err().is_lifecycle_misuse());
        assert_eq!(observer.calls(), vec![ProcessorCall::Released]);
    }

    #[test]
    fn test_sink_close_error_surfaces_from_end() {
        let sink = FailingSink::new().failing_at(FailurePoint::Close);
        let processor = RecordingProcessor::new();
        let observer = processor.clone();
        let mut pipeline = recording_pipeline(processor, sink);

        pipeline.begin().unwrap();
        let err = pipeline.end().unwrap_err();

        assert!(matches!(err, RecordflowError::Sink(SinkError::Io(_))));
        assert_eq!(pipeline.state(), PipelineState::Ended);
        assert!(pipeline.sink().is_closed());
        assert!(observer.calls().contains(&ProcessorCall::End));
    }

    #[test]
    fn test_failing_release_still_marks_released() {
        let sink = FailingSink::new().failing_at(FailurePoint::Release);
        let processor = RecordingProcessor::new();
        let observer = processor.clone();
        let mut pipeline = recording_pipeline(processor, sink);
        pipeline.begin().unwrap();

        let report = pipeline.release();

        assert!(report.performed);
        assert_eq!(
            report.failures,
            vec![("sink".to_string(), "Host error: handle already gone".to_string())]
        );
        assert_eq!(report.completed, vec!["recording-processor", "processor"]);
        assert!(observer.calls().contains(&ProcessorCall::ReleaseStep));
        assert!(observer.calls().contains(&ProcessorCall::Released));
        assert_eq!(pipeline.state(), PipelineState::Released);
        assert!(!pipeline.release().performed);
    }

    #[test]
    fn test_panicking_release_is_contained() {
        let sink = FailingSink::new().failing_at(FailurePoint::ReleasePanic);
        let mut pipeline = recording_pipeline(RecordingProcessor::new(), sink);

        let report = pipeline.release();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].1, "panicked: release exploded");
        assert!(pipeline.is_released());
    }

    #[test]
    fn test_drive_through_trait_object() {
        let (builder, recorders) = recorded_builder();
        let noop = PipelineBuilder::no_op().build().unwrap();
        let passthrough = builder.build().unwrap();

        let mut pipelines: Vec<Box<dyn PipelineLifecycle>> = vec![Box::new(noop), Box::new(passthrough)];
        for pipeline in &mut pipelines {
            pipeline.begin().unwrap();
            pipeline.process(json!("shared")).unwrap();
            pipeline.end().unwrap();
            assert!(pipeline.release().performed);
            assert_eq!(pipeline.state(), PipelineState::Released);
        }

        assert_eq!(recorders.lock()[0].records(), vec![json!("shared")]);
    }

    #[derive(Debug)]
    struct StrictKind;

    impl PipelineKind for StrictKind {
        type Processor = PassthroughProcessor;

        fn name(&self) -> &str {
            "strict"
        }

        fn validate(&self, options: &PipelineOptions) -> Result<(), ConfigurationError> {
            if options.output.format == Some(OutputFormat::Yaml) && options.output.json_indent.is_some() {
                return Err(ConfigurationError::new("jsonIndent has no meaning for yaml output")
                    .with_info(ErrorInfo::new("STRICT-CONFLICT", "Contradictory output options")));
            }
            Ok(())
        }

        fn processor(&self, _context: &PipelineContext) -> PassthroughProcessor {
            PassthroughProcessor
        }
    }

    #[test]
    fn test_custom_kind_validation() {
        let mut builder = PipelineBuilder::new(StrictKind);
        builder
            .configure(Some(
                &PipelineOptions::new().with_output(OutputOptions::new().with_format(OutputFormat::Yaml)),
            ))
            .configure(Some(
                &PipelineOptions::new().with_output(OutputOptions::new().with_json_indent(2)),
            ));

        let err = builder.build().unwrap_err();
        assert_eq!(err.code(), Some("STRICT-CONFLICT"));
    }

    #[test]
    fn test_export_end_to_end() {
        let dir = tempfile::tempdir().unwrap();

        let mut host = MockHostRuntime::new();
        host.expect_should_process()
            .with(eq(dir.path().join("out/repos.json").display().to_string()), eq(WRITE_FILE_ACTION))
            .times(1)
            .return_const(true);

        let mut exec = MockExecutionContext::new();
        let cwd = dir.path().to_path_buf();
        exec.expect_working_directory().returning(move || Some(cwd.clone()));

        let mut builder = PipelineBuilder::export(
            &PipelineOptions::new().with_output(OutputOptions::new().with_path("out/repos.json")),
        );
        builder
            .configure(Some(
                &PipelineOptions::new().with_output(OutputOptions::new().with_json_indent(0)),
            ))
            .bind_host_runtime(Some(Arc::new(host)))
            .bind_execution_context(Some(Arc::new(exec)));

        let mut pipeline = builder.build().unwrap();
        let records: Vec<Record> = vec![json!({"name": "a"}), json!(null), json!({"name": "b"})];
        let count = pipeline.run(records).unwrap();

        assert_eq!(count, 3);
        assert_eq!(pipeline.processor().exported(), 2);
        let written = std::fs::read_to_string(dir.path().join("out/repos.json")).unwrap();
        assert_eq!(written, r#"[{"name":"a"},{"name":"b"}]"#);
    }

    #[test]
    fn test_export_released_without_end_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut builder = PipelineBuilder::export(
            &PipelineOptions::new().with_output(OutputOptions::new().with_path("partial.json")),
        );
        builder.bind_execution_context(Some(Arc::new(
            StaticExecutionContext::new().with_working_directory(dir.path()),
        )));

        let mut pipeline = builder.build().unwrap();
        pipeline.begin().unwrap();
        pipeline.process(json!({"name": "a"})).unwrap();
        drop(pipeline);

        assert!(!dir.path().join("partial.json").exists());
    }
}
