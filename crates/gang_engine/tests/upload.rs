use std::fs;
use std::sync::{Arc, Mutex};

use gang_core::{Agent, DebateState};
use gang_engine::{
    ActorError, BackendActor, ChunkedUploader, EngineEvent, FailureKind, FileSource,
    InMemorySource, ProgressSink, UploadError, UploadProgress, UploadSettings,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RoutedChunk {
    filename: String,
    preview: String,
    size: u64,
}

/// Records every routed chunk; optionally fails the n-th call (0-based).
#[derive(Default)]
struct RecordingActor {
    routed: Mutex<Vec<RoutedChunk>>,
    fail_at: Option<usize>,
}

impl RecordingActor {
    fn failing_at(index: usize) -> Self {
        Self {
            fail_at: Some(index),
            ..Self::default()
        }
    }

    fn routed(&self) -> Vec<RoutedChunk> {
        self.routed.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl BackendActor for RecordingActor {
    async fn get_status(&self) -> Result<DebateState, ActorError> {
        Ok(DebateState::default())
    }

    async fn start_boardroom_debate(&self, _prompt: &str) -> Result<Option<String>, ActorError> {
        Ok(None)
    }

    async fn abort_debate(&self, _reason: &str) -> Result<(), ActorError> {
        Ok(())
    }

    async fn clear_boardroom(&self) -> Result<(), ActorError> {
        Ok(())
    }

    async fn route_document(
        &self,
        filename: &str,
        preview: &str,
        size: u64,
    ) -> Result<String, ActorError> {
        let mut routed = self.routed.lock().unwrap();
        if self.fail_at == Some(routed.len()) {
            return Err(ActorError {
                kind: FailureKind::HttpStatus(500),
                message: "router down".into(),
            });
        }
        routed.push(RoutedChunk {
            filename: filename.to_string(),
            preview: preview.to_string(),
            size,
        });
        Ok(if routed.len() == 1 { "The_Librarian" } else { "Janet" }.to_string())
    }

    async fn get_agent_registry(&self) -> Result<Vec<Agent>, ActorError> {
        Ok(Vec::new())
    }

    async fn toggle_agent_status(&self, _name: &str, _enabled: bool) -> Result<(), ActorError> {
        Ok(())
    }

    async fn initialize_agents(&self) -> Result<(), ActorError> {
        Ok(())
    }
}

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn progress(&self) -> Vec<UploadProgress> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::UploadProgress(progress) => Some(progress.clone()),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn small_chunks() -> ChunkedUploader {
    ChunkedUploader::new(UploadSettings {
        chunk_size: 10,
        preview_bytes: 4,
    })
}

#[tokio::test]
async fn splits_file_into_ordered_chunks() {
    gang_logging::initialize_for_tests();
    let actor = RecordingActor::default();
    let sink = TestSink::default();
    let mut source = InMemorySource::new("notes.txt", b"0123456789abcdefghijXYZ".to_vec());

    let outcome = small_chunks()
        .upload(&actor, &mut source, &sink)
        .await
        .unwrap();

    assert_eq!(outcome.routed_agent, "The_Librarian");
    assert_eq!(outcome.chunks, 3);
    assert_eq!(outcome.bytes, 23);

    let routed = actor.routed();
    assert_eq!(
        routed,
        vec![
            RoutedChunk {
                filename: "notes.txt_chunk_1_of_3".into(),
                preview: "0123".into(),
                size: 10,
            },
            RoutedChunk {
                filename: "notes.txt_chunk_2_of_3".into(),
                preview: "abcd".into(),
                size: 10,
            },
            RoutedChunk {
                filename: "notes.txt_chunk_3_of_3".into(),
                preview: "XYZ".into(),
                size: 3,
            },
        ]
    );
    assert_eq!(routed.iter().map(|c| c.size).sum::<u64>(), 23);

    let percents: Vec<u8> = sink.progress().iter().map(|p| p.percent).collect();
    assert_eq!(percents, vec![43, 87, 100]);
}

#[tokio::test]
async fn binary_chunks_carry_whole_file_placeholder() {
    let actor = RecordingActor::default();
    let sink = TestSink::default();
    let mut source = InMemorySource::new("blob.bin", vec![0u8; 15]);

    small_chunks().upload(&actor, &mut source, &sink).await.unwrap();

    for chunk in actor.routed() {
        assert_eq!(chunk.preview, "[Binary file: blob.bin, 15 bytes]");
    }
}

#[tokio::test]
async fn failure_stops_remaining_chunks() {
    let actor = RecordingActor::failing_at(1);
    let sink = TestSink::default();
    let mut source = InMemorySource::new("notes.txt", vec![b'x'; 30]);

    let err = small_chunks()
        .upload(&actor, &mut source, &sink)
        .await
        .unwrap_err();

    match &err {
        UploadError::Submit {
            chunk_index,
            total_chunks,
            source,
        } => {
            assert_eq!(*chunk_index, 1);
            assert_eq!(*total_chunks, 3);
            assert_eq!(source.kind, FailureKind::HttpStatus(500));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().starts_with("chunk 2 of 3 was not routed"));
    assert_eq!(actor.routed().len(), 1);
    assert_eq!(sink.progress().len(), 1);
}

#[tokio::test]
async fn empty_file_is_rejected_without_remote_call() {
    let actor = RecordingActor::default();
    let sink = TestSink::default();
    let mut source = InMemorySource::new("empty.txt", Vec::new());

    let err = small_chunks()
        .upload(&actor, &mut source, &sink)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        UploadError::EmptyFile {
            name: "empty.txt".into()
        }
    );
    assert!(actor.routed().is_empty());
}

#[tokio::test]
async fn file_source_reads_from_disk() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("report.md");
    fs::write(&path, "# Report\nbody text here").unwrap();

    let actor = RecordingActor::default();
    let sink = TestSink::default();
    let mut source = FileSource::open(&path, "report.md").unwrap();

    let outcome = small_chunks()
        .upload(&actor, &mut source, &sink)
        .await
        .unwrap();
    assert_eq!(outcome.bytes, 23);
    assert_eq!(actor.routed()[0].preview, "# Re");
    assert_eq!(sink.progress().last().map(|p| p.percent), Some(100));
}

#[test]
fn missing_file_cannot_be_opened() {
    let temp = TempDir::new().unwrap();
    let err = FileSource::open(&temp.path().join("nope.txt"), "nope.txt").unwrap_err();
    assert!(matches!(err, UploadError::Open { .. }));
}
