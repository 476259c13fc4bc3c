//! Shared fixtures for app integration tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use actrando_app::{AppError, DownloadError, DownloadSink, PipelineController};
use actrando_core::GenerationOptions;
use actrando_rom::{INTERNAL_NAME, INTERNAL_NAME_OFFSET, ROM_SIZE};
use actrando_store::{MemoryStorageBackend, RomStore};
use actrando_worker::{
    Transform, TransformError, TransformOutput, WorkerError, WorkerEvent, WorkerHandle,
    service_request,
};

/// Builds a structurally valid ROM image fixture.
#[allow(dead_code)]
pub fn valid_rom() -> Vec<u8> {
    let mut bytes = vec![0_u8; ROM_SIZE];
    bytes[INTERNAL_NAME_OFFSET..INTERNAL_NAME_OFFSET + INTERNAL_NAME.len()]
        .copy_from_slice(INTERNAL_NAME);
    bytes
}

/// Deterministic stand-in for the external randomization engine.
///
/// Echoes the input image with the last byte marked, and reports a fixed
/// map layout so race fingerprints are reproducible.
pub struct StubTransform {
    /// Map-layout metadata reported with every output.
    pub map_numbers: Vec<u16>,
    /// When set, every generate call fails with this message.
    pub fail_with: Option<String>,
}

impl Default for StubTransform {
    fn default() -> Self {
        Self {
            map_numbers: vec![0x101, 0x702, 0x203, 0x304],
            fail_with: None,
        }
    }
}

impl Transform for StubTransform {
    fn generate(
        &self,
        mut rom: Vec<u8>,
        _is_race_seed: bool,
        _seed: Option<u32>,
        _options: &GenerationOptions,
    ) -> Result<TransformOutput, TransformError> {
        if let Some(message) = &self.fail_with {
            return Err(TransformError(message.clone()));
        }

        if let Some(last) = rom.last_mut() {
            *last = 0xAA;
        }
        Ok(TransformOutput {
            rom,
            map_numbers: self.map_numbers.clone(),
            marahna_path: actrando_core::MarahnaPath::Left,
            boss_rush_type: actrando_core::BossRushType::Consecutive,
        })
    }
}

/// In-process worker stub: services each request synchronously so tests can
/// drive the controller without a real worker thread.
pub struct InlineWorker {
    transform: StubTransform,
    version: String,
    pending: VecDeque<WorkerEvent>,
    sent: Rc<Cell<usize>>,
}

impl InlineWorker {
    /// Creates an inline worker around `transform`, sharing a dispatched
    /// request counter with the caller.
    #[allow(dead_code)]
    pub fn new(transform: StubTransform) -> (Self, Rc<Cell<usize>>) {
        let sent = Rc::new(Cell::new(0));
        let worker = Self {
            transform,
            version: actrando_app::app_version().to_string(),
            pending: VecDeque::new(),
            sent: Rc::clone(&sent),
        };
        (worker, sent)
    }
}

impl WorkerHandle for InlineWorker {
    fn send(
        &mut self,
        request: actrando_core::GenerationRequest,
    ) -> Result<(), WorkerError> {
        self.sent.set(self.sent.get() + 1);
        let event = service_request(&self.transform, &self.version, request);
        self.pending.push_back(event);
        Ok(())
    }

    fn try_recv(&mut self) -> Result<Option<WorkerEvent>, WorkerError> {
        Ok(self.pending.pop_front())
    }
}

/// Download sink recording every saved file for assertions.
pub struct RecordingDownloadSink {
    saved: Rc<RefCell<Vec<(String, Vec<u8>)>>>,
}

impl RecordingDownloadSink {
    /// Creates a sink plus a shared view of its saved files.
    #[allow(dead_code)]
    pub fn new() -> (Self, Rc<RefCell<Vec<(String, Vec<u8>)>>>) {
        let saved = Rc::new(RefCell::new(Vec::new()));
        let sink = Self {
            saved: Rc::clone(&saved),
        };
        (sink, saved)
    }
}

impl DownloadSink for RecordingDownloadSink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), DownloadError> {
        self.saved
            .borrow_mut()
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(())
    }
}

/// Download sink that rejects every save.
#[allow(dead_code)]
pub struct FailingDownloadSink;

impl DownloadSink for FailingDownloadSink {
    fn save(&mut self, _file_name: &str, _bytes: &[u8]) -> Result<(), DownloadError> {
        Err(DownloadError::Io("disk full".to_string()))
    }
}

/// Controller wired to a stubbed worker and recording sink, plus the shared
/// observers tests assert on.
#[allow(dead_code)]
pub type TestController<B> = PipelineController<B, InlineWorker, RecordingDownloadSink>;

/// Builds a fully stubbed controller over `backend`.
#[allow(dead_code)]
pub fn controller_with_backend<B: actrando_store::StorageBackend>(
    backend: B,
    transform: StubTransform,
) -> Result<
    (
        TestController<B>,
        Rc<Cell<usize>>,
        Rc<RefCell<Vec<(String, Vec<u8>)>>>,
    ),
    AppError,
> {
    let (worker, sent) = InlineWorker::new(transform);
    let (sink, saved) = RecordingDownloadSink::new();
    let controller = PipelineController::new(RomStore::new(backend), worker, sink)?;
    Ok((controller, sent, saved))
}

/// Builds a stubbed controller over an unbounded in-memory store.
#[allow(dead_code)]
pub fn controller() -> Result<
    (
        TestController<MemoryStorageBackend>,
        Rc<Cell<usize>>,
        Rc<RefCell<Vec<(String, Vec<u8>)>>>,
    ),
    AppError,
> {
    controller_with_backend(MemoryStorageBackend::new(), StubTransform::default())
}
