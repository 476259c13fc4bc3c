#![warn(missing_docs)]
//! # actrando-worker
//!
//! ## Purpose
//! Runs the opaque randomization transform in an isolated worker context and
//! answers each generation request with exactly one response.
//!
//! ## Responsibilities
//! - Define the [`Transform`] interface the external randomizer implements.
//! - Spawn a dedicated worker thread that initializes its transform once and
//!   then services queued requests in arrival order.
//! - Construct the output filename, including the race-mode fingerprint.
//! - Expose a [`WorkerHandle`] abstraction so the controller can be driven
//!   against an in-process stub in tests.
//!
//! ## Data flow
//! Controller sends a [`GenerationRequest`] through the handle (the ROM
//! buffer moves with it) -> worker thread invokes the transform -> one
//! [`WorkerEvent`] travels back carrying the result or the failure.
//!
//! ## Ownership and lifetimes
//! Requests and results own their buffers; the worker retains no state from
//! either after posting its reply.
//!
//! ## Error model
//! Transform failures are reported as [`WorkerEvent::Failed`] rather than
//! crashing the worker loop, so the controller can leave its busy phase.
//! Channel breakage surfaces as [`WorkerError`].

use std::sync::mpsc::{Receiver, Sender, TryRecvError, channel};
use std::thread::JoinHandle;

use actrando_core::{GenerationOptions, GenerationRequest, GenerationResult, SeedSpec};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Base name of every generated file.
pub const OUTPUT_BASE_NAME: &str = "actraiser";

/// Marker used in place of the seed for race-mode filenames.
pub const RACE_SEED_MARKER: &str = "RACE";

/// File extension of generated images.
pub const OUTPUT_EXTENSION: &str = ".sfc";

/// Length of the race-mode fingerprint in hex characters.
pub const FINGERPRINT_LENGTH: usize = 8;

/// Output of the external randomization transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    /// Modified ROM image.
    pub rom: Vec<u8>,
    /// Shuffled map-layout metadata, input to the race fingerprint.
    pub map_numbers: Vec<u16>,
    /// Marahna path the transform resolved (chosen or coin-flipped).
    pub marahna_path: actrando_core::MarahnaPath,
    /// Boss-rush type the transform resolved.
    pub boss_rush_type: actrando_core::BossRushType,
}

/// The external randomization engine, treated as opaque by this pipeline.
///
/// Implementations must be deterministic for a given `(rom, seed, options)`
/// triple when `is_race_seed` is `false`.
pub trait Transform: Send {
    /// Produces a modified image and its layout metadata.
    ///
    /// `seed` is ignored when `is_race_seed` is set; the transform then
    /// chooses its own hidden seed.
    ///
    /// # Errors
    /// Returns [`TransformError`] when the transform cannot complete; the
    /// worker reports this back instead of retrying.
    fn generate(
        &self,
        rom: Vec<u8>,
        is_race_seed: bool,
        seed: Option<u32>,
        options: &GenerationOptions,
    ) -> Result<TransformOutput, TransformError>;
}

/// Error surfaced by the external transform.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("transform failure: {0}")]
pub struct TransformError(pub String);

/// Messages posted back to the controller context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    /// Generation finished; carries the downloadable result.
    Generated(GenerationResult),
    /// Transform or worker initialization failed.
    Failed(String),
}

/// Handle through which the controller talks to its worker context.
///
/// Request and response correlate 1:1 without identifiers: the controller's
/// phase guard prevents a second request from ever being in flight.
pub trait WorkerHandle {
    /// Dispatches one request, transferring ownership of the ROM buffer.
    ///
    /// # Errors
    /// Returns [`WorkerError::Disconnected`] when the worker context is gone.
    fn send(&mut self, request: GenerationRequest) -> Result<(), WorkerError>;

    /// Drains at most one pending event without blocking.
    ///
    /// # Errors
    /// Returns [`WorkerError::Disconnected`] when the worker context is gone.
    fn try_recv(&mut self) -> Result<Option<WorkerEvent>, WorkerError>;
}

enum WorkerCommand {
    Generate(GenerationRequest),
    Shutdown,
}

/// Thread-backed worker runtime.
///
/// The thread performs its one-time initialization (constructing the
/// transform) before entering the service loop; requests sent earlier simply
/// queue in the command channel and are processed in arrival order.
pub struct WorkerRuntime {
    command_tx: Sender<WorkerCommand>,
    event_rx: Receiver<WorkerEvent>,
    worker_join: Option<JoinHandle<()>>,
}

impl WorkerRuntime {
    /// Spawns the worker thread.
    ///
    /// `version` participates in the race-mode fingerprint; `factory` runs on
    /// the worker thread and produces the transform instance. A factory
    /// failure is reported as one [`WorkerEvent::Failed`] and the thread
    /// exits.
    ///
    /// # Errors
    /// Returns [`WorkerError::Spawn`] when the OS refuses the thread.
    pub fn spawn<T, F>(version: impl Into<String>, factory: F) -> Result<Self, WorkerError>
    where
        T: Transform,
        F: FnOnce() -> Result<T, TransformError> + Send + 'static,
    {
        let (command_tx, command_rx) = channel::<WorkerCommand>();
        let (event_tx, event_rx) = channel::<WorkerEvent>();
        let version = version.into();

        let worker_join = std::thread::Builder::new()
            .name("actrando-generation-worker".to_string())
            .spawn(move || {
                let transform = match factory() {
                    Ok(transform) => transform,
                    Err(error) => {
                        let _ = event_tx.send(WorkerEvent::Failed(format!(
                            "worker initialization failed: {error}"
                        )));
                        return;
                    }
                };

                while let Ok(command) = command_rx.recv() {
                    match command {
                        WorkerCommand::Generate(request) => {
                            let event = service_request(&transform, &version, request);
                            if event_tx.send(event).is_err() {
                                break;
                            }
                        }
                        WorkerCommand::Shutdown => break,
                    }
                }
            })
            .map_err(|error| WorkerError::Spawn(error.to_string()))?;

        Ok(Self {
            command_tx,
            event_rx,
            worker_join: Some(worker_join),
        })
    }

    /// Stops the worker thread and waits for it to finish.
    pub fn shutdown(mut self) {
        let _ = self.command_tx.send(WorkerCommand::Shutdown);
        if let Some(worker_join) = self.worker_join.take() {
            let _ = worker_join.join();
        }
    }
}

impl WorkerHandle for WorkerRuntime {
    fn send(&mut self, request: GenerationRequest) -> Result<(), WorkerError> {
        self.command_tx
            .send(WorkerCommand::Generate(request))
            .map_err(|_| WorkerError::Disconnected)
    }

    fn try_recv(&mut self) -> Result<Option<WorkerEvent>, WorkerError> {
        match self.event_rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(WorkerError::Disconnected),
        }
    }
}

impl Drop for WorkerRuntime {
    fn drop(&mut self) {
        let _ = self.command_tx.send(WorkerCommand::Shutdown);
        if let Some(worker_join) = self.worker_join.take() {
            let _ = worker_join.join();
        }
    }
}

/// Services exactly one request, producing exactly one event.
pub fn service_request<T: Transform>(
    transform: &T,
    version: &str,
    request: GenerationRequest,
) -> WorkerEvent {
    let GenerationRequest { rom, seed, options } = request;
    let (is_race_seed, seed_value) = match seed {
        SeedSpec::Race => (true, None),
        SeedSpec::Explicit(value) => (false, Some(value)),
    };

    match transform.generate(rom, is_race_seed, seed_value, &options) {
        Ok(output) => {
            let fingerprint =
                is_race_seed.then(|| map_fingerprint(version, &output.map_numbers));
            let file_name = build_file_name(seed, &options, fingerprint.as_deref());
            WorkerEvent::Generated(GenerationResult {
                rom: output.rom,
                file_name,
            })
        }
        Err(error) => WorkerEvent::Failed(error.to_string()),
    }
}

/// Derives the short fingerprint that lets race-mode outputs be compared
/// without revealing the seed.
///
/// # Semantics
/// The digest input is the randomizer version followed by each map number in
/// uppercase hex, comma-joined; the result is the first
/// [`FINGERPRINT_LENGTH`] uppercase hex characters of its SHA-256 digest.
/// Stable for a fixed `(version, map_numbers)` pair.
pub fn map_fingerprint(version: &str, map_numbers: &[u16]) -> String {
    let mut digest_input = String::from(version);
    for map_number in map_numbers {
        digest_input.push(',');
        digest_input.push_str(&format!("{map_number:X}"));
    }

    let digest = Sha256::digest(digest_input.as_bytes());
    let mut fingerprint = hex::encode(digest).to_uppercase();
    fingerprint.truncate(FINGERPRINT_LENGTH);
    fingerprint
}

/// Constructs the output filename.
///
/// # Semantics
/// Base name, then the literal race marker or the explicit seed, then the
/// flag string when any non-default option was chosen, then the fingerprint
/// for race seeds, then the fixed extension.
pub fn build_file_name(
    seed: SeedSpec,
    options: &GenerationOptions,
    fingerprint: Option<&str>,
) -> String {
    let mut file_name = String::from(OUTPUT_BASE_NAME);
    match seed {
        SeedSpec::Race => {
            file_name.push('_');
            file_name.push_str(RACE_SEED_MARKER);
        }
        SeedSpec::Explicit(value) => {
            file_name.push('_');
            file_name.push_str(&value.to_string());
        }
    }

    let flags = options.flag_string();
    if !flags.is_empty() {
        file_name.push('_');
        file_name.push_str(&flags);
    }

    if let Some(fingerprint) = fingerprint {
        file_name.push('_');
        file_name.push_str(fingerprint);
    }

    file_name.push_str(OUTPUT_EXTENSION);
    file_name
}

/// Worker channel/runtime error type.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkerError {
    /// Worker thread could not be spawned.
    #[error("failed to spawn generation worker: {0}")]
    Spawn(String),
    /// Worker context is no longer reachable.
    #[error("generation worker channel disconnected")]
    Disconnected,
}
