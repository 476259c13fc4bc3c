#![warn(missing_docs)]
//! # actrando-app
//!
//! ## Purpose
//! Orchestrates staging, validation, generation dispatch, and result
//! download for the `actrando` pipeline.
//!
//! ## Responsibilities
//! - Drive the [`PipelineController`] state machine from UI events.
//! - Enforce the one-request-in-flight invariant through the phase guard.
//! - Validate every input before any request is dispatched.
//! - Deliver finished images through an injectable [`DownloadSink`].
//! - Expose version display and seed suggestion helpers.
//!
//! ## Data flow
//! File selection -> store (encoded) -> validation gates the generate
//! affordance -> generate request (ROM moves to the worker) -> worker event
//! -> download + status update -> back to idle.
//!
//! ## Ownership and lifetimes
//! The controller owns its store, worker handle, and download sink; the ROM
//! buffer is moved into each request and never read again by the controller.
//!
//! ## Error model
//! User mistakes (no ROM, invalid ROM, bad seed) surface as status-line
//! messages and abort locally without an `Err`. Infrastructure failures
//! (storage IO, broken worker channel, download IO) propagate as
//! [`AppError`].

use std::path::PathBuf;

use actrando_core::{GenerationOptions, GenerationRequest, SeedSpec, parse_seed};
use actrando_rom::is_valid_rom;
use actrando_store::{RomStore, StorageBackend, StoreError};
use actrando_ui::{Phase, RomStatus, Severity, UiState};
use actrando_worker::{WorkerError, WorkerEvent, WorkerHandle};
use rand::{Rng, SeedableRng, rngs::StdRng};
use thiserror::Error;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("ACTRANDO_VERSION");

/// Returns the randomizer version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Suggests a fresh 32-bit seed for the seed input field.
pub fn suggest_seed() -> u32 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let mut rng = StdRng::seed_from_u64(nanos as u64);
    rng.random()
}

/// Raw values of the generation input fields, exactly as the UI surface
/// holds them before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationForm {
    /// Race-mode toggle.
    pub race_seed: bool,
    /// Free-text seed field; ignored when race mode is on.
    pub seed_text: String,
    /// Initial-lives selector value.
    pub initial_lives: String,
    /// Zantetsuken selector value (`"on"` enables it).
    pub zantetsuken: String,
    /// Marahna-path selector value.
    pub marahna_path: String,
    /// Boss-rush selector value.
    pub boss_rush_type: String,
}

/// Surface that presents a finished image to the user as a download.
pub trait DownloadSink {
    /// Saves `bytes` under `file_name`.
    ///
    /// # Errors
    /// Returns [`DownloadError`] when the surface cannot deliver the file.
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), DownloadError>;
}

/// Download sink writing finished images into a directory.
#[derive(Debug)]
pub struct DirectoryDownloadSink {
    directory: PathBuf,
}

impl DirectoryDownloadSink {
    /// Creates a sink targeting `directory`; the directory is created on
    /// first save.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl DownloadSink for DirectoryDownloadSink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), DownloadError> {
        std::fs::create_dir_all(&self.directory)
            .map_err(|error| DownloadError::Io(error.to_string()))?;
        let path = self.directory.join(file_name);
        std::fs::write(&path, bytes).map_err(|error| DownloadError::Io(error.to_string()))
    }
}

/// Controller-context state machine coordinating store, validator, worker,
/// and UI state.
pub struct PipelineController<B, W, D>
where
    B: StorageBackend,
    W: WorkerHandle,
    D: DownloadSink,
{
    store: RomStore<B>,
    worker: W,
    downloads: D,
    ui: UiState,
}

impl<B, W, D> PipelineController<B, W, D>
where
    B: StorageBackend,
    W: WorkerHandle,
    D: DownloadSink,
{
    /// Creates a controller and derives the initial staged-ROM status from
    /// whatever the store already holds.
    ///
    /// # Errors
    /// Returns [`AppError::Store`] when the persisted entry cannot be read.
    pub fn new(store: RomStore<B>, worker: W, downloads: D) -> Result<Self, AppError> {
        let mut controller = Self {
            store,
            worker,
            downloads,
            ui: UiState::new(),
        };
        controller.refresh_rom_status()?;
        Ok(controller)
    }

    /// Returns the current UI state snapshot.
    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Handles file selection: stages the bytes and recomputes the
    /// staged-ROM status.
    ///
    /// Quota exhaustion is not fatal: the store ends with no entry, the user
    /// is informed, and the status indicator shows "none".
    ///
    /// # Errors
    /// Returns [`AppError::Store`] for backend failures other than quota.
    pub fn on_rom_selected(&mut self, bytes: &[u8]) -> Result<(), AppError> {
        self.ui.clear_status();
        match self.store.put(bytes) {
            Ok(()) => {}
            Err(StoreError::QuotaExceeded) => {
                self.ui.set_status(
                    "Could not store ROM: storage quota exceeded",
                    Severity::Error,
                );
            }
            Err(error) => return Err(error.into()),
        }
        self.refresh_rom_status()
    }

    /// Handles the clear-file action.
    ///
    /// # Errors
    /// Returns [`AppError::Store`] when the entry cannot be removed.
    pub fn on_rom_cleared(&mut self) -> Result<(), AppError> {
        self.ui.clear_status();
        self.store.clear()?;
        self.refresh_rom_status()
    }

    /// Handles the generate action.
    ///
    /// A call while a generation is already in flight is a no-op: the
    /// affordance is disabled for the whole `Generating` phase and there is
    /// no queuing. All inputs are re-validated here; nothing is dispatched
    /// unless every check passes.
    ///
    /// # Errors
    /// Returns [`AppError::Store`] when the staged entry cannot be read and
    /// [`AppError::Worker`] when the worker context is gone.
    pub fn on_generate_requested(&mut self, form: &GenerationForm) -> Result<(), AppError> {
        if self.ui.phase() == Phase::Generating {
            return Ok(());
        }

        self.ui.clear_status();

        let rom = match self.store.get()? {
            Some(rom) => rom,
            None => {
                self.ui
                    .set_status(RomStatus::NoRom.label(), Severity::Error);
                return Ok(());
            }
        };
        if !is_valid_rom(&rom) {
            self.ui
                .set_status(RomStatus::Invalid.label(), Severity::Error);
            return Ok(());
        }

        let seed = if form.race_seed {
            SeedSpec::Race
        } else {
            match parse_seed(&form.seed_text) {
                Ok(value) => SeedSpec::Explicit(value),
                Err(_) => {
                    self.ui.set_status("Seed must be a number", Severity::Error);
                    return Ok(());
                }
            }
        };

        let options = GenerationOptions::from_selector_values(
            &form.initial_lives,
            &form.zantetsuken,
            &form.marahna_path,
            &form.boss_rush_type,
        );

        self.ui.begin_generation();
        self.ui.set_status(
            "Generation in progress, this may take some time...",
            Severity::Neutral,
        );

        // The ROM buffer moves with the request; it is not read again here.
        let request = GenerationRequest { rom, seed, options };
        if let Err(error) = self.worker.send(request) {
            self.ui.finish_generation();
            self.ui
                .set_status("Generation failed: worker unavailable", Severity::Error);
            return Err(error.into());
        }

        Ok(())
    }

    /// Drains pending worker events and applies them.
    ///
    /// A `Generated` event triggers the download and returns the pipeline to
    /// idle with a success message; a `Failed` event returns to idle with an
    /// error message instead of leaving the UI busy forever.
    ///
    /// # Errors
    /// Returns [`AppError::Worker`] when the worker channel is gone and
    /// [`AppError::Download`] when the finished image cannot be delivered.
    pub fn pump_worker_events(&mut self) -> Result<(), AppError> {
        while let Some(event) = self.worker.try_recv()? {
            match event {
                WorkerEvent::Generated(result) => {
                    // The event is consumed either way; leave the busy phase
                    // before propagating so the pipeline stays retryable.
                    if let Err(error) = self.downloads.save(&result.file_name, &result.rom) {
                        self.ui.finish_generation();
                        self.ui.set_status(
                            format!("Could not save '{}'", result.file_name),
                            Severity::Error,
                        );
                        return Err(error.into());
                    }
                    self.ui.set_status(
                        format!("Generated '{}'", result.file_name),
                        Severity::Success,
                    );
                    self.ui.finish_generation();
                }
                WorkerEvent::Failed(message) => {
                    self.ui
                        .set_status(format!("Generation failed: {message}"), Severity::Error);
                    self.ui.finish_generation();
                }
            }
        }
        Ok(())
    }

    fn refresh_rom_status(&mut self) -> Result<(), AppError> {
        let rom_status = match self.store.get()? {
            None => RomStatus::NoRom,
            Some(rom) if is_valid_rom(&rom) => RomStatus::Valid,
            Some(_) => RomStatus::Invalid,
        };
        self.ui.set_rom_status(rom_status);
        Ok(())
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Persistent store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    /// Worker channel failure.
    #[error("worker error: {0}")]
    Worker(#[from] WorkerError),
    /// Download surface failure.
    #[error("download error: {0}")]
    Download(#[from] DownloadError),
}

/// Error surfaced by download sinks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DownloadError {
    /// Download target could not be written.
    #[error("download io failure: {0}")]
    Io(String),
}
