#![warn(missing_docs)]
//! # actrando-ui
//!
//! ## Purpose
//! Defines the UI-facing runtime state model for the staging-and-generation
//! pipeline.
//!
//! ## Responsibilities
//! - Represent the pipeline phase and the staged-ROM status indicator.
//! - Carry the status line text with its severity.
//! - Expose the guard deciding whether the generate affordance is enabled.
//!
//! ## Data flow
//! Controller event handlers mutate [`UiState`], which drives whatever shell
//! renders the pipeline (status indicator, message line, busy affordance).
//!
//! ## Ownership and lifetimes
//! `UiState` owns all its strings to keep event handlers free of borrowing
//! coupling.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. Illegal phase
//! changes are prevented by the transition methods.

/// Pipeline phase.
///
/// `Generating` disables the generate affordance for its entire duration;
/// that guard is the sole serialization mechanism keeping at most one
/// request in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No generation in progress.
    Idle,
    /// A generation request has been dispatched and not yet answered.
    Generating,
}

/// Staged-ROM status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomStatus {
    /// No ROM is currently staged.
    NoRom,
    /// The staged ROM passed validation.
    Valid,
    /// The staged ROM failed validation.
    Invalid,
}

impl RomStatus {
    /// Returns the staged-ROM indicator label shown on the file control.
    pub fn label(self) -> &'static str {
        match self {
            Self::NoRom => "No ROM selected",
            Self::Valid => "Valid ROM selected",
            Self::Invalid => "Invalid ROM selected",
        }
    }
}

/// Severity of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Informational text without an icon.
    Neutral,
    /// Successful completion.
    Success,
    /// User-visible error.
    Error,
}

/// Free-text status line with severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// Message text; empty when nothing is reported.
    pub text: String,
    /// Severity controlling the rendered icon.
    pub severity: Severity,
}

impl StatusLine {
    fn empty() -> Self {
        Self {
            text: String::new(),
            severity: Severity::Neutral,
        }
    }
}

/// Aggregate UI runtime state.
///
/// All derived fields are pure functions of the staged data and the phase;
/// nothing here touches storage or the worker directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    phase: Phase,
    rom_status: RomStatus,
    status: StatusLine,
}

impl UiState {
    /// Creates the initial idle state with nothing staged.
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            rom_status: RomStatus::NoRom,
            status: StatusLine::empty(),
        }
    }

    /// Returns the current pipeline phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the staged-ROM status indicator.
    pub fn rom_status(&self) -> RomStatus {
        self.rom_status
    }

    /// Returns the current status line.
    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    /// Returns `true` when the generate affordance is enabled.
    pub fn can_generate(&self) -> bool {
        self.phase == Phase::Idle && self.rom_status == RomStatus::Valid
    }

    /// Updates the staged-ROM indicator.
    pub fn set_rom_status(&mut self, rom_status: RomStatus) {
        self.rom_status = rom_status;
    }

    /// Sets the status line.
    pub fn set_status(&mut self, text: impl Into<String>, severity: Severity) {
        self.status = StatusLine {
            text: text.into(),
            severity,
        };
    }

    /// Clears the status line back to empty neutral text.
    pub fn clear_status(&mut self) {
        self.status = StatusLine::empty();
    }

    /// Enters the `Generating` phase.
    pub fn begin_generation(&mut self) {
        self.phase = Phase::Generating;
    }

    /// Returns to `Idle` once a worker response has been handled.
    pub fn finish_generation(&mut self) {
        self.phase = Phase::Idle;
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}
