#![warn(missing_docs)]
//! # actrando-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `actrando` workspace.
//!
//! ## Responsibilities
//! - Represent the enumerated generation options and their fixed string tags.
//! - Normalize free-form selector values (unknown tags become unset).
//! - Parse and normalize user-supplied seed text.
//! - Derive the stable flag string used in output filenames.
//! - Carry the one-shot generation request/result payloads.
//!
//! ## Data flow
//! The controller normalizes raw UI field values into [`GenerationOptions`]
//! and a [`SeedSpec`], packages them with the ROM bytes into a
//! [`GenerationRequest`], and hands the request to the worker, which answers
//! with a [`GenerationResult`].
//!
//! ## Ownership and lifetimes
//! Requests own their ROM buffer (`Vec<u8>`) so the large image moves across
//! the controller/worker boundary instead of being copied.
//!
//! ## Error model
//! Seed text validation failures return [`SeedError`] variants with
//! user-presentable categorization.
//!
//! ## Example
//! ```rust
//! use actrando_core::{parse_seed, GenerationOptions};
//!
//! assert_eq!(parse_seed("007").unwrap(), 7);
//! assert_eq!(GenerationOptions::default().flag_string(), "");
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Initial-lives mode choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialLives {
    /// Start with 10 lives instead of 5.
    Extra,
    /// Play with unlimited lives.
    Unlimited,
    /// Show death count instead of lives remaining.
    DeathCount,
}

impl InitialLives {
    /// Parses a selector tag; unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "extra" => Some(Self::Extra),
            "unlimited" => Some(Self::Unlimited),
            "deathcount" => Some(Self::DeathCount),
            _ => None,
        }
    }

    fn flag(self) -> char {
        match self {
            Self::Extra => 'E',
            Self::Unlimited => 'U',
            Self::DeathCount => 'D',
        }
    }
}

/// Marahna act III path choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarahnaPath {
    /// Take the left path.
    Left,
    /// Take the right path.
    Right,
}

impl MarahnaPath {
    /// Parses a selector tag; unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    fn flag(self) -> char {
        match self {
            Self::Left => 'L',
            Self::Right => 'R',
        }
    }
}

/// Boss-rush placement choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BossRushType {
    /// All boss rooms appear as one consecutive block.
    Consecutive,
    /// Boss rooms are scattered through the map order.
    Scattered,
}

impl BossRushType {
    /// Parses a selector tag; unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "consecutive" => Some(Self::Consecutive),
            "scattered" => Some(Self::Scattered),
            _ => None,
        }
    }

    fn flag(self) -> char {
        match self {
            Self::Consecutive => 'C',
            Self::Scattered => 'S',
        }
    }
}

/// Independent, optional generation choices.
///
/// Unset fields mean "default/random" and are resolved by the transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Initial-lives mode, or `None` for the stock behavior.
    pub initial_lives: Option<InitialLives>,
    /// Permanent sword upgrade toggle.
    pub zantetsuken: bool,
    /// Marahna path override, or `None` to let the transform flip a coin.
    pub marahna_path: Option<MarahnaPath>,
    /// Boss-rush placement override, or `None` for a random choice.
    pub boss_rush_type: Option<BossRushType>,
}

impl GenerationOptions {
    /// Builds options from raw selector values, normalizing anything outside
    /// each field's allowed tag set to unset.
    ///
    /// The zantetsuken selector follows the original two-state control: the
    /// literal value `"on"` enables it and every other value disables it.
    pub fn from_selector_values(
        initial_lives: &str,
        zantetsuken: &str,
        marahna_path: &str,
        boss_rush_type: &str,
    ) -> Self {
        Self {
            initial_lives: InitialLives::from_tag(initial_lives),
            zantetsuken: zantetsuken == "on",
            marahna_path: MarahnaPath::from_tag(marahna_path),
            boss_rush_type: BossRushType::from_tag(boss_rush_type),
        }
    }

    /// Derives the short stable flag string used in filenames and titles.
    ///
    /// # Semantics
    /// Flags appear in fixed order (initial lives, zantetsuken, Marahna path,
    /// boss-rush type); the string is empty when every option is default.
    pub fn flag_string(&self) -> String {
        let mut flags = String::new();
        if let Some(initial_lives) = self.initial_lives {
            flags.push(initial_lives.flag());
        }
        if self.zantetsuken {
            flags.push('Z');
        }
        if let Some(marahna_path) = self.marahna_path {
            flags.push(marahna_path.flag());
        }
        if let Some(boss_rush_type) = self.boss_rush_type {
            flags.push(boss_rush_type.flag());
        }
        flags
    }
}

/// Seed selection for one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedSpec {
    /// Seed is chosen by the transform and hidden until result metadata
    /// comes back.
    Race,
    /// Explicit user-supplied seed.
    Explicit(u32),
}

/// Parses user seed text into a normalized 32-bit seed.
///
/// # Semantics
/// Input is trimmed and must be a non-empty run of ASCII digits. Values of
/// any length are accepted and reduced modulo 2^32 by folding digits, so
/// `"4294967296"` normalizes to `0` and `"007"` to `7`.
///
/// # Errors
/// Returns [`SeedError::NotANumber`] for empty or non-digit input.
pub fn parse_seed(text: &str) -> Result<u32, SeedError> {
    let digits = text.trim();
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(SeedError::NotANumber);
    }

    let seed = digits.bytes().fold(0_u64, |accumulator, byte| {
        (accumulator * 10 + u64::from(byte - b'0')) % (1 << 32)
    });

    Ok(seed as u32)
}

/// One-shot request dispatched to the generation worker.
///
/// Constructed once per generate action and consumed exactly once; the ROM
/// buffer moves with the request and must not be read again by the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Raw ROM image, owned by the request.
    pub rom: Vec<u8>,
    /// Seed selection.
    pub seed: SeedSpec,
    /// Normalized generation options.
    pub options: GenerationOptions,
}

/// One-shot result posted back by the generation worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Modified ROM image ready for download.
    pub rom: Vec<u8>,
    /// Derived output filename, extension included.
    pub file_name: String,
}

/// Error type for seed text validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeedError {
    /// Seed text is empty or contains non-digit characters.
    #[error("seed must be a number")]
    NotANumber,
}
