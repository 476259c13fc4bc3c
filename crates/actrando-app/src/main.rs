#![warn(missing_docs)]
//! # actrando-app binary
//!
//! Headless entry point; prints runtime identity for shells embedding the
//! pipeline.

/// CLI entry point.
fn main() {
    println!("actrando-app {}", actrando_app::app_version());
    println!("suggested seed: {}", actrando_app::suggest_seed());
}
