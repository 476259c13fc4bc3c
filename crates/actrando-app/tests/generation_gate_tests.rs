//! Integration tests for the one-request-in-flight state machine.

mod common;

use actrando_app::GenerationForm;
use actrando_ui::{Phase, Severity};
use common::{controller, valid_rom};

fn explicit_seed_form(seed_text: &str) -> GenerationForm {
    GenerationForm {
        seed_text: seed_text.to_string(),
        ..GenerationForm::default()
    }
}

#[test]
fn generation_gate_tests_allow_only_one_request_in_flight() {
    let (mut pipeline, sent, _) = controller().expect("controller should build");
    pipeline
        .on_rom_selected(&valid_rom())
        .expect("staging should succeed");

    pipeline
        .on_generate_requested(&explicit_seed_form("42"))
        .expect("generate should dispatch");
    assert_eq!(pipeline.ui().phase(), Phase::Generating);
    assert!(!pipeline.ui().can_generate());
    assert_eq!(sent.get(), 1);

    // A second request while busy is a no-op, not a queue entry.
    pipeline
        .on_generate_requested(&explicit_seed_form("43"))
        .expect("call should be a no-op");
    assert_eq!(sent.get(), 1);
    assert_eq!(pipeline.ui().phase(), Phase::Generating);

    pipeline
        .pump_worker_events()
        .expect("pump should succeed");
    assert_eq!(pipeline.ui().phase(), Phase::Idle);
    assert_eq!(pipeline.ui().status().severity, Severity::Success);

    // Back to idle, a new request goes through.
    pipeline
        .on_generate_requested(&explicit_seed_form("43"))
        .expect("generate should dispatch");
    assert_eq!(sent.get(), 2);
}

#[test]
fn generation_gate_tests_abort_without_staged_rom() {
    let (mut pipeline, sent, _) = controller().expect("controller should build");

    pipeline
        .on_generate_requested(&explicit_seed_form("42"))
        .expect("call should abort locally");
    assert_eq!(sent.get(), 0);
    assert_eq!(pipeline.ui().phase(), Phase::Idle);
    assert_eq!(pipeline.ui().status().text, "No ROM selected");
    assert_eq!(pipeline.ui().status().severity, Severity::Error);
}

#[test]
fn generation_gate_tests_abort_on_invalid_rom() {
    let (mut pipeline, sent, _) = controller().expect("controller should build");
    pipeline
        .on_rom_selected(&[0_u8; 1024])
        .expect("staging should succeed");

    pipeline
        .on_generate_requested(&explicit_seed_form("42"))
        .expect("call should abort locally");
    assert_eq!(sent.get(), 0);
    assert_eq!(pipeline.ui().status().text, "Invalid ROM selected");
}

#[test]
fn generation_gate_tests_reject_malformed_seed_unless_racing() {
    let (mut pipeline, sent, _) = controller().expect("controller should build");
    pipeline
        .on_rom_selected(&valid_rom())
        .expect("staging should succeed");

    pipeline
        .on_generate_requested(&explicit_seed_form("not-a-seed"))
        .expect("call should abort locally");
    assert_eq!(sent.get(), 0);
    assert_eq!(pipeline.ui().status().text, "Seed must be a number");
    assert_eq!(pipeline.ui().phase(), Phase::Idle);

    // Race mode skips seed parsing entirely.
    let race_form = GenerationForm {
        race_seed: true,
        seed_text: "not-a-seed".to_string(),
        ..GenerationForm::default()
    };
    pipeline
        .on_generate_requested(&race_form)
        .expect("generate should dispatch");
    assert_eq!(sent.get(), 1);
    assert_eq!(pipeline.ui().phase(), Phase::Generating);
}
