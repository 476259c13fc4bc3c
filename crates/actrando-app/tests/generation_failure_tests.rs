//! Integration tests for transform-failure recovery.

mod common;

use actrando_app::{AppError, GenerationForm, PipelineController};
use actrando_store::{MemoryStorageBackend, RomStore};
use actrando_ui::{Phase, Severity};
use common::{
    FailingDownloadSink, InlineWorker, StubTransform, controller_with_backend, valid_rom,
};

#[test]
fn generation_failure_tests_return_pipeline_to_idle() {
    let transform = StubTransform {
        fail_with: Some("map table exhausted".to_string()),
        ..StubTransform::default()
    };
    let (mut pipeline, _, saved) =
        controller_with_backend(MemoryStorageBackend::new(), transform)
            .expect("controller should build");

    pipeline
        .on_rom_selected(&valid_rom())
        .expect("staging should succeed");
    pipeline
        .on_generate_requested(&GenerationForm {
            seed_text: "1".to_string(),
            ..GenerationForm::default()
        })
        .expect("generate should dispatch");
    assert_eq!(pipeline.ui().phase(), Phase::Generating);

    pipeline.pump_worker_events().expect("pump should succeed");

    // The failure frees the busy phase instead of leaving the UI stuck.
    assert_eq!(pipeline.ui().phase(), Phase::Idle);
    assert_eq!(pipeline.ui().status().severity, Severity::Error);
    assert_eq!(
        pipeline.ui().status().text,
        "Generation failed: transform failure: map table exhausted"
    );
    assert!(saved.borrow().is_empty());

    // The staged image is untouched; the user can simply retry.
    assert!(pipeline.ui().can_generate());
}

#[test]
fn generation_failure_tests_recover_from_download_failure() {
    let (worker, _) = InlineWorker::new(StubTransform::default());
    let mut pipeline = PipelineController::new(
        RomStore::new(MemoryStorageBackend::new()),
        worker,
        FailingDownloadSink,
    )
    .expect("controller should build");

    pipeline
        .on_rom_selected(&valid_rom())
        .expect("staging should succeed");
    pipeline
        .on_generate_requested(&GenerationForm {
            seed_text: "1".to_string(),
            ..GenerationForm::default()
        })
        .expect("generate should dispatch");
    assert_eq!(pipeline.ui().phase(), Phase::Generating);

    let result = pipeline.pump_worker_events();
    assert!(matches!(result, Err(AppError::Download(_))));

    // The event is gone, so the busy phase must not outlive it.
    assert_eq!(pipeline.ui().phase(), Phase::Idle);
    assert_eq!(pipeline.ui().status().severity, Severity::Error);
    assert_eq!(
        pipeline.ui().status().text,
        "Could not save 'actraiser_1.sfc'"
    );
    assert!(pipeline.ui().can_generate());
}
