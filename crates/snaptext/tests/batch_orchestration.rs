//! Batch orchestration tests.
//!
//! Covers the abort/skip policies, per-file failure isolation and what gets persisted
//! into the session store.

use std::sync::Arc;

use snaptext::batch::{NO_FILES_MESSAGE, NO_TEXT_MESSAGE};
use snaptext::{
    BatchOrchestrator, ExtractionStatus, MemorySessionStore, Recognizer, SessionId, SessionStore, UploadItem,
    ValidationLimits, ValidationPolicy,
};

mod helpers;

use helpers::{ScriptedEngine, png_bytes};

fn orchestrator(engine: Arc<ScriptedEngine>, store: Arc<MemorySessionStore>) -> BatchOrchestrator {
    BatchOrchestrator::new(
        Recognizer::with_default_settings(engine),
        store,
        ValidationLimits::default(),
    )
}

fn pngs(count: usize) -> Vec<UploadItem> {
    (0..count)
        .map(|i| UploadItem::new(format!("page{i}.png"), png_bytes()))
        .collect()
}

#[tokio::test]
async fn test_eleven_files_rejected_before_processing() {
    let engine = Arc::new(ScriptedEngine::new("text"));
    let store = Arc::new(MemorySessionStore::new());
    let session = SessionId::generate();

    let outcome = orchestrator(engine.clone(), store.clone()).process(&session, pngs(11)).await;

    assert!(outcome.results.is_empty());
    assert_eq!(
        outcome.error.as_deref(),
        Some("Too many files. Please upload at most 10 images at a time.")
    );
    assert_eq!(engine.calls(), 0);
    assert!(store.get(&session).is_none());
}

#[tokio::test]
async fn test_ten_files_all_attempted() {
    let engine = Arc::new(ScriptedEngine::new("text"));
    let store = Arc::new(MemorySessionStore::new());
    let session = SessionId::generate();

    let outcome = orchestrator(engine.clone(), store.clone()).process(&session, pngs(10)).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.results.len(), 10);
    assert_eq!(engine.calls(), 10);
    assert_eq!(store.get(&session).unwrap().len(), 10);
}

#[tokio::test]
async fn test_invalid_second_file_aborts_batch() {
    let engine = Arc::new(ScriptedEngine::new("text"));
    let store = Arc::new(MemorySessionStore::new());
    let session = SessionId::generate();

    let items = vec![
        UploadItem::new("first.png", png_bytes()),
        UploadItem::new("second.pdf", png_bytes()),
        UploadItem::new("third.png", png_bytes()),
    ];
    let outcome = orchestrator(engine.clone(), store.clone()).process(&session, items).await;

    assert!(outcome.results.is_empty());
    let error = outcome.error.unwrap();
    assert!(error.contains("second.pdf"), "error should name the file: {error}");
    assert!(error.starts_with("Invalid file type"));
    assert_eq!(engine.calls(), 1, "only the first file is recognized");
    assert!(store.get(&session).is_none());
}

#[tokio::test]
async fn test_oversized_file_aborts_batch() {
    let engine = Arc::new(ScriptedEngine::new("text"));
    let store = Arc::new(MemorySessionStore::new());
    let limits = ValidationLimits {
        max_file_size_bytes: 64,
        ..Default::default()
    };
    let orchestrator = BatchOrchestrator::new(Recognizer::with_default_settings(engine.clone()), store, limits);

    let outcome = orchestrator
        .run(vec![UploadItem::new("big.png", vec![0u8; 65])])
        .await;

    assert_eq!(outcome.error.as_deref(), Some("File 'big.png' exceeds the 64 bytes size limit."));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_skip_invalid_policy_keeps_going() {
    let engine = Arc::new(ScriptedEngine::new("text"));
    let store = Arc::new(MemorySessionStore::new());
    let session = SessionId::generate();

    let items = vec![
        UploadItem::new("first.png", png_bytes()),
        UploadItem::new("second.pdf", png_bytes()),
        UploadItem::new("third.png", png_bytes()),
    ];
    let outcome = orchestrator(engine.clone(), store.clone())
        .with_policy(ValidationPolicy::SkipInvalid)
        .process(&session, items)
        .await;

    assert!(outcome.is_success());
    assert_eq!(outcome.results.len(), 3);
    assert!(matches!(outcome.results[1].status, ExtractionStatus::Error { .. }));
    assert_eq!(engine.calls(), 2);
    assert_eq!(store.get(&session).unwrap().len(), 3);
}

#[tokio::test]
async fn test_recognition_failure_is_isolated() {
    let engine = Arc::new(
        ScriptedEngine::new("unused")
            .then_text("first text")
            .then_failure("tesseract crashed")
            .then_text("third text"),
    );
    let store = Arc::new(MemorySessionStore::new());
    let session = SessionId::generate();

    let outcome = orchestrator(engine.clone(), store.clone()).process(&session, pngs(3)).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.results.len(), 3);
    assert_eq!(outcome.results[0].text, "first text");
    assert_eq!(outcome.results[1].text, "Error processing image: tesseract crashed");
    assert_eq!(
        outcome.results[1].status,
        ExtractionStatus::Error {
            message: "tesseract crashed".to_string()
        }
    );
    assert_eq!(outcome.results[2].text, "third text");
    assert_eq!(engine.calls(), 3);

    let names: Vec<_> = outcome.results.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, ["page0.png", "page1.png", "page2.png"]);
}

#[tokio::test]
async fn test_output_is_trimmed_and_empty_becomes_placeholder() {
    let engine = Arc::new(ScriptedEngine::new("unused").then_text("  hello\n\n").then_text(" \n\t"));
    let store = Arc::new(MemorySessionStore::new());

    let outcome = orchestrator(engine, store).run(pngs(2)).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.results[0].text, "hello");
    assert_eq!(outcome.results[1].status, ExtractionStatus::Empty);
    assert_eq!(outcome.results[1].text, "No text could be extracted from this image.");
}

#[tokio::test]
async fn test_all_blank_batch_stores_nothing() {
    let engine = Arc::new(ScriptedEngine::new("   "));
    let store = Arc::new(MemorySessionStore::new());
    let session = SessionId::generate();

    let outcome = orchestrator(engine, store.clone()).process(&session, pngs(2)).await;

    assert_eq!(outcome.error.as_deref(), Some(NO_TEXT_MESSAGE));
    assert_eq!(outcome.results.len(), 2, "entries are still returned for display");
    assert!(store.get(&session).is_none());
}

#[tokio::test]
async fn test_empty_submission() {
    let engine = Arc::new(ScriptedEngine::new("text"));
    let store = Arc::new(MemorySessionStore::new());

    let outcome = orchestrator(engine.clone(), store).run(Vec::new()).await;

    assert_eq!(outcome.error.as_deref(), Some(NO_FILES_MESSAGE));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn test_new_batch_replaces_previous() {
    let engine = Arc::new(ScriptedEngine::new("text"));
    let store = Arc::new(MemorySessionStore::new());
    let session = SessionId::generate();
    let orchestrator = orchestrator(engine, store.clone());

    orchestrator.process(&session, pngs(3)).await;
    orchestrator
        .process(&session, vec![UploadItem::new("only.jpg", png_bytes())])
        .await;

    let stored = store.get(&session).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].filename, "only.jpg");
}

#[tokio::test]
async fn test_failed_batch_keeps_previous_results() {
    let engine = Arc::new(ScriptedEngine::new("text"));
    let store = Arc::new(MemorySessionStore::new());
    let session = SessionId::generate();
    let orchestrator = orchestrator(engine, store.clone());

    orchestrator.process(&session, pngs(2)).await;
    let outcome = orchestrator
        .process(&session, vec![UploadItem::new("notes.txt", b"hi".to_vec())])
        .await;

    assert!(!outcome.is_success());
    assert_eq!(store.get(&session).unwrap().len(), 2);
}
