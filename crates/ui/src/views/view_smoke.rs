use std::sync::Arc;

use exam_core::model::{OptionLetter, QuestionId};
use exam_core::time::fixed_now;
use services::CatalogSource;
use storage::repository::{PROGRESS_KEY, ProgressRecord, ProgressRepository, Storage};

use super::store::SAVE_FAILED;
use super::test_harness::{
    ViewKind, setup_view_harness, setup_view_harness_with_source, setup_view_harness_with_storage,
};

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_renders_sections_and_questions() {
    let mut harness = setup_view_harness(ViewKind::Exam);
    let html = harness.settle().await;

    assert!(html.contains("Harness Exam"), "missing title in {html}");
    assert!(html.contains("Basics (Questions 1-2)"), "missing heading in {html}");
    assert!(html.contains("Advanced (Questions 3)"), "missing heading in {html}");
    assert!(html.contains("Q1"), "missing question label in {html}");
    assert!(html.contains("Pick the second"), "missing question text in {html}");
    assert!(html.contains("Unanswered"), "missing status in {html}");
    assert!(html.contains("0/3"), "missing progress in {html}");
    assert!(html.contains("Show Answers"), "missing toggle in {html}");
    assert!(
        html.contains("Show/hide navigation sidebar (Shortcut: N)"),
        "missing tooltip in {html}"
    );
    assert!(!html.contains("First is first."), "answers should start hidden: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_reflects_selection() {
    let mut harness = setup_view_harness(ViewKind::Exam);
    harness.settle().await;

    let exam_loop = Arc::clone(&harness.exam_loop);
    harness.with_store(|store| {
        store.select(&exam_loop, QuestionId::new(2), OptionLetter::B);
        store.select(&exam_loop, QuestionId::new(3), OptionLetter::A);
    });
    let html = harness.render();

    assert!(html.contains("2/3"), "missing progress in {html}");
    assert!(html.contains("Correct: 1"), "missing correct count in {html}");
    assert!(html.contains("Incorrect: 1"), "missing incorrect count in {html}");
    assert!(html.contains("Score: 50%"), "missing score in {html}");
    assert!(html.contains("option selected correct"), "missing option class in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_saves_progress_after_clicks() {
    let mut harness = setup_view_harness(ViewKind::Exam);
    harness.settle().await;

    let exam_loop = Arc::clone(&harness.exam_loop);
    harness.with_store(|store| {
        store.select(&exam_loop, QuestionId::new(1), OptionLetter::A);
        store.select(&exam_loop, QuestionId::new(2), OptionLetter::C);
        store.select(&exam_loop, QuestionId::new(2), OptionLetter::B);
    });

    let mut saved = None;
    for _ in 0..20 {
        harness.drive_async().await;
        saved = harness
            .storage
            .progress
            .load_progress(PROGRESS_KEY)
            .await
            .expect("read progress");
        if saved.as_ref().is_some_and(|rec| rec.correct_answers == 2) {
            break;
        }
    }
    let saved = saved.expect("progress saved");
    assert_eq!(saved.answered_questions, 2);
    assert_eq!(saved.correct_answers, 2);
    assert_eq!(saved.incorrect_answers, 0);
    assert!(!harness.render().contains(SAVE_FAILED));
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_reset_clears_progress() {
    let mut harness = setup_view_harness(ViewKind::Exam);
    harness.settle().await;

    let exam_loop = Arc::clone(&harness.exam_loop);
    harness.with_store(|store| {
        store.select(&exam_loop, QuestionId::new(3), OptionLetter::D);
        store.reset(&exam_loop);
    });
    for _ in 0..5 {
        harness.drive_async().await;
    }

    let html = harness.render();
    assert!(html.contains("0/3"), "missing reset progress in {html}");
    assert!(html.contains("status-unanswered"), "missing unanswered class in {html}");
    let saved = harness
        .storage
        .progress
        .load_progress(PROGRESS_KEY)
        .await
        .expect("read progress")
        .expect("progress saved");
    assert_eq!(saved.answered_questions, 0);
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_shows_answers_when_toggled() {
    let mut harness = setup_view_harness(ViewKind::Exam);
    harness.settle().await;

    harness.with_store(|store| {
        let mut view = store.view;
        view.write().toggle_answers();
    });
    let html = harness.render();

    assert!(html.contains("A) First is first."), "missing answer line in {html}");
    assert!(html.contains("Hide Answers"), "missing toggle label in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_renders_load_failure() {
    let source = CatalogSource::File("/missing/exam/questions.json".into());
    let mut harness = setup_view_harness_with_source(ViewKind::Exam, source);
    let html = harness.settle().await;

    assert!(
        html.contains("load questions.json"),
        "missing failure title in {html}"
    );
    assert!(html.contains("Retry"), "missing retry in {html}");
    assert!(!html.contains("Q1"), "no questions expected in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_shows_previous_progress() {
    let storage = Storage::in_memory();
    let earlier = ProgressRecord {
        answered_questions: 2,
        correct_answers: 1,
        incorrect_answers: 1,
        timestamp: fixed_now(),
    };
    storage
        .progress
        .save_progress(PROGRESS_KEY, &earlier)
        .await
        .expect("save progress");

    let mut harness = setup_view_harness_with_storage(ViewKind::Exam, storage);
    let html = harness.settle().await;

    assert!(
        html.contains("Last saved 2023-11-14 22:13 UTC: 2 answered, 1 correct, 1 incorrect"),
        "missing previous progress in {html}"
    );
    assert!(html.contains("0/3"), "previous progress must not be replayed: {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_smoke_renders_export_preview() {
    let mut harness = setup_view_harness(ViewKind::Results);
    harness.rebuild();
    for _ in 0..40 {
        if harness.render().contains("Harness Exam") {
            break;
        }
        harness.drive_async().await;
    }

    let exam_loop = Arc::clone(&harness.exam_loop);
    harness.with_store(|store| store.select(&exam_loop, QuestionId::new(1), OptionLetter::A));
    let html = harness.render();

    assert!(html.contains("Results"), "missing heading in {html}");
    assert!(html.contains("Answered: 1"), "missing answered in {html}");
    assert!(html.contains("Score: 100%"), "missing score in {html}");
    assert!(html.contains("Not answered"), "missing unanswered row in {html}");
    assert!(html.contains("B) Second is second."), "missing answer text in {html}");
}
