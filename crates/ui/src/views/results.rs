use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::ExamStore;

fn result_label(is_correct: Option<bool>) -> &'static str {
    match is_correct {
        Some(true) => "Correct",
        Some(false) => "Incorrect",
        None => "Unanswered",
    }
}

#[component]
pub fn ResultsView() -> Element {
    let ctx = use_context::<AppContext>();
    let store = use_context::<ExamStore>();
    let exam_loop = ctx.exam_loop();

    let doc = store
        .exam
        .read()
        .as_ref()
        .filter(|vm| vm.load_error().is_none())
        .map(|vm| vm.export_preview(&exam_loop));

    rsx! {
        div { class: "page results-page",
            h2 { "Results" }
            match doc {
                None => rsx! {
                    p { "No results yet." }
                    Link { to: Route::Exam {}, "Back to exam" }
                },
                Some(doc) => rsx! {
                    h3 { "{doc.exam_title}" }
                    ul { class: "results-summary",
                        li { "Total: {doc.total_questions}" }
                        li { "Answered: {doc.answered_questions}" }
                        li { "Correct: {doc.correct_answers}" }
                        li { "Incorrect: {doc.incorrect_answers}" }
                        li { "Score: {doc.score_percentage}%" }
                    }
                    table { class: "results-table",
                        thead {
                            tr {
                                th { "#" }
                                th { "Question" }
                                th { "Your answer" }
                                th { "Correct" }
                                th { "Result" }
                            }
                        }
                        tbody {
                            for row in doc.questions.iter() {
                                tr { key: "{row.question_number}",
                                    td { "{row.question_number}" }
                                    td { "{row.question}" }
                                    td { "{row.selected_answer}" }
                                    td { "{row.correct_answer_text}" }
                                    td { {result_label(row.is_correct)} }
                                }
                            }
                        }
                    }
                    Link { to: Route::Exam {}, "Back to exam" }
                },
            }
        }
    }
}
