use std::time::Duration;

use dioxus::document::eval;
use dioxus::prelude::*;
use dioxus_router::Link;
use exam_core::model::{OptionLetter, QuestionId};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ExamStore, ViewState, view_state_from_resource};
use crate::vm::{
    ANSWER_TOGGLE_TOOLTIP, ExamVm, KeyCommand, KeyEffect, NAVIGATION_TOGGLE_TOOLTIP, PrintPlan,
    QuestionVm, SectionVm,
};

#[derive(Clone, Debug, PartialEq)]
struct ExamSnapshot {
    title: String,
    sections: Vec<SectionVm>,
    progress_label: String,
    progress_percent: f64,
    correct: usize,
    incorrect: usize,
    score_label: String,
    previous: Option<String>,
    load_error: Option<String>,
}

impl ExamSnapshot {
    fn capture(vm: &ExamVm) -> Self {
        Self {
            title: vm.title().to_string(),
            sections: vm.sections(),
            progress_label: vm.progress_label(),
            progress_percent: vm.progress_percent(),
            correct: vm.correct_count(),
            incorrect: vm.incorrect_count(),
            score_label: vm.score_label(),
            previous: vm.previous_progress_label(),
            load_error: vm.load_error().map(str::to_string),
        }
    }
}

fn scroll_to_section_script(anchor: &str) -> String {
    format!("document.getElementById({anchor:?})?.scrollIntoView({{ behavior: \"smooth\" }});")
}

#[component]
pub fn ExamView() -> Element {
    let ctx = use_context::<AppContext>();
    let store = use_context::<ExamStore>();
    let exam_loop = ctx.exam_loop();
    let export_dir = ctx.export_dir();
    let state = view_state_from_resource(&store.load);

    let select = {
        let exam_loop = exam_loop.clone();
        use_callback(move |(id, letter): (QuestionId, OptionLetter)| {
            store.select(&exam_loop, id, letter);
        })
    };

    let jump_to_section = use_callback(move |index: usize| {
        let mut view = store.view;
        view.write().current_section = index;
        let anchor = store
            .exam
            .read()
            .as_ref()
            .and_then(|vm| vm.section_anchor(index));
        if let Some(anchor) = anchor {
            let _ = eval(&scroll_to_section_script(&anchor));
        }
    });

    let hover = use_callback(move |question: Option<QuestionId>| {
        let mut view = store.view;
        view.write().hovered_question = question;
    });

    let on_key = move |evt: KeyboardEvent| {
        let Some(command) = KeyCommand::from_key(&evt.data.key(), evt.data.modifiers()) else {
            return;
        };
        let mut view = store.view;
        let effect = {
            let exam = store.exam.read();
            let Some(vm) = exam.as_ref() else {
                return;
            };
            view.write().apply(command, vm)
        };
        match effect {
            Some(KeyEffect::Select(id, letter)) => {
                evt.prevent_default();
                select.call((id, letter));
            }
            Some(KeyEffect::ScrollToSection(index)) => {
                evt.prevent_default();
                jump_to_section.call(index);
            }
            Some(KeyEffect::Redraw) | None => {}
        }
    };

    let on_print = move |_| {
        let mut view = store.view;
        let plan = PrintPlan::begin(&mut view.write());
        spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let _ = eval("window.print();");
            tokio::time::sleep(Duration::from_millis(300)).await;
            plan.finish(&mut view.write());
        });
    };

    let on_export = {
        let exam_loop = exam_loop.clone();
        move |_| store.export(&exam_loop, export_dir.clone())
    };

    let on_reset = move |_| store.reset(&exam_loop);

    let on_retry = move |_| {
        let mut load = store.load;
        load.restart();
    };

    let toggle_answers = move |_| {
        let mut view = store.view;
        view.write().toggle_answers();
    };

    let toggle_navigation = move |_| {
        let mut view = store.view;
        view.write().toggle_navigation();
    };

    let snapshot = store.exam.read().as_ref().map(ExamSnapshot::capture);
    let view_state = *store.view.read();
    let notice = store.notice.read().clone();
    let nav_class = if view_state.navigation_visible {
        "navigation"
    } else {
        "navigation hidden"
    };

    rsx! {
        div { class: "page exam-page", id: "exam-root", tabindex: "0", onkeydown: on_key,
            match (state, snapshot) {
                (ViewState::Error(err), _) => rsx! {
                    div { class: "error",
                        p { "{err.message()}" }
                        button { onclick: on_retry, "Retry" }
                    }
                },
                (_, None) => rsx! {
                    p { class: "loading", "Loading questions..." }
                },
                (_, Some(ExamSnapshot { load_error: Some(message), .. })) => rsx! {
                    div { class: "load-error",
                        h2 { "Couldn't load questions.json." }
                        p { class: "load-error-detail", "{message}" }
                        p { class: "hint",
                            "Make sure the question bank exists at the configured location and is valid JSON."
                        }
                        button { onclick: on_retry, "Retry" }
                    }
                },
                (_, Some(exam)) => rsx! {
                    header { class: "exam-header",
                        h1 { "{exam.title}" }
                        div { class: "progress",
                            span { id: "progress-count", "{exam.progress_label}" }
                            " answered"
                            div { class: "progress-bar",
                                div {
                                    class: "progress-fill",
                                    style: "width: {exam.progress_percent:.1}%",
                                }
                            }
                        }
                        div { class: "score",
                            span { id: "correct-count", "Correct: {exam.correct}" }
                            span { id: "incorrect-count", "Incorrect: {exam.incorrect}" }
                            span { id: "score-percentage", "Score: {exam.score_label}" }
                        }
                        if let Some(previous) = exam.previous.as_ref() {
                            p { class: "previous-progress", "{previous}" }
                        }
                        div { class: "toolbar",
                            button {
                                id: "answer-toggle",
                                title: ANSWER_TOGGLE_TOOLTIP,
                                onclick: toggle_answers,
                                "{view_state.answer_toggle_label()}"
                            }
                            button {
                                class: "nav-toggle",
                                title: NAVIGATION_TOGGLE_TOOLTIP,
                                onclick: toggle_navigation,
                                "☰ Nav"
                            }
                            button { id: "print-button", onclick: on_print, "Print" }
                            button { id: "export-button", onclick: on_export, "Export Results" }
                            button { id: "reset-button", onclick: on_reset, "Reset" }
                            Link { to: Route::Results {}, "Results" }
                        }
                        if let Some(notice) = notice.as_ref() {
                            p { class: "notice", "{notice}" }
                        }
                    }
                    div { class: "exam-layout",
                        div { class: "questions",
                            for sec in exam.sections.iter() {
                                section { key: "{sec.id}", id: "{sec.id}", class: "section section-{sec.css_token}",
                                    h2 { class: "section-heading", "{sec.heading}" }
                                    for question in sec.questions.iter() {
                                        QuestionCard {
                                            key: "{question.id}",
                                            question: question.clone(),
                                            answers_visible: view_state.answers_visible,
                                            on_select: select,
                                            on_hover: hover,
                                        }
                                    }
                                }
                            }
                        }
                        nav { id: "navigation", class: nav_class,
                            h3 { "Sections" }
                            for (index, sec) in exam.sections.iter().enumerate() {
                                NavItem {
                                    key: "{sec.id}",
                                    index,
                                    title: sec.title.clone(),
                                    active: index == view_state.current_section,
                                    on_jump: jump_to_section,
                                }
                            }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn QuestionCard(
    question: QuestionVm,
    answers_visible: bool,
    on_select: EventHandler<(QuestionId, OptionLetter)>,
    on_hover: EventHandler<Option<QuestionId>>,
) -> Element {
    let id = question.id;
    rsx! {
        div {
            class: "question",
            onmouseenter: move |_| on_hover.call(Some(id)),
            onmouseleave: move |_| on_hover.call(None),
            div { class: "question-header",
                span { class: "question-number", "{question.label}" }
                span { class: "{question.status_class}", "{question.status_label()}" }
            }
            p { class: "question-text", "{question.text}" }
            ul { class: "options",
                for option in question.options.iter().cloned() {
                    OptionRow {
                        key: "{option.letter}",
                        question: id,
                        letter: option.letter,
                        text: option.text,
                        class: option.class,
                        on_select,
                    }
                }
            }
            if answers_visible {
                div { class: "answer",
                    strong { "Answer: " }
                    "{question.answer_line}"
                }
            }
        }
    }
}

#[component]
fn OptionRow(
    question: QuestionId,
    letter: OptionLetter,
    text: String,
    class: &'static str,
    on_select: EventHandler<(QuestionId, OptionLetter)>,
) -> Element {
    rsx! {
        li {
            class: "{class}",
            "data-value": "{letter}",
            onclick: move |_| on_select.call((question, letter)),
            strong { "{letter}) " }
            "{text}"
        }
    }
}

#[component]
fn NavItem(index: usize, title: String, active: bool, on_jump: EventHandler<usize>) -> Element {
    let class = if active { "nav-item active" } else { "nav-item" };
    rsx! {
        button { class: "{class}", onclick: move |_| on_jump.call(index), "{title}" }
    }
}
