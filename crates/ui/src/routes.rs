use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{ExamView, ResultsView, use_exam_store_provider};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", ExamView)] Exam {},
        #[route("/results", ResultsView)] Results {},
}

#[component]
fn Layout() -> Element {
    use_exam_store_provider();
    rsx! {
        div { class: "app",
            nav { class: "top-bar",
                Link { to: Route::Exam {}, "Exam" }
                Link { to: Route::Results {}, "Results" }
            }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}
