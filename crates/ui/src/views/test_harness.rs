use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use exam_core::time::fixed_now;
use services::{CatalogSource, Clock, ExamLoopService};
use storage::repository::Storage;

use crate::context::{UiApp, build_app_context};
use crate::views::{ExamStore, ExamView, ResultsView, use_exam_store_provider};

pub const SAMPLE_BANK: &str = r#"{
    "metadata": { "title": "Harness Exam" },
    "sections": [
        { "id": "basics", "title": "Basics", "questionRange": "1-2", "questions": [
            { "id": 1, "text": "Pick the first", "options": ["First", "Second"], "correct": "A", "explanation": "First is first." },
            { "id": 2, "text": "Pick the second", "options": ["First", "Second", "Third"], "correct": "B", "explanation": "Second is second." }
        ] },
        { "id": "advanced", "title": "Advanced", "questionRange": "3", "questions": [
            { "id": 3, "text": "Pick the last", "options": ["x", "y", "z", "w"], "correct": "D", "explanation": "w it is." }
        ] }
    ]
}"#;

#[derive(Clone)]
struct TestApp {
    exam_loop: Arc<ExamLoopService>,
    source: CatalogSource,
    export_dir: PathBuf,
}

impl UiApp for TestApp {
    fn exam_loop(&self) -> Arc<ExamLoopService> {
        Arc::clone(&self.exam_loop)
    }

    fn catalog_source(&self) -> CatalogSource {
        self.source.clone()
    }

    fn export_dir(&self) -> PathBuf {
        self.export_dir.clone()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Exam,
    Results,
}

type StoreSlot = Rc<RefCell<Option<ExamStore>>>;

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    store_slot: StoreSlot,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    let store = use_exam_store_provider();
    props.store_slot.borrow_mut().replace(store);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Exam => rsx! { ExamView {} },
        ViewKind::Results => rsx! { ResultsView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub storage: Storage,
    pub exam_loop: Arc<ExamLoopService>,
    pub export_dir: tempfile::TempDir,
    store_slot: StoreSlot,
    _bank: Option<tempfile::NamedTempFile>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild and drive until the catalog load has finished.
    pub async fn settle(&mut self) -> String {
        self.rebuild();
        for _ in 0..40 {
            let html = self.render();
            if !html.contains("Loading questions") {
                return html;
            }
            self.drive_async().await;
        }
        self.render()
    }

    /// Run `f` against the shared exam store inside the app scope, so it can
    /// spawn tasks the same way event handlers do.
    pub fn with_store(&mut self, f: impl FnOnce(ExamStore)) {
        let store = (*self.store_slot.borrow()).expect("store provided");
        self.dom.in_scope(ScopeId::APP, || f(store));
        drive_dom(&mut self.dom);
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

fn write_bank(raw: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp bank");
    file.write_all(raw.as_bytes()).expect("write bank");
    file
}

pub fn setup_view_harness(view: ViewKind) -> ViewHarness {
    setup_view_harness_with_storage(view, Storage::in_memory())
}

pub fn setup_view_harness_with_storage(view: ViewKind, storage: Storage) -> ViewHarness {
    let bank = write_bank(SAMPLE_BANK);
    let source = CatalogSource::File(bank.path().to_path_buf());
    build_harness(view, storage, source, Some(bank))
}

pub fn setup_view_harness_with_source(view: ViewKind, source: CatalogSource) -> ViewHarness {
    build_harness(view, Storage::in_memory(), source, None)
}

fn build_harness(
    view: ViewKind,
    storage: Storage,
    source: CatalogSource,
    bank: Option<tempfile::NamedTempFile>,
) -> ViewHarness {
    let export_dir = tempfile::tempdir().expect("export dir");
    let exam_loop = Arc::new(ExamLoopService::new(
        Clock::fixed(fixed_now()),
        Arc::clone(&storage.progress),
    ));
    let app = Arc::new(TestApp {
        exam_loop: Arc::clone(&exam_loop),
        source,
        export_dir: export_dir.path().to_path_buf(),
    });
    let store_slot: StoreSlot = Rc::new(RefCell::new(None));

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            store_slot: Rc::clone(&store_slot),
        },
    );

    ViewHarness {
        dom,
        storage,
        exam_loop,
        export_dir,
        store_slot,
        _bank: bank,
    }
}
