//! Shared test fixtures: views, presenters, messages and a populated
//! registry.

#![allow(dead_code, unused_imports)]

use std::sync::Arc;

use parking_lot::Mutex;

use viewbind::{
    BindingDeclaration, BindsView, BusHandle, BusMessage, CompositeView, Host, Presenter,
    PresenterError, ReadyEvent, TypeRegistry, Upcast, View, ViewDescriptor,
};

/// Shared record of lifecycle and message activity, written by fixture
/// presenters and inspected by tests.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().clone()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

macro_rules! fixture_view {
    ($name:ident) => {
        pub struct $name {
            ready: ReadyEvent,
            pub journal: Journal,
        }

        impl $name {
            pub fn new(journal: &Journal) -> Arc<Self> {
                Arc::new(Self {
                    ready: ReadyEvent::new(),
                    journal: Arc::clone(journal),
                })
            }
        }

        impl View for $name {
            fn ready(&self) -> &ReadyEvent {
                &self.ready
            }
        }
    };
}

fixture_view!(WidgetsView);
fixture_view!(GadgetView);
fixture_view!(DualView);
fixture_view!(NoteView);
fixture_view!(BadSharedView);
fixture_view!(PlainView);
fixture_view!(FailingView);
fixture_view!(FlakyView);
fixture_view!(RefreshCommand);

// --- messages -------------------------------------------------------------

/// Broadcast asking every interested presenter to refresh.
pub struct RefreshRequested;

impl BusMessage for RefreshRequested {}

/// Base message embedded by more specific item messages.
pub struct ItemEvent {
    pub id: u32,
}

impl BusMessage for ItemEvent {}

/// Specific message that also offers delivery as its embedded base.
pub struct ItemRenamed {
    pub base: ItemEvent,
    pub name: String,
}

impl BusMessage for ItemRenamed {
    fn upcasts(&self) -> Vec<Upcast<'_>> {
        vec![Upcast::as_type(&self.base)]
    }
}

// --- presenters -----------------------------------------------------------

/// Full-lifecycle presenter; journals every stage and reacts to
/// [`RefreshRequested`] on the bus. Hook tests inject `context`.
pub struct WidgetsPresenter {
    view: Arc<WidgetsView>,
    pub context: Option<String>,
}

impl Presenter for WidgetsPresenter {
    fn attach(&mut self, bus: BusHandle) {
        self.view.journal.lock().push("widgets::attach".to_string());
        let journal = Arc::clone(&self.view.journal);
        bus.subscribe::<RefreshRequested, _>(move |_| {
            journal.lock().push("widgets::refresh".to_string());
            Ok(())
        })
        .expect("bus open during attach");
    }

    fn on_view_ready(&mut self) {
        let entry = match &self.context {
            Some(context) => format!("widgets::ready ctx={context}"),
            None => "widgets::ready".to_string(),
        };
        self.view.journal.lock().push(entry);
    }

    fn release(&mut self) -> Result<(), PresenterError> {
        self.view.journal.lock().push("widgets::release".to_string());
        Ok(())
    }
}

impl BindsView for WidgetsPresenter {
    type View = WidgetsView;

    fn create(view: Arc<WidgetsView>) -> Result<Self, PresenterError> {
        view.journal.lock().push("widgets::create".to_string());
        Ok(Self {
            view,
            context: None,
        })
    }
}

pub struct DualPresenter {
    view: Arc<DualView>,
}

impl Presenter for DualPresenter {
    fn attach(&mut self, _bus: BusHandle) {
        self.view.journal.lock().push("dual::attach".to_string());
    }
}

impl BindsView for DualPresenter {
    type View = DualView;

    fn create(view: Arc<DualView>) -> Result<Self, PresenterError> {
        view.journal.lock().push("dual::create".to_string());
        Ok(Self { view })
    }
}

pub struct AuditPresenter {
    view: Arc<DualView>,
}

impl Presenter for AuditPresenter {
    fn attach(&mut self, _bus: BusHandle) {
        self.view.journal.lock().push("audit::attach".to_string());
    }

    fn release(&mut self) -> Result<(), PresenterError> {
        self.view.journal.lock().push("audit::release".to_string());
        Ok(())
    }
}

impl BindsView for AuditPresenter {
    type View = DualView;

    fn create(view: Arc<DualView>) -> Result<Self, PresenterError> {
        view.journal.lock().push("audit::create".to_string());
        Ok(Self { view })
    }
}

/// Bound to the composite of every [`NoteView`] in a pass.
pub struct NotesPresenter {
    view: Arc<CompositeView>,
}

impl NotesPresenter {
    fn journal_all(&self, entry: &str) {
        for fragment in self.view.fragments() {
            if let Some(note) = fragment.as_any_ref().downcast_ref::<NoteView>() {
                note.journal.lock().push(entry.to_string());
            }
        }
    }
}

impl Presenter for NotesPresenter {
    fn attach(&mut self, _bus: BusHandle) {
        self.journal_all("notes::attach");
    }

    fn on_view_ready(&mut self) {
        self.journal_all("notes::ready");
    }
}

impl BindsView for NotesPresenter {
    type View = CompositeView;

    fn create(view: Arc<CompositeView>) -> Result<Self, PresenterError> {
        Ok(Self { view })
    }
}

/// Never constructs; exercises constructor failure paths.
pub struct FailingPresenter;

impl Presenter for FailingPresenter {
    fn attach(&mut self, _bus: BusHandle) {}
}

impl BindsView for FailingPresenter {
    type View = FailingView;

    fn create(_view: Arc<FailingView>) -> Result<Self, PresenterError> {
        Err("constructor refused the view".into())
    }
}

/// Constructs fine but fails on release.
pub struct FlakyReleasePresenter {
    view: Arc<FlakyView>,
}

impl Presenter for FlakyReleasePresenter {
    fn attach(&mut self, _bus: BusHandle) {
        self.view.journal.lock().push("flaky::attach".to_string());
    }

    fn release(&mut self) -> Result<(), PresenterError> {
        Err("flaky teardown".into())
    }
}

impl BindsView for FlakyReleasePresenter {
    type View = FlakyView;

    fn create(view: Arc<FlakyView>) -> Result<Self, PresenterError> {
        Ok(Self { view })
    }
}

macro_rules! inert_presenter {
    ($name:ident, $view:ident) => {
        pub struct $name {
            _view: Arc<$view>,
        }

        impl Presenter for $name {
            fn attach(&mut self, _bus: BusHandle) {}
        }

        impl BindsView for $name {
            type View = $view;

            fn create(view: Arc<$view>) -> Result<Self, PresenterError> {
                Ok(Self { _view: view })
            }
        }
    };
}

inert_presenter!(PanelPresenter, GadgetView);
inert_presenter!(GadgetPresenter, GadgetView);
inert_presenter!(RefreshPresenter, RefreshCommand);

// --- registry and hosts ---------------------------------------------------

/// The standard fixture universe shared by the integration tests.
pub fn registry() -> Arc<TypeRegistry> {
    let mut registry = TypeRegistry::new();

    registry.register_view(
        ViewDescriptor::of::<WidgetsView>("fixture::widgets::WidgetsView")
            .with_capability("fixture::markers::IWidgetsView"),
    );
    registry.register_view(
        ViewDescriptor::of::<GadgetView>("fixture::widgets::GadgetView")
            .with_capability("fixture::markers::IPanelView"),
    );
    registry.register_view(
        ViewDescriptor::of::<DualView>("fixture::widgets::DualView")
            .with_declaration(BindingDeclaration::to::<AuditPresenter>()),
    );
    registry.register_view(
        ViewDescriptor::of::<NoteView>("fixture::notes::NoteView").with_declaration(
            BindingDeclaration::to::<NotesPresenter>()
                .for_view::<NoteView>()
                .shared(),
        ),
    );
    registry.register_view(
        ViewDescriptor::of::<BadSharedView>("fixture::notes::BadSharedView")
            .with_declaration(BindingDeclaration::to::<NotesPresenter>().shared()),
    );
    registry.register_view(ViewDescriptor::of::<PlainView>("fixture::plain::PlainView"));
    registry.register_view(
        ViewDescriptor::of::<FailingView>("fixture::failing::FailingView")
            .with_declaration(BindingDeclaration::to::<FailingPresenter>()),
    );
    registry.register_view(
        ViewDescriptor::of::<FlakyView>("fixture::flaky::FlakyView")
            .with_declaration(BindingDeclaration::to::<FlakyReleasePresenter>()),
    );
    registry.register_view(ViewDescriptor::of::<RefreshCommand>(
        "fixture::commands::RefreshCommand",
    ));

    registry.register_presenter::<WidgetsPresenter>("fixture::presenters::WidgetsPresenter");
    registry.register_presenter::<PanelPresenter>("fixture::presenters::PanelPresenter");
    registry.register_presenter::<GadgetPresenter>("fixture::presenters::GadgetPresenter");
    registry.register_presenter::<DualPresenter>("fixture::presenters::DualPresenter");
    registry.register_presenter::<AuditPresenter>("fixture::audit::AuditPresenter");
    registry.register_presenter::<NotesPresenter>("fixture::notes::NotesPresenter");
    registry.register_presenter::<FailingPresenter>("fixture::failing::FailingPresenter");
    registry.register_presenter::<FlakyReleasePresenter>("fixture::flaky::FlakyReleasePresenter");
    registry.register_presenter::<RefreshPresenter>("fixture::presenters::RefreshPresenter");

    Arc::new(registry)
}

/// Static host over a fixed list of views, optionally with nested hosts.
pub struct FixtureHost {
    views: Vec<Arc<dyn View>>,
    children: Vec<Arc<dyn Host>>,
}

impl FixtureHost {
    pub fn new(views: Vec<Arc<dyn View>>) -> Arc<Self> {
        Arc::new(Self {
            views,
            children: Vec::new(),
        })
    }

    pub fn with_children(views: Vec<Arc<dyn View>>, children: Vec<Arc<dyn Host>>) -> Arc<Self> {
        Arc::new(Self { views, children })
    }
}

impl Host for FixtureHost {
    fn views(&self) -> Vec<Arc<dyn View>> {
        self.views.clone()
    }

    fn children(&self) -> Vec<Arc<dyn Host>> {
        self.children.clone()
    }
}
