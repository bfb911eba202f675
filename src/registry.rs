//! Registered type universe, the single source of truth for bindable types.
//!
//! Rust has no runtime type lookup by name, so the set of "loaded types"
//! the resolution policies enumerate is an explicit registry. Views are
//! registered with a path-style full name, their capability markers and any
//! declared bindings; presenters are registered with a full name and a
//! constructor seam. Only presenters live in the presenter table, so a name
//! hit there satisfies the presenter-marker capability by construction.
//!
//! A registry is built once, then shared immutably (`Arc`) across binding
//! sessions; no ambient global.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::discovery::BindingDeclaration;
use crate::instantiator::{InstantiationError, Invoker, SharedPresenter};
use crate::presenter::BindsView;
use crate::view::View;

/// Metadata registered for a view type.
pub struct ViewDescriptor {
    type_id: TypeId,
    type_name: String,
    capabilities: Vec<String>,
    declarations: Vec<BindingDeclaration>,
}

impl ViewDescriptor {
    /// Describe view type `V` under `type_name`, e.g.
    /// `"app::widgets::WidgetsView"`.
    pub fn of<V: View>(type_name: impl Into<String>) -> Self {
        Self {
            type_id: TypeId::of::<V>(),
            type_name: type_name.into(),
            capabilities: Vec::new(),
            declarations: Vec::new(),
        }
    }

    /// Add a capability-marker name. Order matters: convention resolution
    /// tries capabilities in declaration order.
    pub fn with_capability(mut self, name: impl Into<String>) -> Self {
        self.capabilities.push(name.into());
        self
    }

    /// Attach a declarative binding, the equivalent of a binding attribute
    /// placed directly on the view type. Not inherited by other types.
    pub fn with_declaration(mut self, declaration: BindingDeclaration) -> Self {
        self.declarations.push(declaration);
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    pub fn declarations(&self) -> &[BindingDeclaration] {
        &self.declarations
    }

    /// Everything before the last `::` segment, or `""` for a bare name.
    pub fn namespace(&self) -> &str {
        match self.type_name.rfind("::") {
            Some(idx) => &self.type_name[..idx],
            None => "",
        }
    }

    /// The last `::` segment of the full name.
    pub fn short_name(&self) -> &str {
        self.type_name.rsplit("::").next().unwrap_or(&self.type_name)
    }
}

type InvokerFactory = Arc<dyn Fn() -> Invoker + Send + Sync>;

/// A registered presenter type together with its constructor recipe.
///
/// The recipe is synthesized into a concrete [`Invoker`] by the
/// instantiator on first use of a (presenter, view) pair, and cached from
/// then on.
pub struct PresenterEntry {
    type_id: TypeId,
    type_name: String,
    make_invoker: InvokerFactory,
}

impl PresenterEntry {
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub(crate) fn synthesize_invoker(&self) -> Invoker {
        (self.make_invoker)()
    }
}

/// Explicit, immutable-after-build registry of views and presenters.
pub struct TypeRegistry {
    views: HashMap<TypeId, Arc<ViewDescriptor>>,
    presenters: HashMap<TypeId, Arc<PresenterEntry>>,
    // Lowercased full name -> type, for case-insensitive candidate lookup.
    presenter_names: HashMap<String, TypeId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            views: HashMap::new(),
            presenters: HashMap::new(),
            presenter_names: HashMap::new(),
        }
    }

    pub fn register_view(&mut self, descriptor: ViewDescriptor) {
        self.views.insert(descriptor.type_id(), Arc::new(descriptor));
    }

    /// Register presenter type `P` under `type_name`.
    ///
    /// Captures `P`'s [`BindsView`] impl and erases it behind an invoker
    /// recipe: the invoker downcasts the offered view to `P::View` and runs
    /// `P::create`, propagating constructor failures unchanged.
    pub fn register_presenter<P: BindsView>(&mut self, type_name: impl Into<String>) {
        let type_name = type_name.into();
        let make_invoker: InvokerFactory = Arc::new(|| {
            Arc::new(|view: Arc<dyn View>| {
                let presenter_name = std::any::type_name::<P>();
                let concrete = view.as_any_arc().downcast::<P::View>().map_err(|_| {
                    InstantiationError::ViewMismatch {
                        presenter: presenter_name,
                        expected: std::any::type_name::<P::View>(),
                    }
                })?;
                let presenter =
                    P::create(concrete).map_err(|source| InstantiationError::Constructor {
                        presenter: presenter_name,
                        source,
                    })?;
                let shared: SharedPresenter = Arc::new(Mutex::new(presenter));
                Ok(shared)
            })
        });

        let entry = PresenterEntry {
            type_id: TypeId::of::<P>(),
            type_name: type_name.clone(),
            make_invoker,
        };
        self.presenter_names
            .insert(type_name.to_ascii_lowercase(), entry.type_id);
        self.presenters.insert(entry.type_id, Arc::new(entry));
    }

    pub fn view_descriptor(&self, view_type: TypeId) -> Option<&Arc<ViewDescriptor>> {
        self.views.get(&view_type)
    }

    pub fn presenter(&self, presenter_type: TypeId) -> Option<&Arc<PresenterEntry>> {
        self.presenters.get(&presenter_type)
    }

    /// Case-insensitive lookup by full name.
    pub fn presenter_by_name(&self, full_name: &str) -> Option<&Arc<PresenterEntry>> {
        let type_id = self.presenter_names.get(&full_name.to_ascii_lowercase())?;
        self.presenters.get(type_id)
    }

    /// Diagnostic name for a view type; falls back to the raw type id for
    /// unregistered views.
    pub fn view_name(&self, view_type: TypeId) -> String {
        self.views
            .get(&view_type)
            .map(|descriptor| descriptor.type_name.clone())
            .unwrap_or_else(|| format!("{view_type:?}"))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
