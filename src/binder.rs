//! Presenter binding orchestration.
//!
//! A binder is scoped to one unit of work: it walks its hosts for views,
//! resolves each view's binding set through the composed discovery
//! strategies, constructs the presenters, wires them to the session's
//! message coordinator and to their views' ready events, and tears the
//! whole set down on release. Late-arriving views can join the same binder
//! after the initial pass without re-binding anything else.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::bus::{BusHandle, MessageCoordinator};
use crate::config::ConventionConfig;
use crate::discovery::{BindingMode, CompositeDiscovery, DiscoveryError, ViewBinding};
use crate::instantiator::{InstantiationError, PresenterInstantiator, SharedPresenter};
use crate::presenter::{Presenter, PresenterError};
use crate::registry::TypeRegistry;
use crate::view::{view_type_id, CompositeView, View};

/// A source of views, possibly with lazily exposed nested hosts (child
/// controls, sub-pages). Traversed depth-first, in order.
pub trait Host: Send + Sync {
    /// Views this host contributes, in presentation order.
    fn views(&self) -> Vec<Arc<dyn View>>;

    /// Nested hosts.
    fn children(&self) -> Vec<Arc<dyn Host>> {
        Vec::new()
    }
}

/// Raised for every presenter the binder creates, after bus attachment and
/// before the view's ready event can fire. The host shell may downcast the
/// presenter and inject host-specific context here.
pub struct PresenterCreated<'a> {
    pub presenter: &'a mut dyn Presenter,
    pub view: &'a Arc<dyn View>,
}

type CreatedHook = Box<dyn FnMut(PresenterCreated<'_>) + Send>;

/// A presenter created during a bind pass. Owned exclusively by the binder
/// that created it and destroyed on release.
pub struct ResolvedPresenter {
    presenter: SharedPresenter,
    view: Arc<dyn View>,
    presenter_name: String,
}

impl ResolvedPresenter {
    pub fn presenter(&self) -> &SharedPresenter {
        &self.presenter
    }

    pub fn view(&self) -> &Arc<dyn View> {
        &self.view
    }

    pub fn presenter_name(&self) -> &str {
        &self.presenter_name
    }
}

/// Errors surfaced by a bind pass or by release.
#[derive(Debug, Error)]
pub enum BinderError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Instantiation(#[from] InstantiationError),

    /// A view resolved to no presenter while the binder is configured to
    /// treat that as fatal.
    #[error("no presenter bound for view '{view}'")]
    Unbound { view: String },

    /// The binder is single-use after release.
    #[error("binder already released")]
    Released,

    /// A presenter failed during release; remaining cleanup was aborted.
    #[error("presenter '{presenter}' failed during release: {source}")]
    Presenter {
        presenter: String,
        #[source]
        source: PresenterError,
    },
}

/// Builder for [`PresenterBinder`].
pub struct PresenterBinderBuilder {
    registry: Arc<TypeRegistry>,
    hosts: Vec<Arc<dyn Host>>,
    discovery: Option<CompositeDiscovery>,
    instantiator: Option<Arc<PresenterInstantiator>>,
    coordinator: Option<Arc<MessageCoordinator>>,
    convention_config: ConventionConfig,
    throw_if_unbound: bool,
    created_hook: Option<CreatedHook>,
}

impl PresenterBinderBuilder {
    fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            hosts: Vec::new(),
            discovery: None,
            instantiator: None,
            coordinator: None,
            convention_config: ConventionConfig::default(),
            throw_if_unbound: false,
            created_hook: None,
        }
    }

    pub fn host(mut self, host: Arc<dyn Host>) -> Self {
        self.hosts.push(host);
        self
    }

    /// Replace the default declared-then-convention composition.
    pub fn discovery(mut self, discovery: CompositeDiscovery) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Conventions for the default discovery composition. Ignored when an
    /// explicit [`discovery`](Self::discovery) is supplied.
    pub fn convention_config(mut self, config: ConventionConfig) -> Self {
        self.convention_config = config;
        self
    }

    /// Share a pre-built instantiator (and its invoker cache) with other
    /// binding sessions.
    pub fn instantiator(mut self, instantiator: Arc<PresenterInstantiator>) -> Self {
        self.instantiator = Some(instantiator);
        self
    }

    /// Use an externally owned coordinator for a shared unit of work. The
    /// binder then leaves closing it to that owner.
    pub fn coordinator(mut self, coordinator: Arc<MessageCoordinator>) -> Self {
        self.coordinator = Some(coordinator);
        self
    }

    /// Treat a view with an empty binding set as an error.
    pub fn throw_if_unbound(mut self, flag: bool) -> Self {
        self.throw_if_unbound = flag;
        self
    }

    pub fn on_presenter_created(
        mut self,
        hook: impl FnMut(PresenterCreated<'_>) + Send + 'static,
    ) -> Self {
        self.created_hook = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> PresenterBinder {
        let Self {
            registry,
            hosts,
            discovery,
            instantiator,
            coordinator,
            convention_config,
            throw_if_unbound,
            created_hook,
        } = self;

        let owns_coordinator = coordinator.is_none();
        PresenterBinder {
            registry,
            discovery: discovery
                .unwrap_or_else(|| CompositeDiscovery::standard(convention_config)),
            instantiator: instantiator.unwrap_or_default(),
            coordinator: coordinator.unwrap_or_else(|| Arc::new(MessageCoordinator::new())),
            owns_coordinator,
            hosts,
            pending: Vec::new(),
            bound: HashSet::new(),
            created_hook,
            resolved: Vec::new(),
            throw_if_unbound,
            performed: false,
            released: false,
            session: Uuid::new_v4(),
        }
    }
}

/// Orchestrator for one binding session.
///
/// Not designed for concurrent `perform_binding`/`release` from multiple
/// threads; the shared caches behind discovery and instantiation are, so
/// independent binders may run in parallel.
pub struct PresenterBinder {
    registry: Arc<TypeRegistry>,
    discovery: CompositeDiscovery,
    instantiator: Arc<PresenterInstantiator>,
    coordinator: Arc<MessageCoordinator>,
    owns_coordinator: bool,
    hosts: Vec<Arc<dyn Host>>,
    pending: Vec<Arc<dyn View>>,
    // Identity of every view instance with a wired presenter, so repeat
    // passes and late registrations never double-bind.
    bound: HashSet<usize>,
    created_hook: Option<CreatedHook>,
    resolved: Vec<ResolvedPresenter>,
    throw_if_unbound: bool,
    performed: bool,
    released: bool,
    session: Uuid,
}

fn collect_views(host: &dyn Host, out: &mut Vec<Arc<dyn View>>) {
    out.extend(host.views());
    for child in host.children() {
        collect_views(child.as_ref(), out);
    }
}

// Instance identity of a view. Only recorded for views the binder wires a
// presenter to, which it then keeps alive, so an address is never reused
// while its key is live.
fn view_key(view: &Arc<dyn View>) -> usize {
    Arc::as_ptr(view) as *const () as usize
}

impl PresenterBinder {
    pub fn builder(registry: Arc<TypeRegistry>) -> PresenterBinderBuilder {
        PresenterBinderBuilder::new(registry)
    }

    /// The session's message coordinator.
    pub fn coordinator(&self) -> &Arc<MessageCoordinator> {
        &self.coordinator
    }

    /// An endpoint onto the session bus, for collaborators outside the
    /// presenter population.
    pub fn bus_handle(&self) -> BusHandle {
        BusHandle::new(Arc::clone(&self.coordinator))
    }

    /// Presenters created so far, in creation order.
    pub fn bound(&self) -> &[ResolvedPresenter] {
        &self.resolved
    }

    pub fn session(&self) -> Uuid {
        self.session
    }

    /// Bind every currently known view: hosts are walked depth-first,
    /// then views registered before this pass are appended.
    pub fn perform_binding(&mut self) -> Result<(), BinderError> {
        if self.released {
            return Err(BinderError::Released);
        }
        let span = tracing::debug_span!("bind_pass", session = %self.session);
        let _guard = span.enter();

        let mut views = Vec::new();
        let hosts = self.hosts.clone();
        for host in &hosts {
            collect_views(host.as_ref(), &mut views);
        }
        let pending = std::mem::take(&mut self.pending);
        views.extend(pending.iter().cloned());

        // A failed pass binds nothing; queued views go back so a retry
        // sees them again.
        if let Err(error) = self.bind_views(views) {
            self.pending = pending;
            return Err(error);
        }
        self.performed = true;
        Ok(())
    }

    /// Register a late-arriving view. Before the first bind pass it is
    /// queued; afterwards it is bound immediately through the same path,
    /// without re-binding anything else.
    pub fn register_view(&mut self, view: Arc<dyn View>) -> Result<(), BinderError> {
        if self.released {
            return Err(BinderError::Released);
        }
        if self.performed {
            let span = tracing::debug_span!("late_bind", session = %self.session);
            let _guard = span.enter();
            self.bind_views(vec![view])
        } else {
            self.pending.push(view);
            Ok(())
        }
    }

    fn bind_views(&mut self, views: Vec<Arc<dyn View>>) -> Result<(), BinderError> {
        let mut fresh: Vec<Arc<dyn View>> = Vec::new();
        for view in views {
            let key = view_key(&view);
            let duplicate =
                self.bound.contains(&key) || fresh.iter().any(|seen| view_key(seen) == key);
            if !duplicate {
                fresh.push(view);
            }
        }

        // Resolve the full binding set first: declarative validation runs
        // for every view before any presenter is instantiated.
        let mut per_view: Vec<(ViewBinding, Arc<dyn View>)> = Vec::new();
        let mut shared: Vec<ViewBinding> = Vec::new();
        for view in &fresh {
            let view_type = view_type_id(view);
            let bindings = self.discovery.resolve(view_type, &self.registry)?;
            if bindings.is_empty() {
                let name = self.registry.view_name(view_type);
                if self.throw_if_unbound {
                    return Err(BinderError::Unbound { view: name });
                }
                tracing::debug!(view = %name, "no presenter resolved for view");
                continue;
            }
            for binding in bindings {
                match binding.mode {
                    BindingMode::PerView => per_view.push((binding, Arc::clone(view))),
                    BindingMode::SharedAcrossViews => {
                        let key = (binding.presenter.type_id(), binding.view_type);
                        let seen = shared.iter().any(|existing| {
                            (existing.presenter.type_id(), existing.view_type) == key
                        });
                        if !seen {
                            shared.push(binding);
                        }
                    }
                }
            }
        }

        // Instantiate everything before touching binder state: a failure
        // anywhere leaves every view of this pass unbound and retryable,
        // with no half-wired presenters.
        let mut created: Vec<(SharedPresenter, Arc<dyn View>, String)> = Vec::new();
        let mut wired_keys: Vec<usize> = Vec::new();

        for (binding, view) in per_view {
            let presenter = self
                .instantiator
                .instantiate(&binding.presenter, Arc::clone(&view))?;
            wired_keys.push(view_key(&view));
            created.push((presenter, view, binding.presenter.type_name().to_string()));
        }

        for binding in shared {
            // All instances of the declared view type in this pass share
            // one presenter, bound to their composite.
            let members: Vec<Arc<dyn View>> = fresh
                .iter()
                .filter(|view| view_type_id(view) == binding.view_type)
                .cloned()
                .collect();
            if members.is_empty() {
                tracing::debug!(
                    presenter = binding.presenter.type_name(),
                    "shared binding matched no views in this pass"
                );
                continue;
            }
            wired_keys.extend(members.iter().map(view_key));
            let logical: Arc<dyn View> = CompositeView::new(members);
            let presenter = self
                .instantiator
                .instantiate(&binding.presenter, Arc::clone(&logical))?;
            created.push((presenter, logical, binding.presenter.type_name().to_string()));
        }

        self.bound.extend(wired_keys);
        for (presenter, view, presenter_name) in created {
            self.wire(presenter, view, &presenter_name);
        }
        Ok(())
    }

    fn wire(&mut self, presenter: SharedPresenter, view: Arc<dyn View>, presenter_name: &str) {
        // Bus first, created hook second, ready forwarding last: the
        // presenter's wiring and any injected host context are in place
        // before the view's ready event can reach it.
        presenter
            .lock()
            .attach(BusHandle::new(Arc::clone(&self.coordinator)));

        if let Some(hook) = self.created_hook.as_mut() {
            let mut guard = presenter.lock();
            hook(PresenterCreated {
                presenter: &mut *guard,
                view: &view,
            });
        }

        let forward = Arc::downgrade(&presenter);
        view.ready().observe(move || {
            if let Some(presenter) = forward.upgrade() {
                presenter.lock().on_view_ready();
            }
        });

        tracing::debug!(presenter = presenter_name, "presenter bound");
        self.resolved.push(ResolvedPresenter {
            presenter,
            view,
            presenter_name: presenter_name.to_string(),
        });
    }

    /// Release every presenter this binder created, in creation order,
    /// then close the coordinator when it is internally owned.
    ///
    /// Single-use: a second call fails with [`BinderError::Released`].
    /// The first presenter failure aborts the remaining cleanup and
    /// propagates; later presenters are dropped without `release`, and an
    /// internally owned coordinator is left open. Documented limitation.
    pub fn release(&mut self) -> Result<(), BinderError> {
        if self.released {
            return Err(BinderError::Released);
        }
        self.released = true;

        let span = tracing::debug_span!("release", session = %self.session);
        let _guard = span.enter();

        let resolved = std::mem::take(&mut self.resolved);
        for bound in resolved {
            bound
                .presenter
                .lock()
                .release()
                .map_err(|source| BinderError::Presenter {
                    presenter: bound.presenter_name.clone(),
                    source,
                })?;
        }

        if self.owns_coordinator {
            self.coordinator.close();
        }
        Ok(())
    }
}
