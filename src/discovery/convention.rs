//! Convention-based presenter resolution.
//!
//! Maps a view type to a candidate presenter type by enumerating name
//! candidates derived from the view's capability markers and its own name,
//! across a configured set of namespaces and templates. The first existing
//! presenter wins; there is no ambiguity resolution beyond enumeration
//! order, and no match is a normal, non-error outcome.

use std::any::TypeId;
use std::sync::Arc;

use super::{BindingMode, BindingOrigin, DiscoveryError, DiscoveryStrategy, ViewBinding};
use crate::cache::TypeResolutionCache;
use crate::config::ConventionConfig;
use crate::registry::{PresenterEntry, TypeRegistry, ViewDescriptor};

/// Short name derived from a capability-marker name: last path segment,
/// minus a leading `I` (only when the rest stays in type case, so
/// "Inventory" survives) and a trailing `View`.
fn capability_short_name(capability: &str) -> String {
    let base = capability.rsplit("::").next().unwrap_or(capability);
    let base = match base.strip_prefix('I') {
        Some(rest) if rest.chars().next().is_some_and(|c| c.is_ascii_uppercase()) => rest,
        _ => base,
    };
    base.strip_suffix("View").unwrap_or(base).to_string()
}

/// Memoizing convention resolver.
///
/// Resolution is pure per view type, so results, including misses, are
/// cached for the lifetime of the resolver and `resolve` returns the
/// identical entry on every call.
pub struct ConventionResolver {
    config: ConventionConfig,
    cache: TypeResolutionCache<TypeId, Option<Arc<PresenterEntry>>>,
}

impl ConventionResolver {
    pub fn new(config: ConventionConfig) -> Self {
        Self {
            config,
            cache: TypeResolutionCache::new(),
        }
    }

    pub fn resolve(
        &self,
        view_type: TypeId,
        registry: &TypeRegistry,
    ) -> Option<Arc<PresenterEntry>> {
        self.cache
            .get_or_compute(view_type, || self.resolve_uncached(view_type, registry))
    }

    fn resolve_uncached(
        &self,
        view_type: TypeId,
        registry: &TypeRegistry,
    ) -> Option<Arc<PresenterEntry>> {
        let descriptor = registry.view_descriptor(view_type)?;
        let short_names = self.short_names(descriptor);
        let namespaces = self.namespaces(descriptor);

        // Short names outer, then namespace x template, first hit wins.
        for short_name in &short_names {
            for namespace in &namespaces {
                for template in &self.config.templates {
                    let candidate = template
                        .replace("{namespace}", namespace)
                        .replace("{presenter}", short_name);
                    if let Some(entry) = registry.presenter_by_name(&candidate) {
                        tracing::debug!(
                            view = descriptor.type_name(),
                            presenter = entry.type_name(),
                            %candidate,
                            "convention resolved presenter"
                        );
                        return Some(Arc::clone(entry));
                    }
                }
            }
        }

        tracing::debug!(view = descriptor.type_name(), "no convention match");
        None
    }

    /// Candidate short names: capability markers in declaration order,
    /// then the view's own name with the first matching configured suffix
    /// stripped.
    fn short_names(&self, descriptor: &ViewDescriptor) -> Vec<String> {
        let mut names = Vec::with_capacity(descriptor.capabilities().len() + 1);
        for capability in descriptor.capabilities() {
            let name = capability_short_name(capability);
            if !name.is_empty() {
                names.push(name);
            }
        }

        let own = descriptor.short_name();
        let stripped = self
            .config
            .view_suffixes
            .iter()
            .find_map(|suffix| own.strip_suffix(suffix.as_str()))
            .unwrap_or(own);
        if !stripped.is_empty() {
            names.push(stripped.to_string());
        }
        names
    }

    /// Candidate namespaces: configured defaults, the view's own
    /// namespace, then the view's crate root when distinct.
    fn namespaces(&self, descriptor: &ViewDescriptor) -> Vec<String> {
        let mut namespaces = self.config.default_namespaces.clone();
        let own = descriptor.namespace();
        if !own.is_empty() {
            namespaces.push(own.to_string());
        }
        let root = descriptor.type_name().split("::").next().unwrap_or("");
        if !root.is_empty() && root != own {
            namespaces.push(root.to_string());
        }
        namespaces
    }
}

/// Adapts [`ConventionResolver`] to the discovery strategy seam. A
/// convention hit is always a per-view binding.
pub struct ConventionStrategy {
    resolver: ConventionResolver,
}

impl ConventionStrategy {
    pub fn new(config: ConventionConfig) -> Self {
        Self {
            resolver: ConventionResolver::new(config),
        }
    }

    pub fn resolver(&self) -> &ConventionResolver {
        &self.resolver
    }
}

impl DiscoveryStrategy for ConventionStrategy {
    fn resolve(
        &self,
        view_type: TypeId,
        registry: &TypeRegistry,
    ) -> Result<Vec<ViewBinding>, DiscoveryError> {
        Ok(self
            .resolver
            .resolve(view_type, registry)
            .map(|presenter| {
                vec![ViewBinding {
                    view_type,
                    presenter,
                    mode: BindingMode::PerView,
                    origin: BindingOrigin::Convention,
                }]
            })
            .unwrap_or_default())
    }
}
