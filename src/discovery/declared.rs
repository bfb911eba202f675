//! Declarative binding resolution.

use std::any::TypeId;
use std::sync::Arc;

use super::{BindingMode, BindingOrigin, DiscoveryError, DiscoveryStrategy, ViewBinding};
use crate::registry::TypeRegistry;

/// Reads the binding declarations attached directly to a view type.
///
/// Declarations are taken from the exact type only; there is no metadata
/// inheritance. A declaration without an explicit view type is filled with
/// the declaring view's own type, except in shared mode, where the sharing
/// key must never be inferred from context.
pub struct DeclaredBindingStrategy;

impl DeclaredBindingStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DeclaredBindingStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryStrategy for DeclaredBindingStrategy {
    fn resolve(
        &self,
        view_type: TypeId,
        registry: &TypeRegistry,
    ) -> Result<Vec<ViewBinding>, DiscoveryError> {
        let Some(descriptor) = registry.view_descriptor(view_type) else {
            return Ok(Vec::new());
        };

        let mut bindings = Vec::with_capacity(descriptor.declarations().len());
        for declaration in descriptor.declarations() {
            let entry = registry.presenter(declaration.presenter()).ok_or_else(|| {
                DiscoveryError::UnknownPresenter {
                    presenter: declaration.presenter_name(),
                    declared_on: descriptor.type_name().to_string(),
                }
            })?;

            let bound_view = match (declaration.view(), declaration.mode()) {
                (Some(view), _) => view,
                (None, BindingMode::SharedAcrossViews) => {
                    return Err(DiscoveryError::SharedBindingWithoutView {
                        view: descriptor.type_name().to_string(),
                    });
                }
                (None, BindingMode::PerView) => view_type,
            };

            bindings.push(ViewBinding {
                view_type: bound_view,
                presenter: Arc::clone(entry),
                mode: declaration.mode(),
                origin: BindingOrigin::Declared,
            });
        }
        Ok(bindings)
    }
}
