//! Render planning: map visible elements onto injected renderers.
//!
//! The registry is passed in rather than held globally, so independent
//! reconcilers can render through different element implementations.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::domain::models::{ArgumentValue, Placement, UiElement, UiState};

/// Concrete implementation of one element type.
pub trait ElementRenderer: Send + Sync {
    /// Produce the rendered form of an element. Arguments arrive unchanged.
    fn render(&self, element: &UiElement) -> String;
}

impl<F> ElementRenderer for F
where
    F: Fn(&UiElement) -> String + Send + Sync,
{
    fn render(&self, element: &UiElement) -> String {
        self(element)
    }
}

/// Type name → renderer.
#[derive(Clone, Default)]
pub struct RendererRegistry {
    renderers: HashMap<String, Arc<dyn ElementRenderer>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        element_type: impl Into<String>,
        renderer: Arc<dyn ElementRenderer>,
    ) -> Option<Arc<dyn ElementRenderer>> {
        self.renderers.insert(element_type.into(), renderer)
    }

    pub fn with(mut self, element_type: impl Into<String>, renderer: Arc<dyn ElementRenderer>) -> Self {
        self.register(element_type, renderer);
        self
    }

    pub fn get(&self, element_type: &str) -> Option<&Arc<dyn ElementRenderer>> {
        self.renderers.get(element_type)
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.renderers.keys().collect();
        types.sort();
        f.debug_struct("RendererRegistry").field("types", &types).finish()
    }
}

/// One entry of a render plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderItem {
    Rendered {
        id: String,
        element_type: String,
        placement: Placement,
        arguments: BTreeMap<String, ArgumentValue>,
        output: String,
    },
    /// Visible but inert stand-in for a type with no renderer.
    Placeholder {
        id: String,
        element_type: String,
        placement: Placement,
    },
}

impl RenderItem {
    pub fn id(&self) -> &str {
        match self {
            Self::Rendered { id, .. } | Self::Placeholder { id, .. } => id,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }
}

/// Plan the rendering of every visible element, in order.
pub fn plan_render(state: &UiState, registry: &RendererRegistry) -> Vec<RenderItem> {
    state
        .visible_elements()
        .map(|element| match registry.get(&element.element_type) {
            Some(renderer) => RenderItem::Rendered {
                id: element.id.clone(),
                element_type: element.element_type.clone(),
                placement: element.placement,
                arguments: element.arguments.clone(),
                output: renderer.render(element),
            },
            None => {
                tracing::debug!(
                    element_id = %element.id,
                    element_type = %element.element_type,
                    "No renderer registered; using placeholder"
                );
                RenderItem::Placeholder {
                    id: element.id.clone(),
                    element_type: element.element_type.clone(),
                    placement: element.placement,
                }
            }
        })
        .collect()
}
