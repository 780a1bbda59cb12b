//! Service layer: validation, gateway, reconciliation and render planning.

pub mod content_guard;
pub mod json_extraction;
pub mod layout_gateway;
pub mod persistence_worker;
pub mod reconciler;
pub mod render_plan;
pub mod schema_validator;

pub use content_guard::{DegenerateContentGuard, GuardRule};
pub use json_extraction::extract_structured_block;
pub use layout_gateway::{GatewayParams, LayoutGateway, RequestPhase};
pub use persistence_worker::PersistenceWorker;
pub use reconciler::{AdaptationReconciler, ReconcilerBuilder, ReconcilerStatus, SubmitOutcome};
pub use render_plan::{plan_render, ElementRenderer, RenderItem, RendererRegistry};
pub use schema_validator::{Rejection, RejectionReason, SchemaValidator, ValidationReport};
