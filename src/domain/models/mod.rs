//! Domain models.

pub mod candidate;
pub mod config;
pub mod proposal;
pub mod schema;
pub mod ui_state;

pub use candidate::CandidateElement;
pub use config::{
    BackendConfig, BackendProvider, Config, LoggingConfig, StorageConfig, StorageKind,
};
pub use proposal::{LayoutHints, LayoutProposal, ProposalKind, ScreenCapacity};
pub use schema::{
    validate_schema, ArgumentSpec, ArgumentType, ComponentDefinition, ComponentSchema,
    RawComponentDefinition, RawSpaceHint, SchemaDocument, Size, SpaceHint,
};
pub use ui_state::{ArgumentValue, ArrangementMode, Placement, UiElement, UiState};
