pub mod config;
pub mod definition;
pub mod ledger;
pub mod narrative;
pub mod selection;
pub mod session;
pub mod share;
pub mod snapshot;
pub mod value;

pub use config::{
    AssessmentConfig, Config, GenerationConfig, LogFormat, LoggingConfig, RotationPolicy,
    StorageConfig,
};
pub use definition::{Definition, DefinitionEdit, GeneratedDefinition};
pub use ledger::{Category, SortLedger, UndoOutcome};
pub use narrative::{word_count, Commitment, CommitmentUpdate, StoryStatus};
pub use selection::SelectionPlan;
pub use session::{Demographics, Phase, Session};
pub use share::{ShareArtifact, SharedValue};
pub use snapshot::{CommitmentSnapshot, RankedValue, SessionSnapshot};
pub use value::{CustomValue, Value, ValueCatalog, ValueRef, CATALOG_SIZE};
