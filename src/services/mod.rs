pub mod definition_gateway;
pub mod fallback;
pub mod prompt;
pub mod session_manager;
pub mod share_service;

pub use definition_gateway::DefinitionGateway;
pub use fallback::fallback_definition;
pub use prompt::{build_prompt, extract_json_payload, parse_definitions, GenerationRequest};
pub use session_manager::{DefinitionReport, LoadOutcome, SessionManager, SCHEMA_VERSION, SESSION_KEY};
pub use share_service::ShareService;
