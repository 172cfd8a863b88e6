// Application layer - Workflow components and their wiring

pub mod container;
pub mod engine_loader;
pub mod file_intake;
pub mod locators;
pub mod range_selector;
pub mod trim_operation;
pub mod workflow;

// Re-export components
pub use container::AppContainer;
pub use engine_loader::{EngineHandle, EngineLoader};
pub use file_intake::FileIntake;
pub use locators::LocatorStore;
pub use range_selector::RangeSelector;
pub use trim_operation::TrimOperation;
pub use workflow::{TrimJob, WorkflowController, WorkflowSettings};
