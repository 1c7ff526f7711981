// Application layer
// Workflow commands that coordinate the domain with the persistence gateway

pub mod controller;
pub mod errors;
pub mod tokens;
pub mod view;

pub use controller::TeamWorkflowController;
pub use errors::{WorkflowError, WorkflowResult};
pub use view::{BoardView, OperationKind, OperationState};
