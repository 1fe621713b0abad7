mod process;
mod repository;
mod state;
mod work_order;

pub use process::{CompletionResult, InstallationProcess, ProcessRecord};
pub use repository::ProcessStore;
pub use state::{InstallationProcessState, InstallationState};
pub use work_order::WorkOrder;
