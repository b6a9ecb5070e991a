pub mod clock;
pub mod controller;
pub mod repository;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::TrainingController;
pub use repository::TrainingsRepository;
pub use state::{CompletionSummary, TrainingState, TrainingStatus};
