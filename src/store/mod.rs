pub mod assignments;
pub mod courses;
pub mod staging;
pub mod tracker;

pub use assignments::AssignmentStore;
pub use courses::{CourseAggregator, CourseError, RenameOutcome, UPCOMING_WINDOW_DAYS, aggregate};
pub use staging::{DraftStagingStore, ExtractionTicket, StagingError};
pub use tracker::{PersistedState, Tracker};
