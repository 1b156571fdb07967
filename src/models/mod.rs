pub mod assignment;
pub mod course;
pub mod draft;

pub use assignment::{Assignment, AssignmentPatch, AssignmentType, NewAssignment, Priority, UNTITLED};
pub use course::{CourseFolder, CourseSummary, NewCourseFolder, course_key};
pub use draft::{CommitOutcome, Draft, DraftInput, DraftPatch, StagingSummary};
