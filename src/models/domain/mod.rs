pub mod lesson;
pub mod question;
pub mod remote_file;
pub use lesson::{Lesson, LessonEnvelope, Step, VisualAid};
pub use question::{ExtractedQuestion, QuestionList};
pub use remote_file::RemoteFileHandle;
