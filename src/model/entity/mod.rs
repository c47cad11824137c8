mod status;
pub use status::RecordStatus;

mod user;
pub use user::{RegisterStudent, UserEntity, UserEntityCreate, UserWithRole};

mod role;
pub use role::Role;

mod continent;
pub use continent::{Continent, ContinentCreate};

mod country;
pub use country::{Country, CountryCreate};

mod student;
pub use student::{
    Student, StudentCreate, StudentListRow, StudentProfileRow, StudentStats, StudentsByCountryRow,
};

mod instructor;
pub use instructor::{Instructor, InstructorCreate};

mod module;
pub use module::{Module, ModuleCreate, ModuleWithLessonsRow};

mod lesson;
pub use lesson::{Lesson, LessonCreate, LessonListRow};

mod question;
pub use question::{Question, QuestionCreate, QuestionListRow};

mod lesson_progress;
pub use lesson_progress::{
    AnswerUpdate, LessonProgress, LessonProgressCreate, LessonProgressStatus, ProgressDetailRow,
    ProgressOverviewRow,
};

mod module_progress;
pub use module_progress::{ModuleProgress, ModuleProgressStatus};
