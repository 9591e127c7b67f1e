pub mod extractor;
pub mod jwt;
pub mod matricule;
pub mod parameter_error_handler;
pub mod password;
pub mod random_code;
pub mod signature;
pub mod sql;
pub mod validate;

pub use extractor::{
    SafeAnnouncementIdI64, SafeClassIdI64, SafeExamIdI64, SafeGradeIdI64, SafeLessonLogIdI64,
    SafePaymentIdI64, SafeProfileIdI64, SafeScheduleIdI64, SafeSchoolIdI64, SafeSubjectIdI64,
};
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
pub use sql::escape_like_pattern;
