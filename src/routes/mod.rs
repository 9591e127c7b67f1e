pub mod auth;

pub mod schools;

pub mod accounts;

pub mod classes;

pub mod subjects;

pub mod exams;

pub mod grades;

pub mod announcements;

pub mod schedules;

pub mod lesson_logs;

pub mod payments;

pub use auth::configure_auth_routes;
pub use payments::configure_webhook_routes;
pub use schools::configure_school_routes;
