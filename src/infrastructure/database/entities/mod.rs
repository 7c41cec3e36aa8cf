//! Database entities module

pub mod attendance;
pub mod session;
pub mod student;
pub mod user;

pub use attendance::Entity as Attendance;
pub use session::Entity as Session;
pub use student::Entity as Student;
pub use user::Entity as User;
