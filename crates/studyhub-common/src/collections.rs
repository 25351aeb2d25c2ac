//! Collection paths in the remote document store.
//!
//! The schema is external and consumed as-is: top-level `courses`,
//! `joinRequests`, `announcements`, and `users` collections, plus per-course
//! `messages` and `enrollments` sub-collections.

pub const COURSES: &str = "courses";
pub const JOIN_REQUESTS: &str = "joinRequests";
pub const ANNOUNCEMENTS: &str = "announcements";
pub const USERS: &str = "users";

/// Path of a course's chat message sub-collection.
pub fn course_messages(course_id: &str) -> String {
    format!("courses/{course_id}/messages")
}

/// Path of a course's enrollment-record sub-collection.
pub fn course_enrollments(course_id: &str) -> String {
    format!("courses/{course_id}/enrollments")
}
