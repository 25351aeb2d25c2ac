//! Course model: a study group with a membership roster and a chat channel.
//!
//! Courses are never hard-deleted; administrators flip `is_active` instead.
//! `last_message` / `last_message_time` are a denormalized cache of the latest
//! chat message, kept up to date best-effort by the send path.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A course document from the `courses` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Category identifier from [`COURSE_CATEGORIES`]
    pub category: String,

    #[serde(default)]
    pub category_icon: String,

    #[serde(default)]
    pub category_color: String,

    /// Member user IDs. Uniqueness is application-enforced: every write goes
    /// through the store's array-union primitive.
    #[serde(default)]
    pub members: Vec<String>,

    /// Stored enrollment counter, maintained with increment deltas. Can drift
    /// from `members.len()`; reads should prefer [`Course::member_count`].
    #[serde(default)]
    pub enrolled_count: i64,

    pub max_members: u32,

    pub is_active: bool,

    /// Denormalized preview of the latest chat message
    #[serde(default)]
    pub last_message: Option<String>,

    #[serde(default)]
    pub last_message_time: Option<DateTime<Utc>>,

    /// Users who pinned this course in their own chat list
    #[serde(default)]
    pub pinned_by: Vec<String>,

    pub created_by: String,

    #[serde(default)]
    pub created_by_name: String,

    #[serde(default)]
    pub created_by_email: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Course {
    /// Enrollment derived from the membership array, the single source of
    /// truth. The stored `enrolled_count` is kept for schema compatibility.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }

    pub fn is_pinned_by(&self, user_id: &str) -> bool {
        self.pinned_by.iter().any(|m| m == user_id)
    }

    pub fn at_capacity(&self) -> bool {
        self.member_count() >= self.max_members as usize
    }
}

/// A course category with its display icon and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseCategory {
    pub id: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

/// Catalog shown on the create-course screen.
pub const COURSE_CATEGORIES: &[CourseCategory] = &[
    CourseCategory { id: "history", icon: "📜", color: "#8D6E63" },
    CourseCategory { id: "math", icon: "🔢", color: "#42A5F5" },
    CourseCategory { id: "science", icon: "🔬", color: "#66BB6A" },
    CourseCategory { id: "computer", icon: "💻", color: "#7E57C2" },
    CourseCategory { id: "language", icon: "🗣️", color: "#FFA726" },
    CourseCategory { id: "art", icon: "🎨", color: "#EC407A" },
    CourseCategory { id: "music", icon: "🎵", color: "#26C6DA" },
    CourseCategory { id: "business", icon: "📊", color: "#FFCA28" },
];

pub fn category_by_id(id: &str) -> Option<&'static CourseCategory> {
    COURSE_CATEGORIES.iter().find(|c| c.id == id)
}

/// Create course request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 80, message = "Course name must be 1-80 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 500, message = "Description must be 1-500 characters"))]
    pub description: String,

    /// Must name an entry in [`COURSE_CATEGORIES`]
    pub category: String,

    /// Defaults to the configured member cap when omitted
    pub max_members: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_count_is_derived_from_the_array() {
        let mut course = sample_course();
        course.enrolled_count = 99; // drifted counter
        assert_eq!(course.member_count(), 2);
    }

    #[test]
    fn capacity_uses_derived_count() {
        let mut course = sample_course();
        course.max_members = 2;
        assert!(course.at_capacity());
        course.max_members = 3;
        assert!(!course.at_capacity());
    }

    #[test]
    fn category_catalog_lookup() {
        assert_eq!(category_by_id("math").unwrap().icon, "🔢");
        assert!(category_by_id("astrology").is_none());
    }

    fn sample_course() -> Course {
        serde_json::from_value(serde_json::json!({
            "id": "c1",
            "name": "Linear Algebra",
            "category": "math",
            "members": ["u1", "u2"],
            "enrolledCount": 2,
            "maxMembers": 50,
            "isActive": true,
            "createdBy": "u1",
        }))
        .unwrap()
    }
}
