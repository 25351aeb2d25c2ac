//! Admin operations: course creation, announcements, user management, and
//! the dashboard counters.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use studyhub_common::collections::{
    course_enrollments, ANNOUNCEMENTS, COURSES, JOIN_REQUESTS, USERS,
};
use studyhub_common::config;
use studyhub_common::error::{StudyhubError, StudyhubResult};
use studyhub_common::models::{
    category_by_id, Announcement, Course, CreateAnnouncementRequest, CreateCourseRequest,
    Identity, Role, UserProfile,
};
use studyhub_common::validation::validate_request;
use studyhub_store::{server_timestamp, set, Direction, DocumentStore, Query};

/// One-shot counters for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_courses: u64,
    pub total_users: u64,
    pub active_announcements: u64,
    pub pending_requests: u64,
}

pub struct AdminService {
    store: Arc<dyn DocumentStore>,
}

impl AdminService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create a course with the creator seeded as its first member.
    pub async fn create_course(
        &self,
        who: &Identity,
        req: &CreateCourseRequest,
    ) -> StudyhubResult<Course> {
        validate_request(req)?;
        let category = category_by_id(&req.category).ok_or_else(|| StudyhubError::Validation {
            message: format!("Unknown category '{}'", req.category),
        })?;
        let max_members = req
            .max_members
            .unwrap_or(config::get().limits.default_max_members);

        let doc = self
            .store
            .create(
                COURSES,
                vec![
                    set("name", json!(req.name.trim())),
                    set("description", json!(req.description.trim())),
                    set("category", json!(category.id)),
                    set("categoryIcon", json!(category.icon)),
                    set("categoryColor", json!(category.color)),
                    set("maxMembers", json!(max_members)),
                    set("members", json!([who.id])),
                    set("enrolledCount", json!(1)),
                    set("createdBy", json!(who.id)),
                    set("createdByName", json!(who.name_or_default())),
                    set("createdByEmail", json!(who.email)),
                    set("isActive", json!(true)),
                    set("lastMessage", json!(null)),
                    set("lastMessageTime", json!(null)),
                    server_timestamp("createdAt"),
                    server_timestamp("updatedAt"),
                ],
            )
            .await?;

        info!(course_id = %doc.id, name = %req.name.trim(), "course created");
        Ok(doc.to_model()?)
    }

    pub async fn post_announcement(
        &self,
        who: &Identity,
        req: &CreateAnnouncementRequest,
    ) -> StudyhubResult<Announcement> {
        validate_request(req)?;
        let doc = self
            .store
            .create(
                ANNOUNCEMENTS,
                vec![
                    set("title", json!(req.title.trim())),
                    set("message", json!(req.message.trim())),
                    set("type", json!(req.kind)),
                    set("priority", json!(req.priority)),
                    set("authorId", json!(who.id)),
                    set("authorName", json!(who.name_or_default())),
                    set("authorEmail", json!(who.email)),
                    set("isActive", json!(true)),
                    set("viewCount", json!(0)),
                    server_timestamp("createdAt"),
                ],
            )
            .await?;
        Ok(doc.to_model()?)
    }

    /// All announcements, newest first (active and inactive alike).
    pub async fn list_announcements(&self) -> StudyhubResult<Vec<Announcement>> {
        let docs = self
            .store
            .get_docs(&Query::collection(ANNOUNCEMENTS).order_by("createdAt", Direction::Desc))
            .await?;
        Ok(docs
            .iter()
            .map(|d| d.to_model())
            .collect::<Result<_, _>>()?)
    }

    pub async fn set_announcement_active(&self, id: &str, active: bool) -> StudyhubResult<()> {
        self.store
            .update(ANNOUNCEMENTS, id, vec![set("isActive", json!(active))])
            .await?;
        Ok(())
    }

    pub async fn delete_announcement(&self, id: &str) -> StudyhubResult<()> {
        self.store.delete(ANNOUNCEMENTS, id).await?;
        Ok(())
    }

    pub async fn list_users(&self) -> StudyhubResult<Vec<UserProfile>> {
        let docs = self.store.get_docs(&Query::collection(USERS)).await?;
        Ok(docs
            .iter()
            .map(|d| d.to_model())
            .collect::<Result<_, _>>()?)
    }

    /// Create a profile document mirroring an auth-provider identity. The ID
    /// comes from the provider, hence the keyed write.
    pub async fn create_user_profile(
        &self,
        identity: &Identity,
        role: Role,
    ) -> StudyhubResult<UserProfile> {
        let doc = self
            .store
            .put(
                USERS,
                &identity.id,
                vec![
                    set("email", json!(identity.email)),
                    set("displayName", json!(identity.display_name)),
                    set("role", json!(role)),
                    set("status", json!("active")),
                    set("courses", json!([])),
                    server_timestamp("createdAt"),
                ],
            )
            .await?;
        Ok(doc.to_model()?)
    }

    /// Remove a user's profile document and their per-course enrollment
    /// records.
    ///
    /// The underlying auth identity is NOT revoked here; that requires a
    /// server-side call against the auth provider, which this client cannot
    /// make.
    pub async fn delete_user(&self, user_id: &str) -> StudyhubResult<()> {
        self.store.delete(USERS, user_id).await?;

        let courses = self.store.get_docs(&Query::collection(COURSES)).await?;
        for course in courses {
            let enrollments = self
                .store
                .get_docs(
                    &Query::collection(course_enrollments(&course.id))
                        .filter_eq("userId", json!(user_id)),
                )
                .await?;
            for enrollment in enrollments {
                self.store
                    .delete(&course_enrollments(&course.id), &enrollment.id)
                    .await?;
            }
        }

        info!(user_id, "user profile removed; auth identity untouched");
        Ok(())
    }

    pub async fn dashboard_stats(&self) -> StudyhubResult<DashboardStats> {
        let total_courses = self.store.count(&Query::collection(COURSES)).await?;
        let total_users = self.store.count(&Query::collection(USERS)).await?;
        let active_announcements = self
            .store
            .count(&Query::collection(ANNOUNCEMENTS).filter_eq("isActive", json!(true)))
            .await?;
        let pending_requests = self
            .store
            .count(&Query::collection(JOIN_REQUESTS).filter_eq("status", json!("pending")))
            .await?;

        Ok(DashboardStats {
            total_courses,
            total_users,
            active_announcements,
            pending_requests,
        })
    }
}
