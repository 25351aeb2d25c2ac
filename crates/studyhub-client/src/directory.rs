//! Directory listings: course browsing, the member's own course and chat
//! lists, and active announcements.
//!
//! All of these are live-subscribed reads with client-side filtering and
//! sorting; the subscription's incremental diffing is the only caching.

use std::sync::Arc;

use serde_json::json;

use studyhub_common::collections::{ANNOUNCEMENTS, COURSES};
use studyhub_common::error::{StudyhubError, StudyhubResult};
use studyhub_common::models::{Announcement, Course, Identity, JoinRequest};
use studyhub_store::{array_remove, array_union, increment, DocumentStore, Query, Subscription};

/// Join-button state derived for one course on the browse screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinState {
    /// Already a member; tapping opens the chat
    Joined,
    /// Awaiting admin approval
    Pending,
    CanJoin,
}

pub struct DirectoryService {
    store: Arc<dyn DocumentStore>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Live feed of every course; the browse screen filters client-side via
    /// [`filter_browse`].
    pub fn browse(&self) -> StudyhubResult<CourseFeed> {
        let sub = self.store.subscribe(Query::collection(COURSES))?;
        Ok(CourseFeed { sub })
    }

    /// Live feed of the courses the user belongs to.
    pub fn my_courses(&self, who: &Identity) -> StudyhubResult<CourseFeed> {
        let sub = self.store.subscribe(
            Query::collection(COURSES).filter_array_contains("members", json!(who.id)),
        )?;
        Ok(CourseFeed { sub })
    }

    /// Live feed for the chats tab: the user's courses, pinned ones first,
    /// then most recent activity.
    pub fn chat_list(&self, who: &Identity) -> StudyhubResult<ChatListFeed> {
        let sub = self.store.subscribe(
            Query::collection(COURSES).filter_array_contains("members", json!(who.id)),
        )?;
        Ok(ChatListFeed {
            sub,
            user_id: who.id.clone(),
        })
    }

    /// Pin or unpin a course in the user's own chat list.
    pub async fn toggle_course_pin(&self, course: &Course, who: &Identity) -> StudyhubResult<()> {
        let op = if course.is_pinned_by(&who.id) {
            array_remove("pinnedBy", json!(who.id))
        } else {
            array_union("pinnedBy", json!(who.id))
        };
        self.store.update(COURSES, &course.id, vec![op]).await?;
        Ok(())
    }

    /// Leave a course: membership removal plus the matching counter delta,
    /// applied together so the stored counter tracks the array.
    pub async fn leave(&self, course: &Course, who: &Identity) -> StudyhubResult<()> {
        self.store
            .update(
                COURSES,
                &course.id,
                vec![
                    array_remove("members", json!(who.id)),
                    increment("enrolledCount", -1),
                ],
            )
            .await?;
        Ok(())
    }

    /// Live feed of active announcements, newest first.
    pub fn active_announcements(&self) -> StudyhubResult<AnnouncementFeed> {
        let sub = self
            .store
            .subscribe(Query::collection(ANNOUNCEMENTS).filter_eq("isActive", json!(true)))?;
        Ok(AnnouncementFeed { sub })
    }

    pub async fn fetch_course(&self, course_id: &str) -> StudyhubResult<Course> {
        let doc = self
            .store
            .get(COURSES, course_id)
            .await?
            .ok_or_else(|| StudyhubError::NotFound {
                resource: "Course".into(),
            })?;
        Ok(doc.to_model()?)
    }
}

/// Derive the join-button state for a course given the user's own pending
/// requests (from [`JoinRequestService::pending_for_user`]).
///
/// [`JoinRequestService::pending_for_user`]: crate::join_requests::JoinRequestService::pending_for_user
pub fn join_state(course: &Course, who: &Identity, pending: &[JoinRequest]) -> JoinState {
    if course.is_member(&who.id) {
        JoinState::Joined
    } else if pending.iter().any(|r| r.course_id == course.id) {
        JoinState::Pending
    } else {
        JoinState::CanJoin
    }
}

/// Browse-screen filter: active courses matching the search text and the
/// selected category chip (`None` = All).
pub fn filter_browse(courses: &[Course], search: &str, category: Option<&str>) -> Vec<Course> {
    let needle = search.to_lowercase();
    courses
        .iter()
        .filter(|c| c.is_active)
        .filter(|c| {
            needle.is_empty()
                || c.name.to_lowercase().contains(&needle)
                || c.description.to_lowercase().contains(&needle)
        })
        .filter(|c| category.is_none_or(|cat| c.category == cat))
        .cloned()
        .collect()
}

/// Typed view over a course subscription.
pub struct CourseFeed {
    sub: Subscription,
}

impl CourseFeed {
    pub async fn next(&mut self) -> Option<StudyhubResult<Vec<Course>>> {
        let snapshot = self.sub.next().await?;
        Some(snapshot.to_models().map_err(StudyhubError::from))
    }
}

/// Chats-tab view: pinned courses first, then most recent message activity.
pub struct ChatListFeed {
    sub: Subscription,
    user_id: String,
}

impl ChatListFeed {
    pub async fn next(&mut self) -> Option<StudyhubResult<Vec<Course>>> {
        let snapshot = self.sub.next().await?;
        Some(
            snapshot
                .to_models::<Course>()
                .map(|courses| chat_list_order(courses, &self.user_id))
                .map_err(StudyhubError::from),
        )
    }
}

fn chat_list_order(mut courses: Vec<Course>, user_id: &str) -> Vec<Course> {
    courses.sort_by(|a, b| {
        let pin = b.is_pinned_by(user_id).cmp(&a.is_pinned_by(user_id));
        pin.then_with(|| b.last_message_time.cmp(&a.last_message_time))
    });
    courses
}

/// Announcements view, newest first.
pub struct AnnouncementFeed {
    sub: Subscription,
}

impl AnnouncementFeed {
    pub async fn next(&mut self) -> Option<StudyhubResult<Vec<Announcement>>> {
        let snapshot = self.sub.next().await?;
        Some(
            snapshot
                .to_models::<Announcement>()
                .map(|mut items| {
                    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                    items
                })
                .map_err(StudyhubError::from),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use studyhub_common::models::RequestStatus;

    fn course(id: &str, name: &str, category: &str, active: bool) -> Course {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "description": format!("{name} study group"),
            "category": category,
            "members": ["creator"],
            "maxMembers": 50,
            "isActive": active,
            "createdBy": "creator",
        }))
        .unwrap()
    }

    #[test]
    fn browse_filter_honors_search_category_and_active_flag() {
        let courses = vec![
            course("c1", "Linear Algebra", "math", true),
            course("c2", "World History", "history", true),
            course("c3", "Hidden Algebra", "math", false),
        ];

        let hits = filter_browse(&courses, "algebra", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "c1");

        let hits = filter_browse(&courses, "", Some("history"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "c2");

        assert_eq!(filter_browse(&courses, "", None).len(), 2);
    }

    #[test]
    fn join_state_prefers_membership_over_pending() {
        let mut c = course("c1", "Algebra", "math", true);
        let who = Identity::new("u1", "u1@example.com", "U1");
        let pending = vec![JoinRequest {
            id: "r1".into(),
            user_id: "u1".into(),
            user_email: String::new(),
            user_name: String::new(),
            course_id: "c1".into(),
            course_name: String::new(),
            status: RequestStatus::Pending,
            created_at: None,
            approved_at: None,
            rejected_at: None,
        }];

        assert_eq!(join_state(&c, &who, &pending), JoinState::Pending);
        c.members.push("u1".into());
        assert_eq!(join_state(&c, &who, &pending), JoinState::Joined);
        c.members.pop();
        assert_eq!(join_state(&c, &who, &[]), JoinState::CanJoin);
    }

    #[test]
    fn chat_list_sorts_pinned_then_recent() {
        let now = Utc::now();
        let mut quiet = course("quiet", "Quiet", "math", true);
        quiet.last_message_time = Some(now - Duration::hours(3));
        let mut busy = course("busy", "Busy", "math", true);
        busy.last_message_time = Some(now);
        let mut pinned = course("pinned", "Pinned", "math", true);
        pinned.last_message_time = Some(now - Duration::days(2));
        pinned.pinned_by = vec!["u1".into()];

        let ordered = chat_list_order(vec![quiet, busy, pinned], "u1");
        let ids: Vec<&str> = ordered.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["pinned", "busy", "quiet"]);
    }
}
