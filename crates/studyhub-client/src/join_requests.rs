//! Join-request workflow: request, approve, reject.
//!
//! A request moves `pending → approved` or `pending → rejected`, both
//! terminal. Approval needs two sequential writes on two documents with no
//! transaction across them; the partial-failure case is surfaced as an
//! [`ApprovalIncomplete`](StudyhubError::ApprovalIncomplete) error plus a
//! reconciliation task rather than being silently dropped.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use studyhub_common::collections::{COURSES, JOIN_REQUESTS};
use studyhub_common::error::{StudyhubError, StudyhubResult};
use studyhub_common::models::{Course, Identity, JoinRequest, RequestStatus};
use studyhub_store::{
    array_union, increment, server_timestamp, set, Query, DocumentStore, Subscription,
};

use crate::reconcile::{ReconcileTask, ReconciliationQueue};

pub struct JoinRequestService {
    store: Arc<dyn DocumentStore>,
    reconcile: ReconciliationQueue,
}

impl JoinRequestService {
    pub fn new(store: Arc<dyn DocumentStore>, reconcile: ReconciliationQueue) -> Self {
        Self { store, reconcile }
    }

    /// Ask to join a course. Creates a pending request for an admin to act on.
    ///
    /// The duplicate check is check-then-create: two concurrent submissions
    /// can both pass the query and leave two pending requests behind. That
    /// window is accepted; approval of either request is idempotent on the
    /// membership array. Capacity is not checked here; the admin decides at
    /// approval time.
    pub async fn request_join(
        &self,
        course: &Course,
        who: &Identity,
    ) -> StudyhubResult<JoinRequest> {
        if course.is_member(&who.id) {
            return Err(StudyhubError::AlreadyMember);
        }

        let existing = self
            .store
            .get_docs(
                &Query::collection(JOIN_REQUESTS)
                    .filter_eq("userId", json!(who.id))
                    .filter_eq("courseId", json!(course.id))
                    .filter_eq("status", json!(RequestStatus::Pending.as_str())),
            )
            .await?;
        if !existing.is_empty() {
            return Err(StudyhubError::RequestPending);
        }

        let doc = self
            .store
            .create(
                JOIN_REQUESTS,
                vec![
                    set("userId", json!(who.id)),
                    set("userEmail", json!(who.email)),
                    set("userName", json!(who.name_or_default())),
                    set("courseId", json!(course.id)),
                    set("courseName", json!(course.name)),
                    set("status", json!(RequestStatus::Pending.as_str())),
                    server_timestamp("createdAt"),
                ],
            )
            .await?;

        Ok(doc.to_model()?)
    }

    /// Approve a pending request: grant membership on the course, then mark
    /// the request approved.
    ///
    /// Two sequential writes. The membership grant uses array-union (safe to
    /// repeat) and an enrollment-counter increment (not safe to repeat). If
    /// the grant lands but the status write fails, the user is enrolled while
    /// the request still shows pending; the error carries the request ID and
    /// a [`ReconcileTask::FinishApproval`] is queued so only the status write
    /// is retried.
    pub async fn approve(&self, request: &JoinRequest) -> StudyhubResult<()> {
        self.store
            .update(
                COURSES,
                &request.course_id,
                vec![
                    array_union("members", json!(request.user_id)),
                    increment("enrolledCount", 1),
                ],
            )
            .await?;

        if let Err(err) = self.mark_approved(request).await {
            warn!(
                request_id = %request.id,
                course_id = %request.course_id,
                error = %err,
                "membership granted but request is still pending"
            );
            self.reconcile.push(ReconcileTask::FinishApproval {
                request_id: request.id.clone(),
            });
            return Err(StudyhubError::ApprovalIncomplete {
                request_id: request.id.clone(),
            });
        }

        Ok(())
    }

    /// Retry the status write of a partially-approved request. Does not touch
    /// the course document, so the enrollment counter is never double-counted.
    pub async fn finish_approval(&self, request: &JoinRequest) -> StudyhubResult<()> {
        self.mark_approved(request).await?;
        self.reconcile.resolve(&request.id);
        Ok(())
    }

    /// Reject a pending request. A plain field set with no transition check,
    /// so repeating it is harmless.
    pub async fn reject(&self, request: &JoinRequest) -> StudyhubResult<()> {
        self.store
            .update(
                JOIN_REQUESTS,
                &request.id,
                vec![
                    set("status", json!(RequestStatus::Rejected.as_str())),
                    server_timestamp("rejectedAt"),
                ],
            )
            .await?;
        Ok(())
    }

    /// Live feed of pending requests for the admin screen, newest first.
    pub fn pending_requests(&self) -> StudyhubResult<RequestFeed> {
        let sub = self.store.subscribe(Query::collection(JOIN_REQUESTS))?;
        Ok(RequestFeed { sub })
    }

    /// Live feed of one user's own pending requests, driving the
    /// join-button state on the browse screen.
    pub fn pending_for_user(&self, who: &Identity) -> StudyhubResult<RequestFeed> {
        let sub = self.store.subscribe(
            Query::collection(JOIN_REQUESTS)
                .filter_eq("userId", json!(who.id))
                .filter_eq("status", json!(RequestStatus::Pending.as_str())),
        )?;
        Ok(RequestFeed { sub })
    }

    pub async fn fetch(&self, request_id: &str) -> StudyhubResult<JoinRequest> {
        let doc = self
            .store
            .get(JOIN_REQUESTS, request_id)
            .await?
            .ok_or_else(|| StudyhubError::NotFound {
                resource: "Join request".into(),
            })?;
        Ok(doc.to_model()?)
    }

    async fn mark_approved(&self, request: &JoinRequest) -> StudyhubResult<()> {
        self.store
            .update(
                JOIN_REQUESTS,
                &request.id,
                vec![
                    set("status", json!(RequestStatus::Approved.as_str())),
                    server_timestamp("approvedAt"),
                ],
            )
            .await?;
        Ok(())
    }
}

/// Typed view over a join-request subscription. Each snapshot is filtered to
/// pending requests and sorted newest first.
pub struct RequestFeed {
    sub: Subscription,
}

impl RequestFeed {
    pub async fn next(&mut self) -> Option<StudyhubResult<Vec<JoinRequest>>> {
        let snapshot = self.sub.next().await?;
        Some(
            snapshot
                .to_models::<JoinRequest>()
                .map(pending_newest_first)
                .map_err(StudyhubError::from),
        )
    }
}

fn pending_newest_first(mut requests: Vec<JoinRequest>) -> Vec<JoinRequest> {
    requests.retain(JoinRequest::is_pending);
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    requests
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn request(id: &str, status: RequestStatus, age_minutes: i64) -> JoinRequest {
        JoinRequest {
            id: id.into(),
            user_id: "u1".into(),
            user_email: String::new(),
            user_name: String::new(),
            course_id: "c1".into(),
            course_name: String::new(),
            status,
            created_at: Some(Utc::now() - Duration::minutes(age_minutes)),
            approved_at: None,
            rejected_at: None,
        }
    }

    #[test]
    fn feed_filters_to_pending_and_sorts_newest_first() {
        let requests = vec![
            request("old", RequestStatus::Pending, 60),
            request("done", RequestStatus::Approved, 5),
            request("new", RequestStatus::Pending, 1),
        ];
        let view = pending_newest_first(requests);
        let ids: Vec<&str> = view.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["new", "old"]);
    }
}
