//! Profile stats: courses joined and messages sent.
//!
//! The aggregation fans out one count query per joined course, so it races a
//! fixed timeout and falls back to zero-valued stats instead of blocking the
//! profile screen on a slow backend.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::warn;

use studyhub_common::collections::{course_messages, COURSES};
use studyhub_common::config;
use studyhub_common::error::StudyhubResult;
use studyhub_common::models::Identity;
use studyhub_store::{DocumentStore, Query};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfileStats {
    pub courses_joined: u64,
    pub messages_sent: u64,
}

pub struct ProfileService {
    store: Arc<dyn DocumentStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Aggregate the user's stats, racing the configured timeout. Timeouts
    /// and aggregation failures both degrade to zeroes; the profile screen
    /// treats stats as decoration, not truth.
    pub async fn stats(&self, who: &Identity) -> ProfileStats {
        let timeout = Duration::from_secs(config::get().limits.stats_timeout_secs);
        match tokio::time::timeout(timeout, self.collect(who)).await {
            Ok(Ok(stats)) => stats,
            Ok(Err(err)) => {
                warn!(user_id = %who.id, error = %err, "profile stats aggregation failed");
                ProfileStats::default()
            }
            Err(_) => {
                warn!(user_id = %who.id, "profile stats aggregation timed out");
                ProfileStats::default()
            }
        }
    }

    async fn collect(&self, who: &Identity) -> StudyhubResult<ProfileStats> {
        let courses = self
            .store
            .get_docs(&Query::collection(COURSES).filter_array_contains("members", json!(who.id)))
            .await?;

        let mut messages_sent = 0;
        for course in &courses {
            messages_sent += self
                .store
                .count(
                    &Query::collection(course_messages(&course.id))
                        .filter_eq("senderId", json!(who.id)),
                )
                .await?;
        }

        Ok(ProfileStats {
            courses_joined: courses.len() as u64,
            messages_sent,
        })
    }
}
