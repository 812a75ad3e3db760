//! Merge request listing, bug claims, reviews and comments.

use std::sync::Arc;

use chrono::Utc;

use crate::api::DataSource;
use crate::error::AppError;
use crate::models::comment::{Comment, CommentResult, NewComment};
use crate::models::merge_request::{
    BugReward, ClaimResult, MergeRequest, MergeRequestFilters, ReviewResult, ReviewSubmission,
    Severity,
};
use crate::models::user::ReviewBadge;
use crate::models::Page;
use crate::store::FixtureStore;

/// Service for the review workflow.
#[derive(Clone)]
pub struct MergeRequestService {
    source: Arc<dyn DataSource>,
    store: FixtureStore,
}

impl MergeRequestService {
    pub fn new(source: Arc<dyn DataSource>, store: FixtureStore) -> Self {
        Self { source, store }
    }

    /// List merge requests matching `filters`.
    ///
    /// Status and project match exactly; the search text matches title or
    /// id case-insensitively. There is no pagination.
    pub async fn get_merge_requests(
        &self,
        filters: &MergeRequestFilters,
    ) -> Result<Page<MergeRequest>, AppError> {
        let page = self
            .source
            .get_merge_requests(filters)
            .await
            .inspect_err(|e| log::error!("[merge_requests] Failed to get merge requests: {}", e))?
            .into_data();

        if !page.items.is_empty() {
            self.store.upsert_merge_requests(page.items).await;
        }

        let matching = self
            .store
            .merge_requests()
            .await
            .into_iter()
            .filter(|mr| filters.matches(mr))
            .collect();
        Ok(Page::new(matching))
    }

    pub async fn get_merge_request_by_id(&self, id: &str) -> Result<MergeRequest, AppError> {
        let remote = self
            .source
            .get_merge_request_by_id(id)
            .await
            .inspect_err(|e| {
                log::error!("[merge_requests] Failed to get merge request {}: {}", id, e)
            })?
            .into_data();

        if let Some(mr) = remote {
            self.store.upsert_merge_requests(vec![mr.clone()]).await;
            return Ok(mr);
        }

        self.store
            .merge_request(id)
            .await
            .ok_or_else(|| AppError::not_found_with_id("MergeRequest", id))
    }

    /// Claim a bug for the current reviewer.
    ///
    /// Fails with `NotFound` for an unknown merge request or bug and with
    /// `AlreadyClaimed` when the bug was claimed before; neither touches
    /// state. A successful claim flips the bug exactly once.
    pub async fn claim_bug(&self, mr_id: &str, bug_id: &str) -> Result<ClaimResult, AppError> {
        self.try_claim_bug(mr_id, bug_id).await.inspect_err(|e| {
            log::error!(
                "[merge_requests] Failed to claim bug {} in merge request {}: {}",
                bug_id,
                mr_id,
                e
            )
        })
    }

    async fn try_claim_bug(&self, mr_id: &str, bug_id: &str) -> Result<ClaimResult, AppError> {
        let mr = self.get_merge_request_by_id(mr_id).await?;
        let (_, bug) = mr
            .find_bug(bug_id)
            .ok_or_else(|| AppError::not_found_with_id("Bug", bug_id))?;
        if bug.claimed {
            return Err(AppError::already_claimed(bug_id));
        }

        self.source.claim_bug(mr_id, bug_id).await?;

        let claimed = self.store.claim_bug(mr_id, bug_id).await?;
        let tier = claimed.reward_tier();
        log::info!(
            "[merge_requests] Claimed {} in {} (+{} points, +{} xp)",
            claimed.id,
            mr_id,
            claimed.points,
            tier.xp
        );

        Ok(ClaimResult {
            success: true,
            bug_id: claimed.id,
            description: claimed.description,
            points: claimed.points,
            xp: tier.xp,
            severity: claimed.severity,
        })
    }

    /// Submit a review and mark the merge request as reviewed.
    pub async fn submit_review(
        &self,
        mr_id: &str,
        review: &ReviewSubmission,
    ) -> Result<ReviewResult, AppError> {
        self.try_submit_review(mr_id, review).await.inspect_err(|e| {
            log::error!(
                "[merge_requests] Failed to submit review for merge request {}: {}",
                mr_id,
                e
            )
        })
    }

    async fn try_submit_review(
        &self,
        mr_id: &str,
        review: &ReviewSubmission,
    ) -> Result<ReviewResult, AppError> {
        self.get_merge_request_by_id(mr_id).await?;
        let ack = self.source.submit_review(mr_id, review).await?.into_data();
        self.store.mark_reviewed(mr_id).await?;

        Ok(ReviewResult {
            success: true,
            review_id: ack.review_id,
            message: "Review submitted successfully".to_string(),
        })
    }

    /// Append a comment authored by the current user.
    pub async fn add_comment(
        &self,
        mr_id: &str,
        comment: &NewComment,
    ) -> Result<CommentResult, AppError> {
        self.try_add_comment(mr_id, comment).await.inspect_err(|e| {
            log::error!(
                "[merge_requests] Failed to add comment to merge request {}: {}",
                mr_id,
                e
            )
        })
    }

    async fn try_add_comment(
        &self,
        mr_id: &str,
        comment: &NewComment,
    ) -> Result<CommentResult, AppError> {
        self.get_merge_request_by_id(mr_id).await?;
        let ack = self.source.add_comment(mr_id, comment).await?.into_data();

        let author = self.store.current_user().await;
        let created = Comment {
            id: ack.comment_id,
            author: author.name,
            author_avatar: author.avatar,
            content: comment.content.clone(),
            created_at: Utc::now(),
            file_id: comment.file_id.clone(),
            line_number: comment.line_number,
        };
        self.store.push_comment(mr_id, created.clone()).await?;

        Ok(CommentResult {
            success: true,
            comment: created,
        })
    }

    /// The severity → reward table.
    pub fn get_bug_rewards(&self) -> Vec<(Severity, BugReward)> {
        [Severity::Low, Severity::Medium, Severity::High]
            .into_iter()
            .map(|severity| (severity, BugReward::for_severity(severity)))
            .collect()
    }

    pub async fn get_review_badges(&self) -> Vec<ReviewBadge> {
        self.store.review_badges().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDataSource;
    use crate::models::merge_request::MergeRequestStatus;

    fn service() -> MergeRequestService {
        MergeRequestService::new(
            Arc::new(MockDataSource::new()),
            FixtureStore::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_list_filters() {
        let service = service();
        let all = service
            .get_merge_requests(&MergeRequestFilters::default())
            .await
            .unwrap();
        assert_eq!(all.total, 3);

        let open = service
            .get_merge_requests(&MergeRequestFilters {
                status: Some(MergeRequestStatus::Open),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(open.total, 2);

        let by_id = service
            .get_merge_requests(&MergeRequestFilters {
                search: Some("1412".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_id.data.len(), 1);
        assert_eq!(by_id.data[0].id, "MR-1412");
    }

    #[tokio::test]
    async fn test_get_unknown_merge_request() {
        let err = service().get_merge_request_by_id("MR-9999").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_claim_bug_once() {
        let service = service();
        let result = service.claim_bug("MR-1423", "bug-1").await.unwrap();
        assert!(result.success);
        assert_eq!(result.points, 20);
        assert_eq!(result.xp, 15);
        assert_eq!(result.severity, Severity::Medium);

        let err = service.claim_bug("MR-1423", "bug-1").await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyClaimed { .. }));

        let mr = service.get_merge_request_by_id("MR-1423").await.unwrap();
        assert_eq!(mr.bug_counts(), (1, 4));
    }

    #[tokio::test]
    async fn test_claim_uses_bug_points_not_tier() {
        // bug-3 is low severity but worth 5 points of its own.
        let result = service().claim_bug("MR-1423", "bug-3").await.unwrap();
        assert_eq!(result.points, 5);
        assert_eq!(result.xp, 5);
    }

    #[tokio::test]
    async fn test_claim_unknown_bug() {
        let err = service().claim_bug("MR-1423", "bug-5").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_submit_review_marks_reviewed() {
        let service = service();
        let result = service
            .submit_review("MR-1419", &ReviewSubmission::completed())
            .await
            .unwrap();
        assert!(result.review_id.starts_with("rev-"));
        assert!(service.get_merge_request_by_id("MR-1419").await.unwrap().reviews_completed);
    }

    #[tokio::test]
    async fn test_add_comment() {
        let service = service();
        let result = service
            .add_comment(
                "MR-1423",
                &NewComment {
                    content: "Consider a constant-time compare here".to_string(),
                    file_id: Some("cc-1".to_string()),
                    line_number: Some(32),
                },
            )
            .await
            .unwrap();
        assert_eq!(result.comment.author, "DragonSlayer");
        assert!(result.comment.id.starts_with("com-"));
        assert!(result.comment.is_inline());

        let mr = service.get_merge_request_by_id("MR-1423").await.unwrap();
        assert_eq!(mr.comments.last().unwrap().id, result.comment.id);
    }

    #[tokio::test]
    async fn test_empty_comment_is_appended() {
        let service = service();
        let result = service
            .add_comment("MR-1423", &NewComment::default())
            .await
            .unwrap();
        assert!(result.comment.content.is_empty());

        let mr = service.get_merge_request_by_id("MR-1423").await.unwrap();
        assert_eq!(mr.comments.len(), 2);
    }

    #[tokio::test]
    async fn test_comment_on_unknown_merge_request() {
        let err = service()
            .add_comment("MR-404", &NewComment::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_bug_reward_table() {
        let table = service().get_bug_rewards();
        assert_eq!(table.len(), 3);
        assert_eq!(table[2].1.points, 30);
    }
}
