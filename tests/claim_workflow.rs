//! Bug claim and review workflow tests.
//!
//! These run the services and the review page against the mock data source
//! and verify the claim lifecycle end to end:
//! 1. A claim awards the bug's points and the severity tier's XP
//! 2. A bug can be claimed exactly once
//! 3. Failed claims leave state untouched
//! 4. Reviews and comments are recorded on the merge request

use codequest_rewards::models::merge_request::{ReviewSubmission, Severity};
use codequest_rewards::models::NewComment;
use codequest_rewards::pages::ReviewPage;
use codequest_rewards::{AppError, Services};

#[tokio::test]
async fn test_claim_awards_points_and_xp() {
    let services = Services::mock().unwrap();

    let result = services
        .merge_requests
        .claim_bug("MR-1423", "bug-1")
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.bug_id, "bug-1");
    assert_eq!(result.points, 20);
    assert_eq!(result.xp, 15);
    assert_eq!(result.severity, Severity::Medium);

    let mr = services
        .merge_requests
        .get_merge_request_by_id("MR-1423")
        .await
        .unwrap();
    let (_, bug) = mr.find_bug("bug-1").unwrap();
    assert!(bug.claimed);
    assert_eq!(mr.bug_counts(), (1, 4));
}

#[tokio::test]
async fn test_bug_points_override_tier_baseline() {
    let services = Services::mock().unwrap();

    // bug-3 is a low severity bug worth 5 points; XP still follows the tier.
    let result = services
        .merge_requests
        .claim_bug("MR-1423", "bug-3")
        .await
        .unwrap();
    assert_eq!(result.points, 5);
    assert_eq!(result.xp, 5);
}

#[tokio::test]
async fn test_second_claim_is_rejected() {
    let services = Services::mock().unwrap();
    services
        .merge_requests
        .claim_bug("MR-1423", "bug-1")
        .await
        .unwrap();

    let err = services
        .merge_requests
        .claim_bug("MR-1423", "bug-1")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AlreadyClaimed { ref bug_id } if bug_id == "bug-1"));

    let mr = services
        .merge_requests
        .get_merge_request_by_id("MR-1423")
        .await
        .unwrap();
    assert_eq!(mr.bug_counts(), (1, 4));
}

#[tokio::test]
async fn test_unknown_ids_fail_without_side_effects() {
    let services = Services::mock().unwrap();

    let err = services
        .merge_requests
        .claim_bug("MR-9999", "bug-1")
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    // bug-5 belongs to MR-1419, not MR-1423.
    let err = services
        .merge_requests
        .claim_bug("MR-1423", "bug-5")
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let mr = services
        .merge_requests
        .get_merge_request_by_id("MR-1419")
        .await
        .unwrap();
    assert_eq!(mr.bug_counts(), (0, 3));
}

#[tokio::test]
async fn test_claims_are_shared_between_service_clones() {
    let services = Services::mock().unwrap();
    let other = services.clone();

    services
        .merge_requests
        .claim_bug("MR-1419", "bug-6")
        .await
        .unwrap();

    let err = other
        .merge_requests
        .claim_bug("MR-1419", "bug-6")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AlreadyClaimed { .. }));
}

#[tokio::test]
async fn test_review_page_session() {
    let mut page = ReviewPage::new(Services::mock().unwrap());
    page.load().await;
    assert_eq!(page.selected.as_ref().map(|mr| mr.id.as_str()), Some("MR-1423"));

    // bug-1 sits on diff lines 32 and 38 of the first file.
    assert_eq!(page.bugs_on_line(32).len(), 1);
    assert!(page.bugs_on_line(33).is_empty());

    assert!(page.claim_bug("bug-1").await);
    assert!(page.claim_bug("bug-4").await);
    assert!(!page.claim_bug("bug-1").await);
    assert!(!page.claim_bug("bug-404").await);

    assert_eq!(page.session.bugs_found, 2);
    assert_eq!(page.session.points_earned, 50);
    assert_eq!(page.bug_counts(), (2, 4));
    assert_eq!(page.reward_modal.as_ref().map(|r| r.bug_id.as_str()), Some("bug-4"));

    page.close_reward_modal();
    assert!(page.reward_modal.is_none());

    page.complete_review().await;
    assert_eq!(page.session.reviews_completed, 1);
    assert!(page.notice.as_ref().is_some_and(|n| !n.is_error()));
}

#[tokio::test]
async fn test_review_and_comment_are_recorded() {
    let services = Services::mock().unwrap();

    let review = services
        .merge_requests
        .submit_review("MR-1419", &ReviewSubmission::completed())
        .await
        .unwrap();
    assert!(review.success);
    assert!(!review.review_id.is_empty());

    let comment = NewComment {
        content: "This retry loop never backs off".to_string(),
        file_id: Some("cc-3".to_string()),
        line_number: Some(66),
    };
    let result = services
        .merge_requests
        .add_comment("MR-1419", &comment)
        .await
        .unwrap();
    assert!(result.comment.is_inline());
    assert_eq!(result.comment.author, "DragonSlayer");

    let mr = services
        .merge_requests
        .get_merge_request_by_id("MR-1419")
        .await
        .unwrap();
    assert!(mr.reviews_completed);
    assert_eq!(mr.comments.len(), 2);
    assert_eq!(mr.comments.last().unwrap().id, result.comment.id);
}

#[tokio::test]
async fn test_comment_needs_only_an_existing_merge_request() {
    let services = Services::mock().unwrap();
    let blank = NewComment {
        content: "   ".to_string(),
        ..NewComment::default()
    };

    let err = services
        .merge_requests
        .add_comment("MR-404", &blank)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let result = services
        .merge_requests
        .add_comment("MR-1423", &blank)
        .await
        .unwrap();
    assert!(result.success);
    assert!(!result.comment.is_inline());
}
