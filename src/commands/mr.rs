//! Merge request commands: browse diffs, claim bugs, review and comment.

use clap::Subcommand;
use serde::Serialize;

use codequest_rewards::models::diff::{DiffLine, DiffLineKind};
use codequest_rewards::models::merge_request::{
    BugReward, MergeRequest, MergeRequestFilters, ReviewSubmission, Severity,
};
use codequest_rewards::models::user::ReviewBadge;
use codequest_rewards::models::NewComment;
use codequest_rewards::pages::ReviewPage;
use codequest_rewards::{AppError, Services};

use super::{check_notice, Output};

#[derive(Subcommand)]
pub enum MrAction {
    /// List merge requests.
    List {
        /// open, merged or closed.
        #[arg(long)]
        status: Option<String>,

        /// Exact project name.
        #[arg(long)]
        project: Option<String>,

        /// Substring of the title or ID.
        #[arg(long)]
        search: Option<String>,
    },

    /// Show a merge request with the diff of one file.
    Show {
        /// Merge request ID, e.g. MR-1423.
        id: String,

        /// Code change ID to open (defaults to the first file).
        #[arg(long)]
        file: Option<String>,
    },

    /// Claim a bug and collect its reward.
    Claim { mr_id: String, bug_id: String },

    /// Mark a review as completed.
    Review { mr_id: String },

    /// Add a comment, optionally inline on a file line.
    Comment {
        mr_id: String,
        content: String,

        #[arg(long)]
        file: Option<String>,

        #[arg(long, requires = "file")]
        line: Option<u32>,
    },

    /// Reward tiers per severity and the review badges.
    Tiers,
}

pub async fn run(action: MrAction, services: &Services, out: &Output) -> Result<(), AppError> {
    match action {
        MrAction::List {
            status,
            project,
            search,
        } => {
            let filters = MergeRequestFilters {
                status: status.as_deref().map(str::parse).transpose()?,
                project,
                search,
            };
            list(services, &filters, out).await
        }
        MrAction::Show { id, file } => show(services, &id, file.as_deref(), out).await,
        MrAction::Claim { mr_id, bug_id } => {
            let result = services.merge_requests.claim_bug(&mr_id, &bug_id).await?;
            out.emit(&result, |r| {
                format!(
                    "🎉 Bug claimed! {}\n+{} points  +{} XP  ({} severity)",
                    r.description, r.points, r.xp, r.severity
                )
            })
        }
        MrAction::Review { mr_id } => {
            let result = services
                .merge_requests
                .submit_review(&mr_id, &ReviewSubmission::completed())
                .await?;
            out.emit(&result, |r| format!("{} ({})", r.message, r.review_id))
        }
        MrAction::Comment {
            mr_id,
            content,
            file,
            line,
        } => {
            let comment = NewComment {
                content: comment_text(content)?,
                file_id: file,
                line_number: line,
            };
            let result = services.merge_requests.add_comment(&mr_id, &comment).await?;
            out.emit(&result, |r| {
                format!("Comment {} added by {}", r.comment.id, r.comment.author)
            })
        }
        MrAction::Tiers => tiers(services, out).await,
    }
}

async fn list(
    services: &Services,
    filters: &MergeRequestFilters,
    out: &Output,
) -> Result<(), AppError> {
    let page = services.merge_requests.get_merge_requests(filters).await?;
    out.emit(&page, |page| {
        let mut text = format!("{} merge request(s)\n", page.total);
        for mr in &page.data {
            let (claimed, total) = mr.bug_counts();
            text.push_str(&format!(
                "  {:<8} [{:<6}] {} ({}, by {}) bugs {}/{}\n",
                mr.id, mr.status.to_string(), mr.title, mr.project_name, mr.author, claimed, total
            ));
        }
        text
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MergeRequestView<'a> {
    merge_request: &'a MergeRequest,
    active_file: Option<&'a str>,
    diff: Vec<DiffLine>,
    bugs_claimed: usize,
    bugs_total: usize,
}

async fn show(
    services: &Services,
    id: &str,
    file: Option<&str>,
    out: &Output,
) -> Result<(), AppError> {
    let mut page = ReviewPage::new(services.clone());
    page.load().await;
    check_notice(page.notice.as_ref())?;

    if !page.select_merge_request(id) {
        return Err(AppError::not_found_with_id("MergeRequest", id));
    }
    if let Some(file) = file {
        if !page.select_file(file) {
            return Err(AppError::not_found_with_id("CodeChange", file));
        }
    }

    let Some(selected) = page.selected.as_ref() else {
        return Err(AppError::not_found_with_id("MergeRequest", id));
    };
    let (bugs_claimed, bugs_total) = page.bug_counts();
    let view = MergeRequestView {
        merge_request: selected,
        active_file: page.active_change().map(|c| c.filename.as_str()),
        diff: page.active_diff_lines(),
        bugs_claimed,
        bugs_total,
    };

    out.emit(&view, |view| {
        let mr = view.merge_request;
        let mut text = format!(
            "{} {}\n{} {} in {} [{}]\nBugs found: {}/{}\n\n{}\n",
            mr.id,
            mr.title,
            mr.author_avatar,
            mr.author,
            mr.project_name,
            mr.status,
            view.bugs_claimed,
            view.bugs_total,
            mr.description
        );
        text.push_str("\nFiles\n");
        for change in &mr.code_changes {
            let open = if Some(change.filename.as_str()) == view.active_file {
                ">"
            } else {
                " "
            };
            text.push_str(&format!(
                "{} {:<6} {} +{} -{}\n",
                open, change.id, change.filename, change.additions, change.deletions
            ));
        }
        text.push('\n');
        for line in &view.diff {
            let marker = match line.kind {
                DiffLineKind::ChunkHeader => "@",
                _ => " ",
            };
            text.push_str(&format!("{}{:>4} {}", marker, line.number, line.content));
            for bug in page.bugs_on_line(line.number) {
                let state = if bug.claimed { "claimed" } else { "unclaimed" };
                text.push_str(&format!("   🐛 {} [{}, {}]", bug.id, bug.severity, state));
            }
            text.push('\n');
        }
        if !mr.comments.is_empty() {
            text.push_str("\nComments\n");
            for comment in &mr.comments {
                let anchor = match (&comment.file_id, comment.line_number) {
                    (Some(file), Some(line)) => format!(" ({}:{})", file, line),
                    (Some(file), None) => format!(" ({})", file),
                    _ => String::new(),
                };
                text.push_str(&format!("  {}{}: {}\n", comment.author, anchor, comment.content));
            }
        }
        text
    })
}

#[derive(Serialize)]
struct TierView {
    severity: Severity,
    #[serde(flatten)]
    reward: BugReward,
}

#[derive(Serialize)]
struct TiersView {
    tiers: Vec<TierView>,
    badges: Vec<ReviewBadge>,
}

async fn tiers(services: &Services, out: &Output) -> Result<(), AppError> {
    let view = TiersView {
        tiers: services
            .merge_requests
            .get_bug_rewards()
            .into_iter()
            .map(|(severity, reward)| TierView { severity, reward })
            .collect(),
        badges: services.merge_requests.get_review_badges().await,
    };
    out.emit(&view, |view| {
        let mut text = String::from("Bug rewards\n");
        for tier in &view.tiers {
            text.push_str(&format!(
                "  {:<7} {:>3} pts {:>3} XP  {}\n",
                tier.severity.to_string(), tier.reward.points, tier.reward.xp, tier.reward.description
            ));
        }
        text.push_str("\nReview badges\n");
        for badge in &view.badges {
            text.push_str(&format!(
                "  {} {} - {} ({})\n",
                badge.icon, badge.name, badge.description, badge.requirement
            ));
        }
        text
    })
}

/// The comment box refuses to post blank text.
fn comment_text(content: String) -> Result<String, AppError> {
    if content.trim().is_empty() {
        return Err(AppError::invalid_input_field(
            "Comment content is required",
            "content",
        ));
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_comment_text_rejected() {
        assert!(matches!(
            comment_text("  \n".to_string()),
            Err(AppError::InvalidInput { .. })
        ));
        assert_eq!(comment_text("LGTM".to_string()).unwrap(), "LGTM");
    }
}
