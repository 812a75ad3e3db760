//! Merge request review: browse diffs, claim bugs, complete reviews.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::diff::{format_diff_lines, DiffLine};
use crate::models::merge_request::{
    Bug, ClaimResult, CodeChange, MergeRequest, MergeRequestFilters, ReviewSubmission,
};
use crate::services::Services;

use super::Notice;

/// Running totals for this review session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub bugs_found: u32,
    pub points_earned: i64,
    pub reviews_completed: u32,
}

pub struct ReviewPage {
    services: Services,
    pub merge_requests: Vec<MergeRequest>,
    pub selected: Option<MergeRequest>,
    /// Code change id of the open diff.
    pub active_diff: Option<String>,
    /// Bugs of the selected merge request keyed by id.
    pub bugs: BTreeMap<String, Bug>,
    /// Set while the reward modal is open.
    pub reward_modal: Option<ClaimResult>,
    pub session: SessionStats,
    pub loading: bool,
    pub notice: Option<Notice>,
}

impl ReviewPage {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            merge_requests: Vec::new(),
            selected: None,
            active_diff: None,
            bugs: BTreeMap::new(),
            reward_modal: None,
            session: SessionStats::default(),
            loading: false,
            notice: None,
        }
    }

    /// Fetch the merge requests and select the first one.
    pub async fn load(&mut self) {
        self.loading = true;
        let result = self
            .services
            .merge_requests
            .get_merge_requests(&MergeRequestFilters::default())
            .await;
        self.loading = false;

        match result {
            Ok(page) => {
                self.merge_requests = page.data;
                if self.selected.is_none() {
                    if let Some(first) = self.merge_requests.first().cloned() {
                        self.select(first);
                    }
                }
            }
            Err(e) => self.notice = Some(Notice::failed("Failed to load merge requests", &e)),
        }
    }

    /// Select a loaded merge request by id. Returns false for unknown ids.
    pub fn select_merge_request(&mut self, id: &str) -> bool {
        match self.merge_requests.iter().find(|mr| mr.id == id).cloned() {
            Some(mr) => {
                self.select(mr);
                true
            }
            None => false,
        }
    }

    fn select(&mut self, mr: MergeRequest) {
        self.active_diff = mr.code_changes.first().map(|c| c.id.clone());
        self.bugs = mr
            .code_changes
            .iter()
            .flat_map(|change| change.bugs.iter())
            .map(|bug| (bug.id.clone(), bug.clone()))
            .collect();
        self.selected = Some(mr);
    }

    pub fn select_file(&mut self, change_id: &str) -> bool {
        let known = self
            .selected
            .as_ref()
            .is_some_and(|mr| mr.code_changes.iter().any(|c| c.id == change_id));
        if known {
            self.active_diff = Some(change_id.to_string());
        }
        known
    }

    pub fn active_change(&self) -> Option<&CodeChange> {
        let id = self.active_diff.as_deref()?;
        self.selected
            .as_ref()?
            .code_changes
            .iter()
            .find(|c| c.id == id)
    }

    /// Numbered, typed lines of the open diff.
    pub fn active_diff_lines(&self) -> Vec<DiffLine> {
        self.active_change()
            .map(|change| format_diff_lines(&change.diff_content))
            .unwrap_or_default()
    }

    /// Bugs of the open diff that touch `line`.
    pub fn bugs_on_line(&self, line: u32) -> Vec<&Bug> {
        self.active_change()
            .into_iter()
            .flat_map(|change| change.bugs.iter())
            .filter_map(|bug| self.bugs.get(&bug.id))
            .filter(|bug| bug.covers_line(line))
            .collect()
    }

    /// `(claimed, total)` over the selected merge request.
    pub fn bug_counts(&self) -> (usize, usize) {
        let claimed = self.bugs.values().filter(|b| b.claimed).count();
        (claimed, self.bugs.len())
    }

    /// Claim a bug of the selected merge request.
    ///
    /// Unknown or already claimed bugs are ignored. Returns whether a claim
    /// was made.
    pub async fn claim_bug(&mut self, bug_id: &str) -> bool {
        let Some(mr_id) = self.selected.as_ref().map(|mr| mr.id.clone()) else {
            return false;
        };
        if self.bugs.get(bug_id).map_or(true, |bug| bug.claimed) {
            return false;
        }

        match self.services.merge_requests.claim_bug(&mr_id, bug_id).await {
            Ok(result) => {
                if let Some(bug) = self.bugs.get_mut(bug_id) {
                    bug.claimed = true;
                }
                // Keep the list entry in step so reselecting shows the claim.
                let listed = self.merge_requests.iter_mut().find(|mr| mr.id == mr_id);
                for mr in self.selected.iter_mut().chain(listed) {
                    if let Some(bug) = mr.find_bug_mut(bug_id) {
                        bug.claimed = true;
                        mr.bugs_claimed += 1;
                    }
                }
                self.session.bugs_found += 1;
                self.session.points_earned += result.points;
                self.reward_modal = Some(result);
                true
            }
            Err(e) => {
                self.notice = Some(Notice::failed("Failed to claim bug", &e));
                false
            }
        }
    }

    pub fn close_reward_modal(&mut self) {
        self.reward_modal = None;
    }

    pub async fn complete_review(&mut self) {
        let Some(mr_id) = self.selected.as_ref().map(|mr| mr.id.clone()) else {
            return;
        };

        match self
            .services
            .merge_requests
            .submit_review(&mr_id, &ReviewSubmission::completed())
            .await
        {
            Ok(_) => {
                self.session.reviews_completed += 1;
                self.notice = Some(Notice::Success("Review completed successfully!".to_string()));
            }
            Err(e) => self.notice = Some(Notice::failed("Failed to complete review", &e)),
        }
    }
}
