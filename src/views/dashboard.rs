// SPDX-License-Identifier: MPL-2.0

use crate::posts::{PostRepository, RepositoryError, ScheduledPost};
use chrono::{DateTime, Utc};
use unicode_segmentation::UnicodeSegmentation;

/// How many of the most recent posts show up in the activity feed
const RECENT_POSTS: usize = 3;
const SNIPPET_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: String,
    pub title: String,
    /// `None` for the draft, which has no timestamp of its own
    pub at: Option<DateTime<Utc>>,
    pub details: String,
}

/// Everything the dashboard screen shows, derived from the store in one read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub scheduled_count: usize,
    pub drafts_count: usize,
    pub upcoming: Vec<ScheduledPost>,
    /// Newest first
    pub recent_activity: Vec<Activity>,
}

impl DashboardSummary {
    pub fn load(
        repo: &PostRepository,
        now: DateTime<Utc>,
        upcoming_limit: usize,
    ) -> Result<Self, RepositoryError> {
        let draft = repo.load_draft()?;
        let scheduled = repo.list_scheduled()?;
        let upcoming = repo.upcoming(now, upcoming_limit)?;

        let mut recent_activity = Vec::new();
        if draft.has_content() {
            recent_activity.push(Activity {
                id: "draft1".to_string(),
                title: "Draft Updated".to_string(),
                at: None,
                details: format!("Draft content: \"{}...\"", snippet(&draft.content)),
            });
        }

        let skip = scheduled.len().saturating_sub(RECENT_POSTS);
        for post in scheduled.iter().skip(skip) {
            recent_activity.push(Activity {
                id: format!("sch{}", post.id),
                title: format!("Post Scheduled ({})", post.platform),
                at: Some(post.scheduled_at),
                details: format!("Content: \"{}...\"", snippet(&post.content)),
            });
        }
        recent_activity.reverse();

        Ok(Self {
            scheduled_count: scheduled.len(),
            drafts_count: usize::from(draft.has_content()),
            upcoming,
            recent_activity,
        })
    }
}

fn snippet(text: &str) -> String {
    text.graphemes(true).take(SNIPPET_CHARS).collect()
}
