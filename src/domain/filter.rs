//! Filter configurations
//!
//! Named boolean toggles that tell the external pipeline what to extract from
//! a repository (`RepositoryFilter`) and which parts an analysis run included
//! (`RatingFilter`). Missing toggles deserialize as disabled.

use serde::{Deserialize, Serialize};

/// Generate a struct of boolean toggles with `ENABLED`/`DISABLED` presets
macro_rules! toggle_set {
    ($(#[$meta:meta])* $name:ident { $($(#[$fmeta:meta])* $field:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct $name {
            $($(#[$fmeta])* pub $field: bool,)+
        }

        impl $name {
            pub const ENABLED: Self = Self { $($field: true,)+ };
            pub const DISABLED: Self = Self { $($field: false,)+ };

            /// True when at least one toggle is switched on
            pub fn any_enabled(&self) -> bool {
                false $(|| self.$field)+
            }

            /// Number of toggles switched on
            pub fn enabled_count(&self) -> usize {
                [$(self.$field),+].iter().filter(|enabled| **enabled).count()
            }
        }
    };
}

toggle_set!(
    /// Commit properties extracted per commit
    CommitFilter {
        enable_commit_hash,
        enable_author_name,
        enable_author_email,
        enable_author_date,
        enable_committer_name,
        enable_committer_email,
        enable_committer_date,
        enable_commit_message,
        enable_commit_diff,
        enable_commit_branch,
    }
);

toggle_set!(
    /// Issue and pull request properties extracted per issue
    IssueFilter {
        enable_issue_id,
        enable_issue_number,
        enable_issue_state,
        enable_issue_title,
        enable_issue_body,
        enable_issue_user,
        enable_issue_labels,
        enable_issue_assignees,
        enable_issue_milestone,
        enable_issue_created_at,
        enable_issue_updated_at,
        enable_issue_closed_at,
        enable_issue_comments,
        enable_issue_merged_by,
        enable_issue_merged_info,
        enable_issue_reviewers,
    }
);

toggle_set!(
    /// Parts of an analysis run captured in its RDF output
    RatingFilter {
        enable_metric_definition,
        enable_individual_ratings,
        enable_aggregated_scores,
        enable_model_metadata,
        enable_task_metadata,
    }
);

/// Filter configuration of an ingestion order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepositoryFilter {
    pub commit_filter: CommitFilter,
    pub issue_filter: IssueFilter,
}

impl RepositoryFilter {
    /// Filter applied when a repository is enqueued without explicit options
    pub const DEFAULT: Self =
        Self { commit_filter: CommitFilter::ENABLED, issue_filter: IssueFilter::ENABLED };

    pub const DISABLED: Self =
        Self { commit_filter: CommitFilter::DISABLED, issue_filter: IssueFilter::DISABLED };

    pub fn are_all_filter_options_disabled(&self) -> bool {
        !self.commit_filter.any_enabled() && !self.issue_filter.any_enabled()
    }
}
