//! Plan list and dashboard figures
//!
//! The list page and dashboard show fixed sample data. Deleting from the list
//! only removes the in-memory entry; stored plans are never touched.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::info;
use wspm_common::Error;

/// Review status of a listed plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl PlanStatus {
    /// Display label shown on status chips
    pub fn label(self) -> &'static str {
        match self {
            PlanStatus::Draft => "下書き",
            PlanStatus::Submitted => "提出済み",
            PlanStatus::Approved => "承認済み",
            PlanStatus::Rejected => "却下",
        }
    }
}

/// `all` or a single status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(PlanStatus),
}

impl StatusFilter {
    fn matches(self, status: PlanStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" => Ok(StatusFilter::All),
            "draft" => Ok(StatusFilter::Only(PlanStatus::Draft)),
            "submitted" => Ok(StatusFilter::Only(PlanStatus::Submitted)),
            "approved" => Ok(StatusFilter::Only(PlanStatus::Approved)),
            "rejected" => Ok(StatusFilter::Only(PlanStatus::Rejected)),
            other => Err(Error::InvalidInput(format!("unknown status filter '{}'", other))),
        }
    }
}

/// One row of the plan list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub id: String,
    pub title: String,
    pub client_name: String,
    pub status: PlanStatus,
    pub status_label: &'static str,
    pub created_at: String,
    pub updated_at: String,
    pub created_by: String,
}

impl PlanSummary {
    fn sample(
        id: &str,
        client_name: &str,
        status: PlanStatus,
        created_at: &str,
        updated_at: &str,
        created_by: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: format!("{}様の利用計画", client_name),
            client_name: client_name.to_string(),
            status,
            status_label: status.label(),
            created_at: created_at.to_string(),
            updated_at: updated_at.to_string(),
            created_by: created_by.to_string(),
        }
    }

    fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.client_name.to_lowercase().contains(needle)
    }
}

/// In-memory plan list
#[derive(Debug)]
pub struct PlanListing {
    plans: RwLock<Vec<PlanSummary>>,
}

impl Default for PlanListing {
    fn default() -> Self {
        Self::with_plans(sample_plans())
    }
}

impl PlanListing {
    /// Listing seeded with the sample plans
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(plans: Vec<PlanSummary>) -> Self {
        Self {
            plans: RwLock::new(plans),
        }
    }

    /// Plans whose title or client name contains `search` (case-insensitive)
    /// and whose status passes `status`. The search text is used untrimmed.
    pub async fn filter(&self, search: &str, status: StatusFilter) -> Vec<PlanSummary> {
        let needle = search.to_lowercase();
        self.plans
            .read()
            .await
            .iter()
            .filter(|plan| status.matches(plan.status))
            .filter(|plan| needle.is_empty() || plan.matches_search(&needle))
            .cloned()
            .collect()
    }

    /// Remove a plan from the list; returns whether it was present
    pub async fn remove(&self, id: &str) -> bool {
        let mut plans = self.plans.write().await;
        let before = plans.len();
        plans.retain(|plan| plan.id != id);
        let removed = plans.len() != before;
        if removed {
            info!(plan_id = id, "Plan removed from listing");
        }
        removed
    }
}

fn sample_plans() -> Vec<PlanSummary> {
    vec![
        PlanSummary::sample("1", "田中太郎", PlanStatus::Approved, "2024-01-15", "2024-01-20", "担当者A"),
        PlanSummary::sample("2", "佐藤花子", PlanStatus::Draft, "2024-01-18", "2024-01-18", "担当者B"),
        PlanSummary::sample("3", "鈴木一郎", PlanStatus::Submitted, "2024-01-10", "2024-01-15", "担当者A"),
    ]
}

/// Headline figures on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_plans: u32,
    pub completed_plans: u32,
    pub pending_plans: u32,
    pub this_month: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecentStatus {
    Completed,
    Pending,
}

/// Entry in the dashboard's recent-plans panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentPlan {
    pub id: u32,
    pub name: &'static str,
    pub status: RecentStatus,
    pub date: &'static str,
}

/// Dashboard payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_plans: Vec<RecentPlan>,
}

pub fn dashboard() -> Dashboard {
    Dashboard {
        stats: DashboardStats {
            total_plans: 156,
            completed_plans: 142,
            pending_plans: 14,
            this_month: 23,
        },
        recent_plans: vec![
            RecentPlan { id: 1, name: "田中太郎", status: RecentStatus::Completed, date: "2024-01-15" },
            RecentPlan { id: 2, name: "佐藤花子", status: RecentStatus::Pending, date: "2024-01-14" },
            RecentPlan { id: 3, name: "鈴木一郎", status: RecentStatus::Completed, date: "2024-01-13" },
            RecentPlan { id: 4, name: "高橋美咲", status: RecentStatus::Pending, date: "2024-01-12" },
        ],
    }
}
