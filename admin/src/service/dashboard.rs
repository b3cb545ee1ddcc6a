use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use mongodb::bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use common::{
    access_rules::{AccessRules, ViewReports},
    auth::Auth,
    context::GeneralContext,
    entities::{
        department::Department,
        issue::{Issue, IssueStatus},
    },
    error::{self, AddCode},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupCount {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthGroup {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyCount {
    #[serde(rename = "_id")]
    pub id: MonthGroup,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_issues: u64,
    pub resolved_issues: u64,
    pub in_progress_issues: u64,
    pub high_priority_issues: u64,
    pub issues_by_category: Vec<GroupCount>,
    pub issues_by_status: Vec<GroupCount>,
    pub monthly_trend: Vec<MonthlyCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentMetric {
    pub id: String,
    pub name: String,
    pub code: String,
    pub total_issues: u64,
    pub resolved_issues: u64,
    pub avg_resolution_time: Option<f64>,
}

pub struct DashboardService {
    context: GeneralContext,
}

impl DashboardService {
    pub fn new(context: GeneralContext) -> Self {
        Self { context }
    }

    fn authorize(&self) -> error::Result<()> {
        let auth = self.context.auth();
        if !ViewReports.get_access(&auth, ()) {
            let code = if auth == Auth::None { 401 } else { 403 };
            return Err(anyhow::anyhow!("Not authorized to access this route").code(code));
        }
        Ok(())
    }

    /// Full-scan summary of the issue collection. Recomputed on every call,
    /// nothing cached.
    pub async fn dashboard_stats(&self) -> error::Result<DashboardStats> {
        self.authorize()?;

        let issues = self.context.try_get_repository::<Issue>()?;

        let total_issues = issues.count(doc! {}).await?;
        let resolved_issues = issues.count(doc! {"status": "resolved"}).await?;
        let in_progress_issues = issues.count(doc! {"status": "in_progress"}).await?;
        let high_priority_issues = issues.count(doc! {"priority": "high"}).await?;

        let all = issues.find_all().await?;

        let mut by_category: BTreeMap<&'static str, u64> = BTreeMap::new();
        let mut by_status: BTreeMap<&'static str, u64> = BTreeMap::new();
        let mut by_month: BTreeMap<(i32, u32), u64> = BTreeMap::new();

        for issue in &all {
            *by_category.entry(issue.category.stringify()).or_insert(0) += 1;
            *by_status.entry(issue.status.stringify()).or_insert(0) += 1;
            if let Some(created) = DateTime::<Utc>::from_timestamp_micros(issue.created_at) {
                *by_month.entry((created.year(), created.month())).or_insert(0) += 1;
            }
        }

        let issues_by_category = by_category
            .into_iter()
            .map(|(id, count)| GroupCount {
                id: id.to_string(),
                count,
            })
            .collect();
        let issues_by_status = by_status
            .into_iter()
            .map(|(id, count)| GroupCount {
                id: id.to_string(),
                count,
            })
            .collect();

        // ascending by (year, month); only months with at least one issue
        // appear, and only the six most recent of those are kept
        let monthly: Vec<MonthlyCount> = by_month
            .into_iter()
            .map(|((year, month), count)| MonthlyCount {
                id: MonthGroup { year, month },
                count,
            })
            .collect();
        let monthly_trend = monthly[monthly.len().saturating_sub(6)..].to_vec();

        Ok(DashboardStats {
            total_issues,
            resolved_issues,
            in_progress_issues,
            high_priority_issues,
            issues_by_category,
            issues_by_status,
            monthly_trend,
        })
    }

    /// Joins every department with its assigned issues and derives workload
    /// counts plus the mean resolution time in days over the resolved ones.
    pub async fn department_metrics(&self) -> error::Result<Vec<DepartmentMetric>> {
        self.authorize()?;

        let departments = self.context.try_get_repository::<Department>()?;
        let issues = self.context.try_get_repository::<Issue>()?;

        let mut departments = departments.find_all().await?;
        departments.sort_by_key(|department| (department.created_at, department.id));

        let all = issues.find_all().await?;

        let mut metrics = Vec::with_capacity(departments.len());
        for department in departments {
            let assigned: Vec<&Issue> = all
                .iter()
                .filter(|issue| issue.assigned_to == Some(department.id))
                .collect();

            let resolved = assigned
                .iter()
                .filter(|issue| issue.status == IssueStatus::Resolved)
                .count();

            let durations: Vec<f64> = assigned
                .iter()
                .filter_map(|issue| issue.resolution_days())
                .collect();
            let avg_resolution_time = if durations.is_empty() {
                None
            } else {
                Some(durations.iter().sum::<f64>() / durations.len() as f64)
            };

            metrics.push(DepartmentMetric {
                id: department.id.to_hex(),
                name: department.name,
                code: department.code,
                total_issues: assigned.len() as u64,
                resolved_issues: resolved as u64,
                avg_resolution_time,
            });
        }

        Ok(metrics)
    }
}
