use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{default_timestamp, repository::Entity};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Pothole,
    Streetlight,
    Trash,
    Water,
    Sewage,
    RoadDamage,
    Other,
}

impl Category {
    pub fn stringify(&self) -> &'static str {
        match self {
            Category::Pothole => "pothole",
            Category::Streetlight => "streetlight",
            Category::Trash => "trash",
            Category::Water => "water",
            Category::Sewage => "sewage",
            Category::RoadDamage => "road_damage",
            Category::Other => "other",
        }
    }
}

/// Lifecycle states. Any state may follow any other: the original system
/// never enforced an ordering and callers depend on that.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Reported,
    Acknowledged,
    InProgress,
    Resolved,
    Closed,
}

impl Default for IssueStatus {
    fn default() -> Self {
        IssueStatus::Reported
    }
}

impl IssueStatus {
    pub fn stringify(&self) -> &'static str {
        match self {
            IssueStatus::Reported => "reported",
            IssueStatus::Acknowledged => "acknowledged",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Resolved => "resolved",
            IssueStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

// Longitude first, the legacy coordinate-pair order the 2d index expects.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lng: f64,
    pub lat: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    pub address: String,
    pub coordinates: Coordinates,
    pub ward: Option<String>,
    pub pincode: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ImageRef {
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CitizenFeedback {
    pub rating: u32,
    pub comment: Option<String>,
    pub submitted_at: i64,
}

/// One entry of the audit trail. Never mutated or removed once appended.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StatusUpdate {
    pub status: IssueStatus,
    pub description: String,
    pub updated_by: ObjectId,
    pub timestamp: i64,
}

impl StatusUpdate {
    pub fn new(status: IssueStatus, description: Option<String>, updated_by: ObjectId) -> Self {
        Self {
            status,
            description: description
                .unwrap_or_else(|| format!("Status changed to {}", status.stringify())),
            updated_by,
            timestamp: default_timestamp(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Issue {
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub location: Location,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    pub reported_by: ObjectId,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default)]
    pub priority: Priority,
    pub assigned_to: Option<ObjectId>,
    pub assigned_staff: Option<ObjectId>,
    pub estimated_resolution_time: Option<i64>,
    pub actual_resolution_time: Option<i64>,
    #[serde(default)]
    pub updates: Vec<StatusUpdate>,
    pub citizen_feedback: Option<CitizenFeedback>,
    #[serde(default = "default_timestamp")]
    pub created_at: i64,
    #[serde(default = "default_timestamp")]
    pub last_modified: i64,
}

impl Issue {
    /// Days between creation and the recorded resolution, when one exists.
    pub fn resolution_days(&self) -> Option<f64> {
        if self.status != IssueStatus::Resolved {
            return None;
        }
        self.actual_resolution_time
            .map(|resolved| (resolved - self.created_at) as f64 / 86_400_000_000.0)
    }
}

impl Entity for Issue {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn timestamp(&self) -> i64 {
        self.created_at
    }
}
