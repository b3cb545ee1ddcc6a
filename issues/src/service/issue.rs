use mongodb::bson::{doc, oid::ObjectId, to_bson, Bson, Document};
use serde::{Deserialize, Serialize};

use common::{
    access_rules::{AccessRules, Edit},
    context::GeneralContext,
    default_timestamp,
    entities::{
        department::Department,
        issue::{
            Category, CitizenFeedback, ImageRef, Issue, IssueStatus, Location, Priority,
            StatusUpdate,
        },
        role::Role,
        user::User,
    },
    error::{self, AddCode},
};

use super::routing::route_issue;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssue {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub location: Location,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChangeIssue {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub priority: Option<Priority>,
    pub status: Option<IssueStatus>,
    pub update_description: Option<String>,
    pub assigned_to: Option<String>,
    pub assigned_staff: Option<String>,
    pub estimated_resolution_time: Option<i64>,
    pub actual_resolution_time: Option<i64>,
    pub citizen_feedback: Option<CreateFeedback>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateFeedback {
    pub rating: u32,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct IssueQuery {
    pub category: Option<Category>,
    pub status: Option<IssueStatus>,
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReporterSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    pub id: String,
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthor {
    pub id: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicStatusUpdate {
    pub status: IssueStatus,
    pub description: String,
    pub updated_by: Option<UpdateAuthor>,
    pub timestamp: i64,
}

/// Issue as served over the wire: reporter, department and update authors
/// joined in, ids as hex strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicIssue {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub location: Location,
    pub images: Vec<ImageRef>,
    pub reported_by: Option<ReporterSummary>,
    pub status: IssueStatus,
    pub priority: Priority,
    pub assigned_to: Option<DepartmentSummary>,
    pub assigned_staff: Option<String>,
    pub estimated_resolution_time: Option<i64>,
    pub actual_resolution_time: Option<i64>,
    pub updates: Vec<PublicStatusUpdate>,
    pub citizen_feedback: Option<CitizenFeedback>,
    pub created_at: i64,
    pub last_modified: i64,
}

impl PublicIssue {
    pub async fn new(context: &GeneralContext, issue: Issue) -> error::Result<Self> {
        let users = context.try_get_repository::<User>()?;
        let departments = context.try_get_repository::<Department>()?;

        let reported_by = users
            .find("id", &Bson::ObjectId(issue.reported_by))
            .await?
            .map(|user| ReporterSummary {
                id: user.id.to_hex(),
                name: user.name,
                email: user.email,
                phone: user.phone,
            });

        let assigned_to = match issue.assigned_to {
            Some(id) => departments.find("id", &Bson::ObjectId(id)).await?.map(
                |department| DepartmentSummary {
                    id: department.id.to_hex(),
                    name: department.name,
                    code: department.code,
                },
            ),
            None => None,
        };

        let mut updates = Vec::with_capacity(issue.updates.len());
        for update in issue.updates {
            let updated_by = users
                .find("id", &Bson::ObjectId(update.updated_by))
                .await?
                .map(|user| UpdateAuthor {
                    id: user.id.to_hex(),
                    name: user.name,
                    role: user.role,
                });
            updates.push(PublicStatusUpdate {
                status: update.status,
                description: update.description,
                updated_by,
                timestamp: update.timestamp,
            });
        }

        Ok(PublicIssue {
            id: issue.id.to_hex(),
            title: issue.title,
            description: issue.description,
            category: issue.category,
            location: issue.location,
            images: issue.images,
            reported_by,
            status: issue.status,
            priority: issue.priority,
            assigned_to,
            assigned_staff: issue.assigned_staff.map(|id| id.to_hex()),
            estimated_resolution_time: issue.estimated_resolution_time,
            actual_resolution_time: issue.actual_resolution_time,
            updates,
            citizen_feedback: issue.citizen_feedback,
            created_at: issue.created_at,
            last_modified: issue.last_modified,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IssuesList {
    pub success: bool,
    pub count: usize,
    pub total: u64,
    pub pages: u64,
    pub data: Vec<PublicIssue>,
}

pub struct IssueService {
    context: GeneralContext,
}

impl IssueService {
    pub fn new(context: GeneralContext) -> Self {
        Self { context }
    }

    pub async fn create(&self, create: CreateIssue) -> error::Result<PublicIssue> {
        let auth = self.context.auth();
        let Some(reported_by) = auth.id().copied() else {
            return Err(anyhow::anyhow!("Not authorized to report issues").code(401));
        };

        let title = create.title.trim().to_string();
        if title.is_empty() {
            return Err(anyhow::anyhow!("Please add a title for the issue").code(400));
        }
        if title.chars().count() > 100 {
            return Err(anyhow::anyhow!("Title cannot be more than 100 characters").code(400));
        }
        if create.description.is_empty() {
            return Err(anyhow::anyhow!("Please add a description").code(400));
        }
        if create.description.chars().count() > 500 {
            return Err(
                anyhow::anyhow!("Description cannot be more than 500 characters").code(400),
            );
        }
        if create.location.address.trim().is_empty() {
            return Err(anyhow::anyhow!("Please add a location address").code(400));
        }

        let issues = self.context.try_get_repository::<Issue>()?;
        let departments = self.context.try_get_repository::<Department>()?;

        // routing runs once, here; later edits never re-route
        let assigned_to = route_issue(create.category, &departments.find_all().await?);

        let issue = Issue {
            id: ObjectId::new(),
            title,
            description: create.description,
            category: create.category,
            location: create.location,
            images: create.images,
            reported_by,
            status: IssueStatus::default(),
            priority: create.priority.unwrap_or_default(),
            assigned_to,
            assigned_staff: None,
            estimated_resolution_time: None,
            actual_resolution_time: None,
            updates: Vec::new(),
            citizen_feedback: None,
            created_at: default_timestamp(),
            last_modified: default_timestamp(),
        };

        issues.insert(&issue).await?;

        PublicIssue::new(&self.context, issue).await
    }

    pub async fn list(&self, query: IssueQuery) -> error::Result<IssuesList> {
        let issues = self.context.try_get_repository::<Issue>()?;

        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(10).max(1);

        let mut filter = Document::new();
        if let Some(category) = query.category {
            filter.insert("category", to_bson(&category)?);
        }
        if let Some(status) = query.status {
            filter.insert("status", to_bson(&status)?);
        }

        let (items, total) = issues
            .find_page(filter, (page - 1) * limit as u64, limit)
            .await?;

        let mut data = Vec::with_capacity(items.len());
        for issue in items {
            data.push(PublicIssue::new(&self.context, issue).await?);
        }

        Ok(IssuesList {
            success: true,
            count: data.len(),
            total,
            pages: (total + limit as u64 - 1) / limit as u64,
            data,
        })
    }

    pub async fn find(&self, id: ObjectId) -> error::Result<PublicIssue> {
        let issues = self.context.try_get_repository::<Issue>()?;

        let Some(issue) = issues.find("id", &Bson::ObjectId(id)).await? else {
            return Err(anyhow::anyhow!("Issue not found").code(404));
        };

        PublicIssue::new(&self.context, issue).await
    }

    pub async fn change(&self, id: ObjectId, change: ChangeIssue) -> error::Result<PublicIssue> {
        let auth = self.context.auth();

        let issues = self.context.try_get_repository::<Issue>()?;

        let Some(issue) = issues.find("id", &Bson::ObjectId(id)).await? else {
            return Err(anyhow::anyhow!("Issue not found").code(404));
        };

        if !Edit.get_access(&auth, &issue) {
            return Err(anyhow::anyhow!("Not authorized to update issues").code(401));
        }

        let mut set = doc! { "last_modified": default_timestamp() };

        if let Some(title) = change.title {
            let title = title.trim().to_string();
            if title.is_empty() || title.chars().count() > 100 {
                return Err(anyhow::anyhow!("Title cannot be more than 100 characters").code(400));
            }
            set.insert("title", title);
        }
        if let Some(description) = change.description {
            if description.is_empty() || description.chars().count() > 500 {
                return Err(
                    anyhow::anyhow!("Description cannot be more than 500 characters").code(400),
                );
            }
            set.insert("description", description);
        }
        if let Some(category) = change.category {
            set.insert("category", to_bson(&category)?);
        }
        if let Some(location) = change.location {
            set.insert("location", to_bson(&location)?);
        }
        if let Some(priority) = change.priority {
            set.insert("priority", to_bson(&priority)?);
        }
        if let Some(assigned_to) = change.assigned_to {
            set.insert("assigned_to", Bson::ObjectId(assigned_to.parse()?));
        }
        if let Some(assigned_staff) = change.assigned_staff {
            set.insert("assigned_staff", Bson::ObjectId(assigned_staff.parse()?));
        }
        if let Some(estimated) = change.estimated_resolution_time {
            set.insert("estimated_resolution_time", estimated);
        }
        if let Some(actual) = change.actual_resolution_time {
            set.insert("actual_resolution_time", actual);
        }
        if let Some(feedback) = change.citizen_feedback {
            if !(1..=5).contains(&feedback.rating) {
                return Err(anyhow::anyhow!("Rating must be between 1 and 5").code(400));
            }
            let feedback = CitizenFeedback {
                rating: feedback.rating,
                comment: feedback.comment,
                submitted_at: default_timestamp(),
            };
            set.insert("citizen_feedback", to_bson(&feedback)?);
        }

        let mut update = Document::new();

        // A status change appends to the trail and merges the rest of the
        // fields in the same store-side update, so concurrent updates cannot
        // drop a history entry. Any status may follow any other.
        if let Some(status) = change.status {
            let Some(updater) = auth.id().copied() else {
                return Err(anyhow::anyhow!("Not authorized to update issues").code(401));
            };
            let record = StatusUpdate::new(status, change.update_description, updater);
            set.insert("status", to_bson(&status)?);
            update.insert("$push", doc! { "updates": to_bson(&record)? });
        }

        update.insert("$set", set);

        let Some(updated) = issues.update_one(doc! { "id": id }, update).await? else {
            return Err(anyhow::anyhow!("Issue not found").code(404));
        };

        PublicIssue::new(&self.context, updated).await
    }

    pub async fn nearby(&self, query: NearbyQuery) -> error::Result<Vec<PublicIssue>> {
        let issues = self.context.try_get_repository::<Issue>()?;
        let radius_km = query.radius_km.unwrap_or(5.0);

        let mut matched: Vec<(f64, Issue)> = issues
            .find_all()
            .await?
            .into_iter()
            .filter_map(|issue| {
                let distance = haversine_km(
                    query.lat,
                    query.lng,
                    issue.location.coordinates.lat,
                    issue.location.coordinates.lng,
                );
                (distance <= radius_km).then_some((distance, issue))
            })
            .collect();
        matched.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

        let mut data = Vec::with_capacity(matched.len());
        for (_, issue) in matched {
            data.push(PublicIssue::new(&self.context, issue).await?);
        }

        Ok(data)
    }
}

const EARTH_RADIUS_KM: f64 = 6371.0;

fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}
