use mongodb::bson::oid::ObjectId;

use common::entities::{department::Department, issue::Category};

/// First department (by creation order) whose category set contains the
/// issue's category. Evaluated once at submission; later edits never
/// re-route. Ties between overlapping departments go to the oldest one.
pub fn route_issue(category: Category, departments: &[Department]) -> Option<ObjectId> {
    let mut departments: Vec<&Department> = departments.iter().collect();
    departments.sort_by_key(|department| (department.created_at, department.id));

    departments
        .into_iter()
        .find(|department| department.categories.contains(&category))
        .map(|department| department.id)
}
