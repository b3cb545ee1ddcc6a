use mongodb::bson::{oid::ObjectId, Bson};
use serde::{Deserialize, Serialize};

use common::{
    access_rules::{AccessRules, Edit},
    context::GeneralContext,
    default_timestamp,
    entities::{
        department::{Contact, Department},
        issue::Category,
    },
    error::{self, AddCode},
};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartment {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub contact: Contact,
    pub head: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicDepartment {
    pub id: String,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub categories: Vec<Category>,
    pub contact: Contact,
    pub head: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
}

impl From<Department> for PublicDepartment {
    fn from(department: Department) -> Self {
        Self {
            id: department.id.to_hex(),
            name: department.name,
            code: department.code,
            description: department.description,
            categories: department.categories,
            contact: department.contact,
            head: department.head.map(|id| id.to_hex()),
            is_active: department.is_active,
            created_at: department.created_at,
        }
    }
}

pub struct DepartmentService {
    context: GeneralContext,
}

impl DepartmentService {
    pub fn new(context: GeneralContext) -> Self {
        Self { context }
    }

    pub async fn create(&self, create: CreateDepartment) -> error::Result<PublicDepartment> {
        let auth = self.context.auth();

        let departments = self.context.try_get_repository::<Department>()?;

        let name = create.name.trim().to_string();
        if name.is_empty() {
            return Err(anyhow::anyhow!("Please add a department name").code(400));
        }
        let code = create.code.trim().to_uppercase();
        if code.is_empty() {
            return Err(anyhow::anyhow!("Please add a department code").code(400));
        }

        let department = Department {
            id: ObjectId::new(),
            name,
            code,
            description: create.description,
            categories: create.categories,
            contact: create.contact,
            head: create.head.map(|id| id.parse()).transpose()?,
            is_active: true,
            created_at: default_timestamp(),
            last_modified: default_timestamp(),
        };

        if !Edit.get_access(&auth, &department) {
            return Err(anyhow::anyhow!("Not authorized to create departments").code(403));
        }

        if departments
            .find("name", &Bson::String(department.name.clone()))
            .await?
            .is_some()
        {
            return Err(anyhow::anyhow!("Department name already exists").code(400));
        }
        if departments
            .find("code", &Bson::String(department.code.clone()))
            .await?
            .is_some()
        {
            return Err(anyhow::anyhow!("Department code already exists").code(400));
        }

        departments.insert(&department).await?;

        Ok(department.into())
    }

    pub async fn list(&self) -> error::Result<Vec<PublicDepartment>> {
        let departments = self.context.try_get_repository::<Department>()?;

        let mut departments = departments.find_all().await?;
        departments.sort_by_key(|department| (department.created_at, department.id));

        Ok(departments.into_iter().map(Into::into).collect())
    }

    pub async fn find(&self, id: ObjectId) -> error::Result<PublicDepartment> {
        let departments = self.context.try_get_repository::<Department>()?;

        let Some(department) = departments.find("id", &Bson::ObjectId(id)).await? else {
            return Err(anyhow::anyhow!("Department not found").code(404));
        };

        Ok(department.into())
    }
}
