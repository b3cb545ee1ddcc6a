use serde::{Deserialize, Serialize};

use crate::error::{self, AddCode};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Citizen,
    Admin,
    DepartmentStaff,
}

impl Default for Role {
    fn default() -> Self {
        Role::Citizen
    }
}

impl Role {
    pub fn parse(s: &str) -> error::Result<Role> {
        match s.to_lowercase().as_str() {
            "citizen" => Ok(Role::Citizen),
            "admin" => Ok(Role::Admin),
            "department_staff" => Ok(Role::DepartmentStaff),
            _ => Err(anyhow::anyhow!("Invalid role: {}", s).code(400)),
        }
    }

    pub fn stringify(&self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Admin => "admin",
            Role::DepartmentStaff => "department_staff",
        }
    }
}
