use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::Person;
use crate::db::types::PersonRole;

#[derive(Debug, Deserialize)]
pub(crate) struct PersonCreate {
    pub(crate) username: String,
    #[serde(alias = "fullName")]
    pub(crate) full_name: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PersonLogin {
    pub(crate) username: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdminPersonCreate {
    pub(crate) username: String,
    #[serde(alias = "fullName")]
    pub(crate) full_name: String,
    pub(crate) password: String,
    #[serde(default = "default_role")]
    pub(crate) role: PersonRole,
    #[serde(default = "default_true")]
    #[serde(alias = "isActive")]
    pub(crate) is_active: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdminPersonUpdate {
    #[serde(default)]
    #[serde(alias = "fullName")]
    pub(crate) full_name: Option<String>,
    #[serde(default)]
    pub(crate) password: Option<String>,
    #[serde(default)]
    pub(crate) role: Option<PersonRole>,
    #[serde(default)]
    #[serde(alias = "isActive")]
    pub(crate) is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PersonResponse {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) full_name: String,
    pub(crate) role: PersonRole,
    pub(crate) is_active: bool,
    pub(crate) created_at: String,
}

impl PersonResponse {
    pub(crate) fn from_db(person: Person) -> Self {
        Self {
            id: person.id,
            username: person.username,
            full_name: person.full_name,
            role: person.role,
            is_active: person.is_active,
            created_at: format_primitive(person.created_at),
        }
    }
}

fn default_role() -> PersonRole {
    PersonRole::Student
}

fn default_true() -> bool {
    true
}
