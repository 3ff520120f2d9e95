use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{GroupSet, TaskFilter, TaskState};
use crate::workflow::NewTask;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub groups: GroupSet,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub groups: Option<GroupSet>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub acronym: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub permit_create: GroupSet,
    #[serde(default)]
    pub permit_open: GroupSet,
    #[serde(default)]
    pub permit_todo: GroupSet,
    #[serde(default)]
    pub permit_doing: GroupSet,
    #[serde(default)]
    pub permit_done: GroupSet,
}

#[derive(Debug, Deserialize)]
pub struct UpdateApplicationRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub permit_create: Option<GroupSet>,
    #[serde(default)]
    pub permit_open: Option<GroupSet>,
    #[serde(default)]
    pub permit_todo: Option<GroupSet>,
    #[serde(default)]
    pub permit_doing: Option<GroupSet>,
    #[serde(default)]
    pub permit_done: Option<GroupSet>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlanRequest {
    pub name: String,
    #[serde(default)]
    pub app_acronym: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListPlansParams {
    #[serde(default)]
    pub app: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListTasksParams {
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
}

impl ListTasksParams {
    /// Builds a filter; an unrecognized state is a bad request.
    pub fn into_filter(self) -> Result<TaskFilter> {
        let blank_to_none = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Ok(TaskFilter {
            app: blank_to_none(self.app),
            state: blank_to_none(self.state)
                .map(|s| s.parse::<TaskState>())
                .transpose()?,
            plan: blank_to_none(self.plan),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub app_acronym: String,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(req: CreateTaskRequest) -> Self {
        NewTask {
            name: req.name,
            description: req.description,
            app_acronym: req.app_acronym,
            plan: req.plan,
            owner: req.owner,
            note: req.note,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    /// An empty string unassigns the plan.
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppendNoteRequest {
    pub note: String,
}
