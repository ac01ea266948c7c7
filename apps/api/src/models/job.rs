use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// What the job/profile store supplies for gap analysis. Read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobContext {
    pub job_id: Uuid,
    pub job_title: String,
    pub company_name: String,
    /// Required skills in the order the posting lists them.
    pub required_skills: Vec<String>,
    pub candidate_skills: Vec<String>,
}
