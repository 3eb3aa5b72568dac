//! Course catalogue models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::validation::rules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseStatus {
    Active,
    #[default]
    Inprogress,
    Inactive,
}

impl CourseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseStatus::Active => "active",
            CourseStatus::Inprogress => "inprogress",
            CourseStatus::Inactive => "inactive",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "active" => Some(CourseStatus::Active),
            "inprogress" => Some(CourseStatus::Inprogress),
            "inactive" => Some(CourseStatus::Inactive),
            _ => None,
        }
    }
}

impl TryFrom<String> for CourseStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CourseStatus::parse(&value).ok_or_else(|| format!("unknown course status: {value}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SkillReward {
    pub skill: String,
    pub points: i32,
}

/// Row shape of `courses`, without the reward list.
#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    pub id: String,
    pub title: String,
    pub creator: String,
    pub owner_username: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: CourseStatus,
    pub description: String,
    pub image: String,
    pub content: String,
    pub skill_points: i32,
    pub subtopic_completion_score: i32,
    pub course_completion_score: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub creator: String,
    pub owner_username: String,
    pub status: CourseStatus,
    pub description: String,
    pub image: String,
    pub content: String,
    pub skill_points: i32,
    pub subtopic_completion_score: i32,
    pub course_completion_score: i32,
    pub skill_rewards: Vec<SkillReward>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn from_row(row: CourseRow, skill_rewards: Vec<SkillReward>) -> Self {
        Course {
            id: row.id,
            title: row.title,
            creator: row.creator,
            owner_username: row.owner_username.unwrap_or_default(),
            status: row.status,
            description: row.description,
            image: row.image,
            content: row.content,
            skill_points: row.skill_points,
            subtopic_completion_score: row.subtopic_completion_score,
            course_completion_score: row.course_completion_score,
            skill_rewards,
            created_at: row.created_at,
        }
    }
}

/// Values written by an upsert. The owner is decided by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseInput {
    pub id: String,
    pub title: String,
    pub creator: String,
    pub status: CourseStatus,
    pub description: String,
    pub image: String,
    pub content: String,
    pub skill_points: i32,
    pub subtopic_completion_score: i32,
    pub course_completion_score: i32,
    pub skill_rewards: Vec<SkillReward>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpsertCourseRequest {
    #[validate(length(min = 1, message = "id and title are required"))]
    pub id: String,
    #[validate(length(min = 1, message = "id and title are required"))]
    pub title: String,
    pub creator: String,
    #[validate(custom(function = "rules::validate_course_status"))]
    pub status: String,
    pub description: String,
    pub image: String,
    pub content: String,
    pub skill_points: i32,
    pub subtopic_completion_score: i32,
    pub course_completion_score: i32,
    pub skill_rewards: Vec<SkillReward>,
}

impl UpsertCourseRequest {
    /// Trims text fields, defaults the status and drops blank skill rewards.
    /// `content` is stored as submitted.
    pub fn normalized(self) -> Self {
        let status = self.status.trim().to_lowercase();
        Self {
            id: self.id.trim().to_string(),
            title: self.title.trim().to_string(),
            creator: self.creator.trim().to_string(),
            status: if status.is_empty() {
                CourseStatus::default().as_str().to_string()
            } else {
                status
            },
            description: self.description.trim().to_string(),
            image: self.image.trim().to_string(),
            skill_rewards: self
                .skill_rewards
                .into_iter()
                .filter(|reward| !reward.skill.trim().is_empty())
                .collect(),
            ..self
        }
    }

    pub fn into_input(self) -> CourseInput {
        CourseInput {
            status: CourseStatus::parse(&self.status).unwrap_or_default(),
            id: self.id,
            title: self.title,
            creator: self.creator,
            description: self.description,
            image: self.image,
            content: self.content,
            skill_points: self.skill_points,
            subtopic_completion_score: self.subtopic_completion_score,
            course_completion_score: self.course_completion_score,
            skill_rewards: self.skill_rewards,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCourseStatusRequest {
    #[serde(default)]
    #[validate(custom(function = "rules::validate_course_status"))]
    pub status: String,
}
