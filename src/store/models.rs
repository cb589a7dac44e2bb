use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub github_id: u64,
    #[serde(default)]
    pub webhook_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// GitHub user id
    pub uid: u64,
    #[serde(default)]
    pub login: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAssignment {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Repository created for a single student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRepo {
    pub github_repo_id: u64,
    pub assignment_id: u64,
}

/// Repository shared by a group of students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAssignmentRepo {
    pub github_repo_id: u64,
    pub group_assignment_id: u64,
}

/// The assignment a submission repository belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoContext {
    Individual(Assignment),
    Group(GroupAssignment),
}

impl RepoContext {
    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Individual(assignment) => assignment.due_date,
            Self::Group(assignment) => assignment.due_date,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Individual(assignment) => &assignment.title,
            Self::Group(assignment) => &assignment.title,
        }
    }
}
