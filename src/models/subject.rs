//! Subject (course) model.
//!
//! A subject declares weekly teaching demand. It is expanded into
//! [`Block`](super::Block)s by [`decompose`](super::decompose) before search.

use serde::{Deserialize, Serialize};

use super::RoomKind;

/// A subject to be timetabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Weekly teaching hours per group.
    pub weekly_hours: u32,
    /// Total enrolled students (split into groups).
    pub enrollment: u32,
    /// Required room kind. `Mixed` alternates lecture/lab across blocks.
    #[serde(default)]
    pub kind: RoomKind,
    /// Specialty tags. Empty = the subject name is used as the only tag.
    #[serde(default)]
    pub specialties: Vec<String>,
    /// Teacher ids allowed to teach this subject. Empty = anyone.
    #[serde(default)]
    pub eligible_teachers: Vec<String>,
}

impl Subject {
    /// Creates a lecture subject.
    pub fn new(id: impl Into<String>, weekly_hours: u32, enrollment: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            weekly_hours,
            enrollment,
            kind: RoomKind::Lecture,
            specialties: Vec::new(),
            eligible_teachers: Vec::new(),
        }
    }

    /// Sets the subject name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the required room kind.
    pub fn with_kind(mut self, kind: RoomKind) -> Self {
        self.kind = kind;
        self
    }

    /// Adds a specialty tag.
    pub fn with_specialty(mut self, tag: impl Into<String>) -> Self {
        self.specialties.push(tag.into());
        self
    }

    /// Adds an eligible teacher id.
    pub fn with_eligible_teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.eligible_teachers.push(teacher_id.into());
        self
    }

    /// Effective specialty tags: declared tags, else the subject name.
    pub fn effective_specialties(&self) -> Vec<String> {
        if !self.specialties.is_empty() {
            self.specialties.clone()
        } else if !self.name.is_empty() {
            vec![self.name.clone()]
        } else {
            Vec::new()
        }
    }
}
