use serde::{Deserialize, Serialize};

use crate::catalog::{ChallengeTemplate, QuizTemplate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    None,
    Ticket,
    PlantWatering,
}

impl ValidationKind {
    /// Wire name used by the challenge validation endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationKind::None => "none",
            ValidationKind::Ticket => "ticket",
            ValidationKind::PlantWatering => "plant_watering",
        }
    }

    pub fn needs_photo_check(self) -> bool {
        !matches!(self, ValidationKind::None)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoLocation {
    pub name: String,
    pub region: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: String,
    pub media_url: Option<String>,
    pub subtitle_url: Option<String>,
    pub thumbnail_url: String,
    pub creator: String,
    pub location: VideoLocation,
    pub year: i32,
    pub category: String,
    #[serde(default)]
    pub is_personalized: bool,
    pub likes: u32,
    pub comments: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: String,
    pub text: String,
    pub emoji: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub options: Vec<QuizOption>,
}

impl Quiz {
    pub fn from_template(id: String, template: &QuizTemplate) -> Self {
        Self {
            id,
            title: template.title.to_string(),
            description: template.description.to_string(),
            icon: template.icon.to_string(),
            options: template
                .options
                .iter()
                .map(|o| QuizOption {
                    id: o.id.to_string(),
                    text: o.text.to_string(),
                    emoji: o.emoji.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub points_awarded: u32,
    pub validation_kind: ValidationKind,
    pub instruction: Option<String>,
}

impl Challenge {
    pub fn from_template(id: String, template: &ChallengeTemplate) -> Self {
        Self {
            id,
            title: template.title.to_string(),
            description: template.description.to_string(),
            icon: template.icon.to_string(),
            points_awarded: template.points,
            validation_kind: template.validation,
            instruction: template.instruction.map(str::to_string),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedKind {
    Video,
    Quiz,
    Challenge,
    Loading,
    PersonalizedPrompt,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedItem {
    Video(Video),
    Quiz(Quiz),
    Challenge(Challenge),
    Loading { id: String, text: String },
    PersonalizedPrompt { id: String, text: String },
}

impl FeedItem {
    pub fn id(&self) -> &str {
        match self {
            FeedItem::Video(v) => &v.id,
            FeedItem::Quiz(q) => &q.id,
            FeedItem::Challenge(c) => &c.id,
            FeedItem::Loading { id, .. } | FeedItem::PersonalizedPrompt { id, .. } => id,
        }
    }

    pub fn kind(&self) -> FeedKind {
        match self {
            FeedItem::Video(_) => FeedKind::Video,
            FeedItem::Quiz(_) => FeedKind::Quiz,
            FeedItem::Challenge(_) => FeedKind::Challenge,
            FeedItem::Loading { .. } => FeedKind::Loading,
            FeedItem::PersonalizedPrompt { .. } => FeedKind::PersonalizedPrompt,
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, FeedItem::Quiz(_) | FeedItem::Challenge(_))
    }

    pub fn title(&self) -> &str {
        match self {
            FeedItem::Video(v) => &v.title,
            FeedItem::Quiz(q) => &q.title,
            FeedItem::Challenge(c) => &c.title,
            FeedItem::Loading { text, .. } | FeedItem::PersonalizedPrompt { text, .. } => text,
        }
    }
}
