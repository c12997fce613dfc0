use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    pub id: String,
    pub from: String,
    pub subject: String,
    pub snippet: String,
    pub body: String,
    pub date: String, // ISO-8601
    pub read: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Urgent,
    Important,
    Newsletter,
    Spam,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Important => "important",
            Self::Newsletter => "newsletter",
            Self::Spam => "spam",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Urgent => "🚨",
            Self::Important => "📌",
            Self::Newsletter => "📰",
            Self::Spam => "🗑️",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub category: Category,
    pub priority: u8, // 1..=5
    pub action_required: bool,
    pub estimated_read_time: u32, // minutes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    #[default]
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub key_points: Vec<String>,
    pub sentiment: Sentiment,
}

/// Where a batch of emails came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Live,
    Sample,
}

/// A record with its classification merged in, as shipped in artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEmail {
    #[serde(flatten)]
    pub email: EmailRecord,
    #[serde(flatten)]
    pub info: CategoryInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSummary {
    pub subject: String,
    pub from: String,
    pub summary: String,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedEmail {
    pub subject: String,
    pub from: String,
    pub category: Category,
    pub priority: u8,
    pub action_required: bool,
}

/// One row of an artifact's data list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmailRow {
    Classified(ClassifiedEmail),
    Summary(EmailSummary),
    Categorized(CategorizedEmail),
}
