//! Keyword heuristics that assign a category and priority to an email.
//!
//! Subject rules always run before body rules and the first matching group
//! wins, so an email never carries more than one category.

use crate::models::{Category, CategoryInfo, EmailRecord};
use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use std::sync::OnceLock;

pub const URGENT_KEYWORDS: &[&str] = &[
    "urgent",
    "asap",
    "emergency",
    "important",
    "deadline",
    "overdue",
];

pub const NEWSLETTER_KEYWORDS: &[&str] = &["newsletter", "digest", "update", "weekly", "monthly"];

pub const WORK_KEYWORDS: &[&str] = &[
    "project",
    "deploy",
    "release",
    "production",
    "incident",
    "contract",
    "invoice",
];

pub const PROMO_KEYWORDS: &[&str] = &["unsubscribe", "promotion", "offer", "discount", "buy now"];

/// Body rules, checked in order once no subject rule matched.
pub const BODY_RULES: &[(Category, u8, &[&str])] = &[
    (Category::Important, 4, WORK_KEYWORDS),
    (Category::Spam, 1, PROMO_KEYWORDS),
];

const WORDS_PER_MINUTE: usize = 200;

struct Matchers {
    urgent: AhoCorasick,
    newsletter: AhoCorasick,
    body: Vec<(Category, u8, AhoCorasick)>,
}

fn build(keywords: &[&str]) -> AhoCorasick {
    AhoCorasickBuilder::new()
        .ascii_case_insensitive(true)
        .build(keywords)
        .unwrap_or_else(|e| panic!("invalid keyword set {:?}: {}", keywords, e))
}

fn matchers() -> &'static Matchers {
    static MATCHERS: OnceLock<Matchers> = OnceLock::new();
    MATCHERS.get_or_init(|| Matchers {
        urgent: build(URGENT_KEYWORDS),
        newsletter: build(NEWSLETTER_KEYWORDS),
        body: BODY_RULES
            .iter()
            .map(|(category, priority, keywords)| (*category, *priority, build(keywords)))
            .collect(),
    })
}

pub fn classify(email: &EmailRecord) -> CategoryInfo {
    let subject = email.subject.to_lowercase();
    let body = email.body.to_lowercase();
    let m = matchers();

    let (category, priority) = if m.urgent.is_match(&subject) {
        (Category::Urgent, 5)
    } else if m.newsletter.is_match(&subject) {
        (Category::Newsletter, 1)
    } else {
        m.body
            .iter()
            .find(|(_, _, ac)| ac.is_match(&body))
            .map(|(category, priority, _)| (*category, *priority))
            .unwrap_or((Category::Important, 3))
    };

    CategoryInfo {
        category,
        priority,
        action_required: matches!(category, Category::Urgent | Category::Important),
        estimated_read_time: estimated_read_time(&email.body),
    }
}

/// Whole minutes at 200 words per minute, rounded up.
pub fn estimated_read_time(body: &str) -> u32 {
    let words = body.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE) as u32
}
