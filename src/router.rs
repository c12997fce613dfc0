//! Maps free text to an intent with ordered, first-match-wins cue tables.
//!
//! All matching is case-insensitive substring containment. The tables below
//! are the whole policy: reordering them changes how ambiguous requests
//! (e.g. "show me an overview of my inbox") resolve.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    CheckEmails,
    SummarizeEmails,
    CategorizeEmails,
    General,
}

/// Replies the general-inquiry handler can give.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralReply {
    Capabilities,
    Greeting,
    Fallback,
}

/// Any of these means the user is talking about their mail.
pub const TOPIC_CUES: &[&str] = &["email", "inbox", "unread", "message", "read my", "check my"];

/// Sub-intents within the email topic, in precedence order.
pub const INTENT_RULES: &[(Intent, &[&str])] = &[
    (Intent::CheckEmails, &["check", "show", "get", "what", "read my"]),
    (Intent::SummarizeEmails, &["summar", "brief", "overview"]),
    (Intent::CategorizeEmails, &["categor", "priorit", "organiz"]),
];

/// Used when the topic matched but no sub-intent did.
pub const DEFAULT_TOPIC_INTENT: Intent = Intent::CheckEmails;

pub const GENERAL_RULES: &[(GeneralReply, &[&str])] = &[
    (
        GeneralReply::Capabilities,
        &["what can you do", "help", "capabilities", "features"],
    ),
    (GeneralReply::Greeting, &["hello", "hi", "hey", "greetings"]),
];

fn contains_any(text: &str, cues: &[&str]) -> bool {
    cues.iter().any(|cue| text.contains(cue))
}

fn first_match<T: Copy>(text: &str, rules: &[(T, &[&str])]) -> Option<T> {
    rules
        .iter()
        .find(|(_, cues)| contains_any(text, cues))
        .map(|(target, _)| *target)
}

pub fn route(user_text: &str) -> Intent {
    let text = user_text.trim().to_lowercase();
    if !contains_any(&text, TOPIC_CUES) {
        return Intent::General;
    }
    first_match(&text, INTENT_RULES).unwrap_or(DEFAULT_TOPIC_INTENT)
}

pub fn general_reply(user_text: &str) -> GeneralReply {
    let text = user_text.to_lowercase();
    first_match(&text, GENERAL_RULES).unwrap_or(GeneralReply::Fallback)
}

/// "show my last 7 emails" → Some(7). Needs the word "last" and a bare integer.
pub fn requested_count(user_text: &str) -> Option<usize> {
    if !user_text.to_lowercase().contains("last") {
        return None;
    }
    user_text
        .split_whitespace()
        .find(|w| w.chars().all(|c| c.is_ascii_digit()))
        .and_then(|w| w.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbox_without_sub_intent_defaults_to_check() {
        assert_eq!(route("my inbox please"), Intent::CheckEmails);
        assert_eq!(route("INBOX"), Intent::CheckEmails);
    }

    #[test]
    fn test_check_cues() {
        assert_eq!(route("check my emails"), Intent::CheckEmails);
        assert_eq!(route("What's in my inbox?"), Intent::CheckEmails);
    }

    #[test]
    fn test_summarize_cues() {
        assert_eq!(route("Summarize my inbox"), Intent::SummarizeEmails);
        assert_eq!(route("give me a brief of my unread mail"), Intent::SummarizeEmails);
    }

    #[test]
    fn test_categorize_cues() {
        assert_eq!(route("Categorize my emails"), Intent::CategorizeEmails);
        assert_eq!(route("prioritize my messages"), Intent::CategorizeEmails);
    }

    #[test]
    fn test_check_verb_wins_over_later_rules() {
        assert_eq!(route("show me an overview of my inbox"), Intent::CheckEmails);
        assert_eq!(route("what are my priorities in my inbox"), Intent::CheckEmails);
        assert_eq!(route("check and categorize my emails"), Intent::CheckEmails);
    }

    #[test]
    fn test_summarize_wins_over_categorize() {
        assert_eq!(
            route("summarize and categorize my inbox"),
            Intent::SummarizeEmails
        );
    }

    #[test]
    fn test_no_topic_is_general() {
        assert_eq!(route("hello there"), Intent::General);
        assert_eq!(route("summarize the news"), Intent::General);
        assert_eq!(route(""), Intent::General);
    }

    #[test]
    fn test_general_replies() {
        assert_eq!(general_reply("Hello!"), GeneralReply::Greeting);
        assert_eq!(general_reply("what can you do?"), GeneralReply::Capabilities);
        assert_eq!(general_reply("I need help"), GeneralReply::Capabilities);
        assert_eq!(general_reply("random words"), GeneralReply::Fallback);
    }

    #[test]
    fn test_requested_count() {
        assert_eq!(requested_count("show my last 7 emails"), Some(7));
        assert_eq!(requested_count("show my 7 emails"), None);
        assert_eq!(requested_count("my last emails"), None);
    }
}
