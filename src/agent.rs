//! Intent handlers and the assembly of their output into an A2A task.

use crate::a2a::{Artifact, Message, TaskResult, TaskState, TaskStatus};
use crate::classifier::classify;
use crate::config::Limits;
use crate::error::Result;
use crate::models::{
    CategorizedEmail, Category, ClassifiedEmail, EmailRow, EmailSummary, Origin,
};
use crate::router::{self, GeneralReply, Intent};
use crate::source::Inbox;
use crate::summarizer::{self, DEFAULT_MAX_POINTS};
use std::fmt::Write as _;
use std::sync::Arc;

pub const EMAILS_ARTIFACT: &str = "emailAnalysis";
pub const CATEGORIZED_ARTIFACT: &str = "categorizedEmails";

pub const APOLOGY_TEXT: &str =
    "😔 Sorry, something went wrong while handling your request. Please try again in a moment.";

const CONNECT_HINT: &str = "\n💡 To connect your real Gmail: run `email-ethan --authorize`";

/// What a handler produced, before it is wrapped into a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub text: String,
    pub emails: Option<Vec<EmailRow>>,
    pub categorized: Option<Vec<EmailRow>>,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

pub struct EmailAgent {
    inbox: Arc<dyn Inbox>,
    limits: Limits,
}

impl EmailAgent {
    pub fn new(inbox: Arc<dyn Inbox>, limits: Limits) -> Self {
        Self { inbox, limits }
    }

    /// Runs one user turn. Never fails: pipeline errors become a `failed` task.
    pub async fn process_message(
        &self,
        user_text: &str,
        incoming: Message,
        task_id: Option<String>,
        context_id: Option<String>,
    ) -> TaskResult {
        let task_id = task_id.unwrap_or_else(new_id);
        let context_id = context_id.unwrap_or_else(new_id);

        let intent = router::route(user_text);
        tracing::info!(?intent, %task_id, %context_id, "processing message");

        let outcome = self
            .handle(intent, user_text)
            .await
            .and_then(|reply| assemble(&reply, &task_id, &context_id));

        let (state, message, artifacts) = match outcome {
            Ok((message, artifacts)) => (TaskState::Completed, message, artifacts),
            Err(e) => {
                tracing::error!(error = %e, %task_id, "failed to handle message");
                (
                    TaskState::Failed,
                    Message::agent_text(APOLOGY_TEXT, &task_id, &context_id),
                    Vec::new(),
                )
            }
        };

        TaskResult {
            id: task_id,
            context_id,
            status: TaskStatus {
                state,
                message: message.clone(),
                timestamp: Some(chrono::Utc::now().to_rfc3339()),
            },
            artifacts,
            history: vec![incoming, message],
            kind: "task".to_string(),
        }
    }

    pub async fn handle(&self, intent: Intent, user_text: &str) -> Result<Reply> {
        match intent {
            Intent::CheckEmails => self.check_emails(user_text).await,
            Intent::SummarizeEmails => self.summarize_emails().await,
            Intent::CategorizeEmails => self.categorize_emails().await,
            Intent::General => Ok(general_inquiry(user_text)),
        }
    }

    pub async fn check_emails(&self, user_text: &str) -> Result<Reply> {
        let max = router::requested_count(user_text).unwrap_or(self.limits.check);
        let fetched = self.inbox.fetch(max, true).await?;

        let classified: Vec<ClassifiedEmail> = fetched
            .emails
            .into_iter()
            .map(|email| {
                let info = classify(&email);
                ClassifiedEmail { email, info }
            })
            .collect();

        let count_of = |category: Category| {
            classified
                .iter()
                .filter(|e| e.info.category == category)
                .count()
        };

        let mut text = String::new();
        if classified.is_empty() {
            text.push_str("🎉 Your inbox is clean! No unread emails.\n");
        } else {
            let _ = write!(text, "📧 Found {} emails", classified.len());
            match fetched.origin {
                Origin::Live => text.push_str(" (from your Gmail) 📱\n"),
                Origin::Sample => text.push_str(" (demo data) 🎯\n"),
            }
            let _ = writeln!(
                text,
                "• {} urgent • {} important\n",
                count_of(Category::Urgent),
                count_of(Category::Important)
            );
            for email in classified.iter().take(3) {
                let icon = if email.info.category == Category::Urgent {
                    Category::Urgent.icon()
                } else {
                    Category::Important.icon()
                };
                let _ = writeln!(text, "{} {}", icon, email.email.subject);
            }
        }
        if fetched.origin == Origin::Sample {
            text.push_str(CONNECT_HINT);
        }

        let rows: Vec<EmailRow> = classified.into_iter().map(EmailRow::Classified).collect();
        Ok(Reply {
            text,
            emails: Some(rows.clone()),
            categorized: Some(rows),
        })
    }

    pub async fn summarize_emails(&self) -> Result<Reply> {
        let fetched = self.inbox.fetch(self.limits.summarize, true).await?;

        if fetched.emails.is_empty() {
            return Ok(Reply {
                text: "No emails to summarize. Your inbox is empty!".to_string(),
                emails: Some(Vec::new()),
                categorized: None,
            });
        }

        let summaries: Vec<EmailSummary> = fetched
            .emails
            .into_iter()
            .map(|email| {
                let summary = summarizer::summarize(&email.body, DEFAULT_MAX_POINTS);
                EmailSummary {
                    subject: email.subject,
                    from: email.from,
                    summary: summary.summary,
                    key_points: summary.key_points,
                }
            })
            .collect();

        let mut text = format!(
            "📋 Summary of your {} most recent emails:\n\n",
            summaries.len()
        );
        for (i, s) in summaries.iter().enumerate() {
            let _ = writeln!(text, "{}. **{}** (from {})", i + 1, s.subject, s.from);
            let _ = writeln!(text, "   {}", s.summary);
            if !s.key_points.is_empty() {
                let shown: Vec<&str> = s.key_points.iter().take(2).map(String::as_str).collect();
                let _ = writeln!(text, "   Key points: {}", shown.join("; "));
            }
            text.push('\n');
        }

        Ok(Reply {
            text,
            emails: Some(summaries.into_iter().map(EmailRow::Summary).collect()),
            categorized: None,
        })
    }

    pub async fn categorize_emails(&self) -> Result<Reply> {
        let fetched = self.inbox.fetch(self.limits.categorize, true).await?;

        let categorized: Vec<CategorizedEmail> = fetched
            .emails
            .iter()
            .map(|email| {
                let info = classify(email);
                CategorizedEmail {
                    subject: email.subject.clone(),
                    from: email.from.clone(),
                    category: info.category,
                    priority: info.priority,
                    action_required: info.action_required,
                }
            })
            .collect();

        // Groups keep first-seen order.
        let mut groups: Vec<(Category, Vec<&CategorizedEmail>)> = Vec::new();
        for email in &categorized {
            match groups.iter_mut().find(|(c, _)| *c == email.category) {
                Some((_, members)) => members.push(email),
                None => groups.push((email.category, vec![email])),
            }
        }

        let mut text = String::from("🏷️ Email Categories:\n");
        for (category, members) in &groups {
            let _ = writeln!(
                text,
                "\n{} ({}):",
                category.as_str().to_uppercase(),
                members.len()
            );
            for email in members.iter().take(2) {
                let _ = writeln!(text, "• {}", email.subject);
            }
        }

        Ok(Reply {
            text,
            emails: None,
            categorized: Some(categorized.into_iter().map(EmailRow::Categorized).collect()),
        })
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn general_inquiry(user_text: &str) -> Reply {
    match router::general_reply(user_text) {
        GeneralReply::Capabilities => Reply::text(CAPABILITIES_TEXT),
        GeneralReply::Greeting => Reply::text(GREETING_TEXT),
        GeneralReply::Fallback => Reply::text(format!(
            "🤔 I'm not sure what you meant by '{}'\n\n{}",
            user_text, FALLBACK_TEXT
        )),
    }
}

/// Turns a handler reply into the outgoing message and its artifacts.
pub fn assemble(
    reply: &Reply,
    task_id: &str,
    context_id: &str,
) -> Result<(Message, Vec<Artifact>)> {
    let message = Message::agent_text(reply.text.clone(), task_id, context_id);

    let mut artifacts = Vec::new();
    if let Some(emails) = &reply.emails {
        artifacts.push(Artifact::data(
            EMAILS_ARTIFACT,
            serde_json::json!({ "emails": serde_json::to_value(emails)? }),
        ));
    }
    if let Some(categorized) = &reply.categorized {
        artifacts.push(Artifact::data(
            CATEGORIZED_ARTIFACT,
            serde_json::json!({ "categorized": serde_json::to_value(categorized)? }),
        ));
    }

    Ok((message, artifacts))
}

const GREETING_TEXT: &str = "👋 Hey there! I'm Email Ethan, your email assistant!\n\n\
I can help you:\n\
• Check unread emails\n\
• Summarize your inbox\n\
• Categorize emails by priority\n\n\
Try asking: 'Check my emails' or 'What's in my inbox?'";

const CAPABILITIES_TEXT: &str = "🤖 **I'm Email Ethan - Your AI Email Assistant!**\n\n\
Here's what I can do:\n\n\
📋 **Email Management**\n\
• Check and count unread emails\n\
• Categorize by urgency (🚨 Urgent, 📌 Important, 📰 Newsletter)\n\
• Summarize long emails into key points\n\
• Identify action-required messages\n\n\
🔧 **How to use me:**\n\
Just ask naturally!\n\
• 'Check my emails'\n\
• 'What's in my inbox?'\n\
• 'Summarize my unread messages'\n\
• 'Show me urgent emails'\n\n\
I work with demo data by default, but can connect to your real Gmail if you want!";

const FALLBACK_TEXT: &str = "I'm Email Ethan - I specialize in email management! \
Here's what I can help with:\n\n\
📧 **Email Commands:**\n\
• 'Check my unread emails'\n\
• 'Summarize my inbox'\n\
• 'Categorize my emails'\n\
• 'What's urgent in my inbox?'\n\n\
💡 **Just say 'emails' or 'inbox' and I'll jump right in!**";
