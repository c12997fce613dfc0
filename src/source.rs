use crate::error::{self, AgentError};
use crate::models::{EmailRecord, Origin};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Anything that can hand back a bounded batch of emails.
#[async_trait]
pub trait EmailSource: Send + Sync {
    /// At most `max_results` records; when `unread_only` the unread filter
    /// is applied before truncation.
    async fn fetch(&self, max_results: usize, unread_only: bool) -> Result<Vec<EmailRecord>>;

    fn origin(&self) -> Origin;
}

/// How the live/sample decision is made, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Live when a stored Gmail token exists, sample otherwise.
    #[default]
    Auto,
    Live,
    Sample,
}

impl std::str::FromStr for SourceMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "live" => Ok(Self::Live),
            "sample" => Ok(Self::Sample),
            other => Err(format!("unknown source mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SampleSource {
    emails: Vec<EmailRecord>,
}

impl Default for SampleSource {
    fn default() -> Self {
        Self::new(sample_emails())
    }
}

impl SampleSource {
    pub fn new(emails: Vec<EmailRecord>) -> Self {
        Self { emails }
    }

    pub fn select(&self, max_results: usize, unread_only: bool) -> Vec<EmailRecord> {
        self.emails
            .iter()
            .filter(|e| !unread_only || !e.read)
            .take(max_results)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EmailSource for SampleSource {
    async fn fetch(&self, max_results: usize, unread_only: bool) -> Result<Vec<EmailRecord>> {
        Ok(self.select(max_results, unread_only))
    }

    fn origin(&self) -> Origin {
        Origin::Sample
    }
}

/// The result of a fetch through [`FallbackSource`].
#[derive(Debug, Clone)]
pub struct Fetched {
    pub emails: Vec<EmailRecord>,
    pub origin: Origin,
}

/// What the agent reads mail through.
#[async_trait]
pub trait Inbox: Send + Sync {
    async fn fetch(&self, max_results: usize, unread_only: bool) -> error::Result<Fetched>;
}

/// Tries the live source first and quietly serves sample data when it fails.
///
/// A strict source reports live failures instead of falling back.
#[derive(Clone)]
pub struct FallbackSource {
    live: Option<Arc<dyn EmailSource>>,
    sample: SampleSource,
    strict: bool,
}

impl FallbackSource {
    pub fn new(live: Option<Arc<dyn EmailSource>>, sample: SampleSource) -> Self {
        Self {
            live,
            sample,
            strict: false,
        }
    }

    pub fn strict(live: Arc<dyn EmailSource>) -> Self {
        Self {
            live: Some(live),
            sample: SampleSource::default(),
            strict: true,
        }
    }

    pub fn sample_only() -> Self {
        Self::new(None, SampleSource::default())
    }

    pub fn has_live(&self) -> bool {
        self.live.is_some()
    }
}

#[async_trait]
impl Inbox for FallbackSource {
    async fn fetch(&self, max_results: usize, unread_only: bool) -> error::Result<Fetched> {
        if let Some(live) = &self.live {
            match live.fetch(max_results, unread_only).await {
                Ok(emails) => {
                    tracing::debug!(count = emails.len(), "fetched emails from live source");
                    return Ok(Fetched {
                        emails,
                        origin: live.origin(),
                    });
                }
                Err(e) if self.strict => return Err(AgentError::Source(e)),
                Err(e) => {
                    tracing::warn!(
                        error = %format!("{:#}", e),
                        "live fetch failed, using sample data"
                    );
                }
            }
        }

        Ok(Fetched {
            emails: self.sample.select(max_results, unread_only),
            origin: Origin::Sample,
        })
    }
}

fn sample(
    id: &str,
    from: &str,
    subject: &str,
    snippet: &str,
    body: &str,
    date: &str,
) -> EmailRecord {
    EmailRecord {
        id: id.to_string(),
        from: from.to_string(),
        subject: subject.to_string(),
        snippet: snippet.to_string(),
        body: body.to_string(),
        date: date.to_string(),
        read: false,
    }
}

pub fn sample_emails() -> Vec<EmailRecord> {
    vec![
        sample(
            "1",
            "accounting@company.com",
            "URGENT: Invoice #1234 Overdue",
            "Your invoice payment is 30 days overdue. Please process immediately.",
            "Dear Customer, Your invoice #1234 for $1,500 is 30 days overdue...",
            "2024-01-15T09:00:00Z",
        ),
        sample(
            "2",
            "manager@company.com",
            "Meeting Reschedule Request",
            "Can we move our 2pm meeting to 3pm? Let me know if that works.",
            "Hi team, Due to a conflict, I need to reschedule our 2pm meeting...",
            "2024-01-15T08:30:00Z",
        ),
        sample(
            "3",
            "newsletter@technews.com",
            "Weekly Tech Digest - AI Trends 2024",
            "This week: New AI breakthroughs, developer tools, and industry insights",
            "Welcome to your weekly tech digest! Here are the top stories...",
            "2024-01-15T07:00:00Z",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSource;

    #[async_trait]
    impl EmailSource for BrokenSource {
        async fn fetch(&self, _: usize, _: bool) -> Result<Vec<EmailRecord>> {
            anyhow::bail!("connection refused")
        }

        fn origin(&self) -> Origin {
            Origin::Live
        }
    }

    struct FixedLive(Vec<EmailRecord>);

    #[async_trait]
    impl EmailSource for FixedLive {
        async fn fetch(&self, max_results: usize, _: bool) -> Result<Vec<EmailRecord>> {
            Ok(self.0.iter().take(max_results).cloned().collect())
        }

        fn origin(&self) -> Origin {
            Origin::Live
        }
    }

    #[test]
    fn test_unread_filter_runs_before_truncation() {
        let mut emails = sample_emails();
        emails[0].read = true;
        let source = SampleSource::new(emails);

        let picked = source.select(2, true);
        let ids: Vec<&str> = picked.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);

        assert_eq!(source.select(2, false).len(), 2);
        assert_eq!(source.select(0, true).len(), 0);
    }

    #[tokio::test]
    async fn test_fallback_on_live_failure() {
        let source = FallbackSource::new(Some(Arc::new(BrokenSource)), SampleSource::default());
        let fetched = source.fetch(5, true).await.unwrap();
        assert_eq!(fetched.origin, Origin::Sample);
        assert_eq!(fetched.emails, sample_emails());
    }

    #[tokio::test]
    async fn test_strict_source_reports_live_failure() {
        let source = FallbackSource::strict(Arc::new(BrokenSource));
        let err = source.fetch(5, true).await.unwrap_err();
        assert!(matches!(err, AgentError::Source(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_live_result_is_used_when_available() {
        let live = sample(
            "g1",
            "friend@gmail.com",
            "Lunch?",
            "",
            "Lunch tomorrow?",
            "2024-02-01T12:00:00Z",
        );
        let source = FallbackSource::new(
            Some(Arc::new(FixedLive(vec![live.clone()]))),
            SampleSource::default(),
        );
        let fetched = source.fetch(5, true).await.unwrap();
        assert_eq!(fetched.origin, Origin::Live);
        assert_eq!(fetched.emails, vec![live]);
    }

    #[tokio::test]
    async fn test_sample_only_never_reports_live() {
        let source = FallbackSource::sample_only();
        assert!(!source.has_live());
        let fetched = source.fetch(1, true).await.unwrap();
        assert_eq!(fetched.origin, Origin::Sample);
        assert_eq!(fetched.emails.len(), 1);
    }

    #[test]
    fn test_source_mode_parsing() {
        assert_eq!("LIVE".parse::<SourceMode>(), Ok(SourceMode::Live));
        assert_eq!(" sample ".parse::<SourceMode>(), Ok(SourceMode::Sample));
        assert!("gmail".parse::<SourceMode>().is_err());
    }
}
