// Support widgets: FAQ search and the contact form.
use async_trait::async_trait;

use crate::{Error, Result};

/// One FAQ entry.
#[derive(Debug, Clone)]
pub struct HelpTopic {
    pub question: String,
    pub answer: String,
}

/// Case-insensitive substring search over question and answer text.
/// An empty or whitespace term returns the full list; order is preserved.
pub fn search_topics<'a>(topics: &'a [HelpTopic], term: &str) -> Vec<&'a HelpTopic> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return topics.iter().collect();
    }
    topics
        .iter()
        .filter(|t| {
            t.question.to_lowercase().contains(&term) || t.answer.to_lowercase().contains(&term)
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// All four fields are required; reports every missing one at once so
    /// the user fixes the form in a single pass.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
        ] {
            if value.trim().is_empty() {
                missing.push(field);
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Delivery seam for the contact form, so tests can observe that an
/// invalid form never reaches the network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactSink: Send + Sync {
    async fn deliver(&self, form: ContactForm) -> Result<()>;
}

/// Validate first; the sink is only touched once the form passes.
pub async fn submit_contact(form: &ContactForm, sink: &dyn ContactSink) -> Result<()> {
    form.validate()?;
    sink.deliver(form.clone()).await
}
