// One submission of the interest form: validate, echo, wait on the source, render the outcome.

use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::chat::{Chat, Role};
use crate::client::{SuggestionSource, Suggestions};
use crate::form::InterestForm;
use crate::opportunity::Opportunity;

pub const LOADING_TEXT: &str = "Please wait a moment, I'm looking up the information...";
pub const FOUND_TEXT: &str = "I found some opportunities that may interest you!";
pub const NONE_FOUND_TEXT: &str =
    "I couldn't find opportunities matching your criteria right now. Try refining your search.";
pub const REPHRASE_TEXT: &str =
    "I couldn't get a useful answer for that profile. Try rephrasing your interests or skills.";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// The validated form, when the submission got past validation.
    pub submitted: Option<InterestForm>,
    pub show_contact: bool,
    /// `None` leaves the suggestion area untouched; `Some(vec![])` shows the empty placeholder.
    pub opportunities: Option<Vec<Opportunity>>,
}

#[instrument(skip_all)]
pub async fn submit(chat: &Mutex<Chat>, source: &SuggestionSource, form: &InterestForm) -> Outcome {
    // Validation failures never reach the source
    let form = match form.validate() {
        Ok(form) => form,
        Err(e) => {
            info!(missing = ?e.missing, "Rejected incomplete submission");
            chat.lock().await.append(
                format!("Please fill in every field. Missing: {}.", e.labels().join(", ")),
                Role::Error,
            );
            return Outcome::default();
        }
    };

    // Echo the input and show the placeholder; the lock is released before the request
    {
        let mut chat = chat.lock().await;
        chat.append(form.summary(), Role::User);
        chat.append(LOADING_TEXT, Role::Loading);
    }

    let result = source.fetch(&form).await;

    // The placeholder goes away whatever the result
    let mut chat = chat.lock().await;
    chat.remove(Role::Loading);

    let mut outcome = Outcome {
        submitted: Some(form),
        ..Outcome::default()
    };
    match result {
        Ok(Suggestions::Text(Some(text))) => {
            chat.append(text, Role::Assistant);
            outcome.show_contact = true;
        }
        // Backend answered but said nothing useful
        Ok(Suggestions::Text(None)) => {
            chat.append(REPHRASE_TEXT, Role::Info);
        }
        Ok(Suggestions::Opportunities(opportunities)) => {
            if opportunities.is_empty() {
                chat.append(NONE_FOUND_TEXT, Role::Assistant);
            } else {
                chat.append(FOUND_TEXT, Role::Assistant);
                outcome.show_contact = true;
            }
            outcome.opportunities = Some(opportunities);
        }
        // Backend errors and connectivity errors both end as one error message
        Err(e) => {
            warn!(error = %e, "Suggestion request failed");
            chat.append(e.chat_text(), Role::Error);
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockSource;
    use std::sync::Arc;
    use std::time::Duration;

    fn form() -> InterestForm {
        InterestForm {
            interests: "animals".to_string(),
            skills: "driving".to_string(),
            contribution_method: "weekends".to_string(),
            location: "Campinas".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_field_yields_single_error() {
        let chat = Mutex::new(Chat::new());
        let source = SuggestionSource::Mock(MockSource::new(Duration::ZERO));
        let mut f = form();
        f.interests = "  ".to_string();

        let outcome = submit(&chat, &source, &f).await;

        let chat = chat.lock().await;
        assert_eq!(chat.len(), 1);
        assert_eq!(chat.messages()[0].role, Role::Error);
        assert!(chat.messages()[0].text.contains("causes that motivate you"));
        assert_eq!(outcome, Outcome::default());
    }

    #[tokio::test]
    async fn test_mock_source_renders_opportunities() {
        let chat = Mutex::new(Chat::new());
        let source = SuggestionSource::Mock(MockSource::new(Duration::ZERO));

        let outcome = submit(&chat, &source, &form()).await;

        let chat = chat.lock().await;
        let roles: Vec<Role> = chat.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(chat.messages()[1].text, FOUND_TEXT);
        assert_eq!(outcome.opportunities.unwrap().len(), 3);
        assert!(outcome.show_contact);
    }

    #[tokio::test]
    async fn test_empty_mock_list_shows_none_found() {
        let chat = Mutex::new(Chat::new());
        let mut mock = MockSource::new(Duration::ZERO);
        mock.opportunities.clear();
        let source = SuggestionSource::Mock(mock);

        let outcome = submit(&chat, &source, &form()).await;

        let chat = chat.lock().await;
        assert_eq!(chat.messages().last().unwrap().text, NONE_FOUND_TEXT);
        assert_eq!(chat.count(Role::Loading), 0);
        assert_eq!(outcome.opportunities, Some(vec![]));
        assert!(!outcome.show_contact);
    }

    #[tokio::test]
    async fn test_loading_placeholder_visible_while_waiting() {
        let chat = Arc::new(Mutex::new(Chat::new()));
        let source = SuggestionSource::Mock(MockSource::new(Duration::from_millis(300)));

        let shared = chat.clone();
        let pending = tokio::spawn(async move { submit(&shared, &source, &form()).await });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(chat.lock().await.count(Role::Loading), 1);

        pending.await.unwrap();
        assert_eq!(chat.lock().await.count(Role::Loading), 0);
    }
}
