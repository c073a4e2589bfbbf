//! Session state and the event boundary
//!
//! A [`Session`] is a plain value. [`Session::handle`] takes the current
//! session and an [`Event`] and returns the next session; on error the caller
//! keeps the one it has, so a failed round-trip never leaves a half-updated
//! transcript or ladder behind.

use super::error::CoachError;
use super::gateway::InferenceGateway;
use super::image::CodeImage;
use super::ladder::HintLadder;
use super::orchestrator::{answer_question, assess_and_hint, assessment_body, AssessmentRequest};
use super::transcript::Transcript;
use crate::config::{Config, DEFAULT_HISTORY_MAX_CHARS, DEFAULT_PROBLEM};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Discrete user actions from the presentation layer
#[derive(Debug, Clone)]
pub enum Event {
    /// Assess the uploaded code image. `None` fields keep the current values.
    Initialize {
        problem: Option<String>,
        image: Option<CodeImage>,
    },
    /// Replace the code image without reassessing
    UploadImage(CodeImage),
    SetProblem(String),
    ReviseCode(String),
    AskQuestion(String),
    RequestMoreSpecific,
    Reset,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Initialize { .. } => "initialize",
            Event::UploadImage(_) => "upload_image",
            Event::SetProblem(_) => "set_problem",
            Event::ReviseCode(_) => "revise_code",
            Event::AskQuestion(_) => "ask_question",
            Event::RequestMoreSpecific => "request_more_specific",
            Event::Reset => "reset",
        }
    }
}

/// What the presentation layer renders after each event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub assessment_text: String,
    pub assessment_body: String,
    pub hints: Vec<String>,
    pub level: usize,
    pub current_hint: String,
    pub initialized: bool,
    pub last_answer: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    default_problem: String,
    history_window: usize,
    problem: String,
    transcript: Transcript,
    image: Option<CodeImage>,
    assessment_text: String,
    ladder: HintLadder,
    initialized: bool,
    last_answer: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_PROBLEM, DEFAULT_HISTORY_MAX_CHARS)
    }
}

impl Session {
    pub fn new(default_problem: impl Into<String>, history_window: usize) -> Self {
        let default_problem = default_problem.into();
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            problem: default_problem.clone(),
            default_problem,
            history_window,
            transcript: Transcript::new(),
            image: None,
            assessment_text: String::new(),
            ladder: HintLadder::default(),
            initialized: false,
            last_answer: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.default_problem.clone(), config.history_max_chars)
    }

    /// Process one event to completion and return the next session.
    pub async fn handle<G>(&self, gateway: &G, event: Event) -> Result<Session, CoachError>
    where
        G: InferenceGateway + ?Sized,
    {
        info!(
            session = %self.id,
            created_at = %self.created_at,
            transcript_chars = self.transcript.len_chars(),
            event = event.name(),
            "handling event"
        );

        let mut next = self.clone();
        next.last_answer = None;

        match event {
            Event::Initialize { problem, image } => {
                if let Some(problem) = problem {
                    next.problem = non_blank(problem, "problem")?;
                }
                if let Some(image) = image {
                    next.image = Some(image);
                }
                next.initialize(gateway).await?;
            }
            Event::UploadImage(image) => next.image = Some(image),
            Event::SetProblem(problem) => next.problem = non_blank(problem, "problem")?,
            Event::ReviseCode(code) => {
                let code = non_blank(code, "revised code")?;
                next.ensure_initialized()?;
                next.revise(gateway, &code).await?;
            }
            Event::AskQuestion(question) => {
                let question = non_blank(question, "question")?;
                next.ensure_initialized()?;
                next.ask(gateway, &question).await?;
            }
            Event::RequestMoreSpecific => {
                next.ensure_initialized()?;
                let hint = next.ladder.escalate();
                next.transcript.append(&format!(
                    "[T] Student requests more specific hint.\n[T] Coach hint (level {}): {}\n",
                    next.ladder.level(),
                    hint
                ));
            }
            Event::Reset => {
                next = Self::new(self.default_problem.clone(), self.history_window);
            }
        }

        Ok(next)
    }

    async fn initialize<G>(&mut self, gateway: &G) -> Result<(), CoachError>
    where
        G: InferenceGateway + ?Sized,
    {
        let image = self.image.clone().ok_or(CoachError::MissingImage)?;
        let assessment = assess_and_hint(
            gateway,
            AssessmentRequest {
                problem: &self.problem,
                image: &image,
                history: self.transcript.read(self.history_window),
                revised_code: None,
            },
        )
        .await?;

        let entry_body = assessment.body().to_string();
        self.assessment_text = assessment.raw;
        self.ladder.replace(assessment.hints);
        self.initialized = true;
        self.transcript.append(&format!(
            "\n[T0] Initial code from image.\n[T0] Code assessment:\n{}\n[T0] Coach hint (level 1): {}\n",
            entry_body,
            self.ladder.hint_at(1)
        ));
        Ok(())
    }

    async fn revise<G>(&mut self, gateway: &G, code: &str) -> Result<(), CoachError>
    where
        G: InferenceGateway + ?Sized,
    {
        let image = self.image.clone().ok_or(CoachError::MissingImage)?;
        let mut staged = self.transcript.clone();
        staged.append(&format!("[T] Student revised code:\n{}\n", code));

        let assessment = assess_and_hint(
            gateway,
            AssessmentRequest {
                problem: &self.problem,
                image: &image,
                history: staged.read(self.history_window),
                revised_code: Some(code),
            },
        )
        .await?;

        let entry_body = assessment.body().to_string();
        self.assessment_text = assessment.raw;
        self.ladder.replace(assessment.hints);
        staged.append(&format!(
            "[T] Code assessment:\n{}\n[T] Coach hint (level 1): {}\n",
            entry_body,
            self.ladder.hint_at(1)
        ));
        self.transcript = staged;
        Ok(())
    }

    async fn ask<G>(&mut self, gateway: &G, question: &str) -> Result<(), CoachError>
    where
        G: InferenceGateway + ?Sized,
    {
        let image = self.image.clone().ok_or(CoachError::MissingImage)?;
        let mut staged = self.transcript.clone();
        staged.append(&format!("[T] Student asks: {}\n", question));

        let answer = answer_question(
            gateway,
            staged.read(self.history_window),
            question,
            &image,
        )
        .await?;

        staged.append(&format!("[T] Coach answers: {}\n", answer));
        self.transcript = staged;
        self.last_answer = Some(answer);
        Ok(())
    }

    fn ensure_initialized(&self) -> Result<(), CoachError> {
        if self.initialized {
            Ok(())
        } else {
            Err(CoachError::NotInitialized)
        }
    }

    pub fn view(&self) -> ViewModel {
        ViewModel {
            assessment_text: self.assessment_text.clone(),
            assessment_body: assessment_body(&self.assessment_text).to_string(),
            hints: self.ladder.hints().to_vec(),
            level: self.ladder.level(),
            current_hint: self.ladder.current().to_string(),
            initialized: self.initialized,
            last_answer: self.last_answer.clone(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn image(&self) -> Option<&CodeImage> {
        self.image.as_ref()
    }

    pub fn ladder(&self) -> &HintLadder {
        &self.ladder
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

fn non_blank(text: String, field: &'static str) -> Result<String, CoachError> {
    if text.trim().is_empty() {
        Err(CoachError::InvalidInput { field })
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::gateway::stub::ScriptedGateway;
    use crate::coach::image::sample_png;
    use crate::coach::ladder::{EXHAUSTED_MESSAGE, NO_HINT_MESSAGE};
    use crate::coach::models::GenProfile;

    const GOOD_OUTPUT: &str = "[ASSESSMENT]\nLooks okay\n[HINTS]\n1) Check bounds\n2) Check the increment\n3) Verify loop exits correctly";

    fn initialize_event() -> Event {
        Event::Initialize {
            problem: Some("Sum a list".to_string()),
            image: Some(sample_png()),
        }
    }

    async fn initialized_session(gateway: &ScriptedGateway) -> Session {
        gateway.queue_text(GOOD_OUTPUT);
        Session::default()
            .handle(gateway, initialize_event())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_initialize_end_to_end() {
        let gateway = ScriptedGateway::new();
        let session = initialized_session(&gateway).await;
        let view = session.view();

        assert_eq!(
            view.hints,
            vec!["Check bounds", "Check the increment", "Verify loop exits correctly"]
        );
        assert_eq!(view.level, 1);
        assert_eq!(view.current_hint, "Check bounds");
        assert!(view.initialized);
        assert_eq!(view.assessment_text, GOOD_OUTPUT);
        assert_eq!(view.assessment_body, "Looks okay");
        assert_eq!(session.problem(), "Sum a list");
        assert_eq!(
            session.transcript().full(),
            "\n[T0] Initial code from image.\n[T0] Code assessment:\nLooks okay\n[T0] Coach hint (level 1): Check bounds\n"
        );

        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].prompt.starts_with("Sum a list\n\n"));
    }

    #[tokio::test]
    async fn test_blank_question_rejected_without_model_call() {
        let gateway = ScriptedGateway::new();
        let session = initialized_session(&gateway).await;
        let before = session.transcript().clone();

        let err = session
            .handle(&gateway, Event::AskQuestion("   ".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, CoachError::InvalidInput { field: "question" }));
        assert_eq!(gateway.call_count(), 1);
        assert_eq!(session.transcript(), &before);
    }

    #[tokio::test]
    async fn test_blank_revision_rejected() {
        let gateway = ScriptedGateway::new();
        let session = initialized_session(&gateway).await;

        let err = session
            .handle(&gateway, Event::ReviseCode("\n\t ".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::InvalidInput { .. }));
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_chat_requires_initialization() {
        let gateway = ScriptedGateway::new();
        let session = Session::default();

        for event in [
            Event::AskQuestion("why?".to_string()),
            Event::ReviseCode("move 10 steps".to_string()),
            Event::RequestMoreSpecific,
        ] {
            let err = session.handle(&gateway, event).await.unwrap_err();
            assert!(matches!(err, CoachError::NotInitialized));
        }
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_initialize_without_image() {
        let gateway = ScriptedGateway::new();
        let err = Session::default()
            .handle(
                &gateway,
                Event::Initialize {
                    problem: None,
                    image: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoachError::MissingImage));
        assert_eq!(gateway.call_count(), 0);
    }

    #[tokio::test]
    async fn test_uploaded_image_used_by_initialize() {
        let gateway = ScriptedGateway::with_responses([GOOD_OUTPUT]);
        let session = Session::default()
            .handle(&gateway, Event::UploadImage(sample_png()))
            .await
            .unwrap();
        assert!(session.image().is_some());
        assert!(!session.is_initialized());
        assert_eq!(gateway.call_count(), 0);

        let session = session
            .handle(
                &gateway,
                Event::Initialize {
                    problem: None,
                    image: None,
                },
            )
            .await
            .unwrap();
        assert!(session.is_initialized());
        assert!(gateway.calls()[0].prompt.starts_with(DEFAULT_PROBLEM));
    }

    #[tokio::test]
    async fn test_more_specific_escalates_and_logs() {
        let gateway = ScriptedGateway::new();
        let session = initialized_session(&gateway).await;

        let session = session
            .handle(&gateway, Event::RequestMoreSpecific)
            .await
            .unwrap();
        assert_eq!(session.view().level, 2);
        assert_eq!(session.view().current_hint, "Check the increment");
        assert!(session.transcript().full().ends_with(
            "[T] Student requests more specific hint.\n[T] Coach hint (level 2): Check the increment\n"
        ));

        let session = session
            .handle(&gateway, Event::RequestMoreSpecific)
            .await
            .unwrap();
        let session = session
            .handle(&gateway, Event::RequestMoreSpecific)
            .await
            .unwrap();

        let view = session.view();
        assert_eq!(view.level, 3);
        assert_eq!(view.current_hint, EXHAUSTED_MESSAGE);
        assert!(session
            .transcript()
            .full()
            .ends_with(&format!("[T] Coach hint (level 3): {}\n", EXHAUSTED_MESSAGE)));
        assert_eq!(gateway.call_count(), 1);
    }

    #[tokio::test]
    async fn test_revision_resets_ladder_and_records_turns() {
        let gateway = ScriptedGateway::new();
        let session = initialized_session(&gateway).await;
        let session = session
            .handle(&gateway, Event::RequestMoreSpecific)
            .await
            .unwrap();
        let session = session
            .handle(&gateway, Event::RequestMoreSpecific)
            .await
            .unwrap();
        let session = session
            .handle(&gateway, Event::RequestMoreSpecific)
            .await
            .unwrap();
        assert!(session.ladder().hint_override().is_some());

        gateway.queue_text("[ASSESSMENT]\nCloser now\n[HINTS]\n1) Start the sum at 0");
        let session = session
            .handle(&gateway, Event::ReviseCode("set sum to 1".to_string()))
            .await
            .unwrap();

        let view = session.view();
        assert_eq!(view.level, 1);
        assert_eq!(view.hints, vec!["Start the sum at 0"]);
        assert_eq!(view.current_hint, "Start the sum at 0");
        assert_eq!(session.ladder().hint_override(), None);
        assert!(session.transcript().full().ends_with(
            "[T] Student revised code:\nset sum to 1\n[T] Code assessment:\nCloser now\n[T] Coach hint (level 1): Start the sum at 0\n"
        ));

        let calls = gateway.calls();
        let revise_prompt = &calls[1].prompt;
        assert!(revise_prompt.contains("[T] Student revised code:\nset sum to 1"));
        assert!(revise_prompt.contains("[CURRENT STUDENT CODE - TEXT]\nset sum to 1"));
    }

    #[tokio::test]
    async fn test_question_answer_recorded() {
        let gateway = ScriptedGateway::new();
        let session = initialized_session(&gateway).await;

        gateway.queue_text(" Count how many times the loop runs. \n");
        let session = session
            .handle(&gateway, Event::AskQuestion("How do I check it?".to_string()))
            .await
            .unwrap();

        assert_eq!(
            session.view().last_answer.as_deref(),
            Some("Count how many times the loop runs.")
        );
        assert!(session.transcript().full().ends_with(
            "[T] Student asks: How do I check it?\n[T] Coach answers: Count how many times the loop runs.\n"
        ));
        let calls = gateway.calls();
        assert_eq!(calls[1].profile, GenProfile::Answer);
        assert!(calls[1].prompt.contains("[T] Student asks: How do I check it?"));

        let session = session
            .handle(&gateway, Event::RequestMoreSpecific)
            .await
            .unwrap();
        assert_eq!(session.view().last_answer, None);
    }

    #[tokio::test]
    async fn test_failed_question_leaves_session_untouched() {
        let gateway = ScriptedGateway::new();
        let session = initialized_session(&gateway).await;
        let before = session.transcript().clone();

        gateway.queue_error("model crashed");
        let result = session
            .handle(&gateway, Event::AskQuestion("Why?".to_string()))
            .await;

        assert!(matches!(result, Err(CoachError::Inference(_))));
        assert_eq!(session.transcript(), &before);
        assert_eq!(session.view().last_answer, None);
    }

    #[tokio::test]
    async fn test_failed_revision_keeps_previous_ladder() {
        let gateway = ScriptedGateway::new();
        let session = initialized_session(&gateway).await;
        let session = session
            .handle(&gateway, Event::RequestMoreSpecific)
            .await
            .unwrap();

        gateway.queue_error("timeout");
        assert!(session
            .handle(&gateway, Event::ReviseCode("new code".to_string()))
            .await
            .is_err());

        assert_eq!(session.view().level, 2);
        assert!(!session.transcript().full().contains("new code"));
    }

    #[tokio::test]
    async fn test_no_hints_after_fallback_uses_default_message() {
        let gateway = ScriptedGateway::with_responses(["[ASSESSMENT]\nHard to read.", "sorry"]);
        let session = Session::default()
            .handle(&gateway, initialize_event())
            .await
            .unwrap();

        let view = session.view();
        assert!(view.initialized);
        assert!(view.hints.is_empty());
        assert_eq!(view.current_hint, NO_HINT_MESSAGE);
        assert_eq!(gateway.call_count(), 2);
        assert!(session
            .transcript()
            .full()
            .contains(&format!("[T0] Coach hint (level 1): {}", NO_HINT_MESSAGE)));
    }

    #[tokio::test]
    async fn test_history_window_bounds_prompt() {
        let gateway = ScriptedGateway::new();
        let session = Session::new("Sum a list", 40);
        let session = session
            .handle(&gateway, Event::UploadImage(sample_png()))
            .await
            .unwrap();
        gateway.queue_text(GOOD_OUTPUT);
        let session = session
            .handle(
                &gateway,
                Event::Initialize {
                    problem: None,
                    image: None,
                },
            )
            .await
            .unwrap();

        gateway.queue_text("An answer.");
        session
            .handle(&gateway, Event::AskQuestion("What next?".to_string()))
            .await
            .unwrap();

        let prompt = &gateway.calls()[1].prompt;
        assert!(!prompt.contains("[T0] Initial code from image."));
        assert!(prompt.contains("[T] Student asks: What next?"));
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let gateway = ScriptedGateway::new();
        let session = initialized_session(&gateway).await;
        let old_id = session.id();

        let session = session.handle(&gateway, Event::Reset).await.unwrap();

        let view = session.view();
        assert!(!view.initialized);
        assert!(view.hints.is_empty());
        assert_eq!(view.level, 1);
        assert_eq!(view.assessment_text, "");
        assert!(session.transcript().is_empty());
        assert!(session.image().is_none());
        assert_eq!(session.problem(), DEFAULT_PROBLEM);
        assert_ne!(session.id(), old_id);
    }

    #[tokio::test]
    async fn test_creation_time_carried_until_reset() {
        let gateway = ScriptedGateway::new();
        let session = initialized_session(&gateway).await;
        let created_at = session.created_at();

        let session = session
            .handle(&gateway, Event::RequestMoreSpecific)
            .await
            .unwrap();
        let session = session
            .handle(&gateway, Event::SetProblem("Count to ten".to_string()))
            .await
            .unwrap();
        assert_eq!(session.created_at(), created_at);

        std::thread::sleep(std::time::Duration::from_millis(5));
        let session = session.handle(&gateway, Event::Reset).await.unwrap();
        assert!(session.created_at() > created_at);
    }

    #[tokio::test]
    async fn test_failed_initialize_keeps_session() {
        let gateway = ScriptedGateway::new();
        let session = Session::default()
            .handle(&gateway, Event::UploadImage(sample_png()))
            .await
            .unwrap();

        gateway.queue_error("model unavailable");
        let result = session.handle(&gateway, initialize_event()).await;

        assert!(matches!(result, Err(CoachError::Inference(_))));
        assert_eq!(gateway.call_count(), 1);
        assert!(!session.is_initialized());
        assert_eq!(session.problem(), DEFAULT_PROBLEM);
        assert!(session.transcript().is_empty());
        assert_eq!(session.view().assessment_text, "");
        assert!(session.view().hints.is_empty());
    }

    #[tokio::test]
    async fn test_set_problem_rejects_blank() {
        let gateway = ScriptedGateway::new();
        let session = Session::default();

        let session = session
            .handle(&gateway, Event::SetProblem("Count to ten".to_string()))
            .await
            .unwrap();
        assert_eq!(session.problem(), "Count to ten");

        assert!(matches!(
            session
                .handle(&gateway, Event::SetProblem(" ".to_string()))
                .await,
            Err(CoachError::InvalidInput { field: "problem" })
        ));
    }
}
