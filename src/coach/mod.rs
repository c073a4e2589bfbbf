//! Conversation state and hint escalation
//!
//! The model is driven through a fixed protocol: an assessment prompt that
//! asks for a `[HINTS]` block, a fallback prompt when no hints could be
//! parsed, and a question-answer prompt for free-form chat.

pub mod client;
pub mod error;
pub mod gateway;
pub mod image;
pub mod ladder;
pub mod models;
pub mod orchestrator;
pub mod parse;
pub mod prompts;
pub mod session;
pub mod transcript;

pub use client::HttpGateway;
pub use error::{CoachError, ImageError, InferenceError};
pub use gateway::{GatewayFuture, InferenceGateway};
pub use image::CodeImage;
pub use ladder::HintLadder;
pub use models::GenProfile;
pub use orchestrator::{answer_question, assess_and_hint, Assessment, AssessmentRequest};
pub use parse::parse_hints;
pub use session::{Event, Session, ViewModel};
pub use transcript::Transcript;
