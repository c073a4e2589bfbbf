//! The single seam between the coaching core and the vision-language model

use super::error::InferenceError;
use super::image::CodeImage;
use super::models::GenProfile;
use std::future::Future;
use std::pin::Pin;

pub type GatewayFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, InferenceError>> + Send + 'a>>;

/// Generates text for a (prompt, image) pair.
///
/// The core awaits each call to completion before issuing the next one and
/// never retries. Deadlines, if any, belong to the implementation.
pub trait InferenceGateway: Send + Sync {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        image: &'a CodeImage,
        profile: GenProfile,
    ) -> GatewayFuture<'a>;
}
