//! Answer generation backends for vademecum.
//!
//! All backends implement the `vademecum_core::Generator` trait. The
//! production backend talks to the Hugging Face Inference API; tests script
//! their own generators against the same trait.

pub mod huggingface;

pub use huggingface::HuggingFaceGenerator;

use std::sync::Arc;

use vademecum_config::InferenceConfig;
use vademecum_core::Generator;

/// Build the configured generator.
pub fn build_generator(config: &InferenceConfig) -> Arc<dyn Generator> {
    Arc::new(HuggingFaceGenerator::from_config(config))
}
