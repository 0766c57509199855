//! Business logic
//!
//! - `generation`: request validation, submit and poll
//! - `prompt`: prompt construction
//! - `prediction`: hosted model API boundary
//! - `styles`: theme and room catalogs

pub mod generation;
pub mod prediction;
pub mod prompt;
pub mod styles;

pub use generation::{GenerateRequest, GenerationService, GenerationSettings, GuidanceScale};
pub use prediction::{GeneratedImage, PredictionApi, ReplicateClient};
pub use prompt::{PromptPlan, build_prompt};
pub use styles::{Room, StyleCatalog, Theme};
