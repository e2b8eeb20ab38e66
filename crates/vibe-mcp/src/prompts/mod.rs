//! Static prompt templates.

pub mod code_review;
pub mod debug_command;
pub mod project_setup;
pub mod registry;

pub use registry::{PromptRegistry, PromptTemplate};

/// Every built-in prompt, in advertisement order.
pub fn builtin() -> Vec<PromptTemplate> {
    vec![
        project_setup::template(),
        code_review::template(),
        debug_command::template(),
    ]
}
