//! Prompt registration and lookup.

use indexmap::IndexMap;

use crate::types::{PromptBody, PromptDefinition};

/// A static prompt: name, title and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    /// Lookup name.
    pub name: String,
    /// Human-readable title.
    pub title: String,
    /// Prompt text returned verbatim.
    pub content: String,
}

impl PromptTemplate {
    /// Build a template.
    pub fn new(name: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            content: content.into(),
        }
    }

    /// Descriptor advertised during negotiation.
    pub fn definition(&self) -> PromptDefinition {
        PromptDefinition {
            name: self.name.clone(),
            title: self.title.clone(),
        }
    }

    /// Body returned in a `prompt_response`.
    pub fn body(&self) -> PromptBody {
        PromptBody {
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }
}

/// Ordered name → template table.
#[derive(Debug, Clone, Default)]
pub struct PromptRegistry {
    prompts: IndexMap<String, PromptTemplate>,
}

impl PromptRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, replacing any previous one with the same name.
    pub fn register(&mut self, template: PromptTemplate) {
        self.prompts.insert(template.name.clone(), template);
    }

    /// Look up a template.
    pub fn get(&self, name: &str) -> Option<&PromptTemplate> {
        self.prompts.get(name)
    }

    /// All definitions, in registration order.
    pub fn definitions(&self) -> Vec<PromptDefinition> {
        self.prompts.values().map(PromptTemplate::definition).collect()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.prompts.keys().map(String::as_str).collect()
    }

    /// Number of registered prompts.
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    /// Whether no prompts are registered.
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}
