//! Prompt: "Set up a new project."

use super::PromptTemplate;

/// The `project_setup` template.
pub fn template() -> PromptTemplate {
    PromptTemplate::new(
        "project_setup",
        "Set up a new project",
        "I want to start a new project.\n\n\
         Please:\n\
         1. Ask me for a project name and a one-line description\n\
         2. Create it with manage_project (action 'create') and switch to it\n\
         3. Propose an initial file layout suited to the project's language\n\
         4. Create the skeleton files with manage_file (action 'create')\n\
         5. Summarize what was created and suggest the next steps",
    )
}
