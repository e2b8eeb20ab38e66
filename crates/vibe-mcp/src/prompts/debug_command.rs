//! Prompt: "Debug a failing command."

use super::PromptTemplate;

/// The `debug_command` template.
pub fn template() -> PromptTemplate {
    PromptTemplate::new(
        "debug_command",
        "Debug a failing command",
        "A command in the current project is failing.\n\n\
         1. Run it with exec_command and capture the output and exit code\n\
         2. Read the server log through the logs://server/error resource\n\
         3. Inspect the files involved with manage_file (action 'read')\n\
         4. Explain the most likely cause before changing anything\n\
         5. Propose a fix, apply it, then re-run the command to confirm",
    )
}
