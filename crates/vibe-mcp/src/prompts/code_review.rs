//! Prompt: "Review the code in the current project."

use super::PromptTemplate;

/// The `code_review` template.
pub fn template() -> PromptTemplate {
    PromptTemplate::new(
        "code_review",
        "Review project code",
        "Review the code in the current project.\n\n\
         List the files with manage_file (action 'list') and read the relevant ones.\n\
         For each file, report:\n\
         - correctness problems and unhandled edge cases\n\
         - unclear naming or structure\n\
         - missing tests\n\n\
         Order findings by severity and propose concrete edits. Apply an edit with \
         manage_file (action 'update') only after I confirm it.",
    )
}
