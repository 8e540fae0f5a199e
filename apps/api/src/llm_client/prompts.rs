// Shared prompt fragments.
// Each service that needs model calls defines its own prompts.rs alongside it.
// This file contains cross-cutting pieces.

/// Tells the model how the three request parts are laid out.
pub const INPUT_LAYOUT_PREAMBLE: &str = "\
    The first part of this message is a job description. \
    The attached PDF is the candidate's resume. \
    The final part is your task.";

/// Keeps the model grounded in the supplied documents.
pub const GROUNDING_INSTRUCTION: &str = "\
    Base every statement on the job description and resume provided. \
    Do NOT invent experience, skills, or credentials the resume does not show.";

/// Joins a task prompt with the shared fragments, in send order.
pub fn with_shared_instructions(task: &str) -> String {
    format!("{INPUT_LAYOUT_PREAMBLE}\n\n{}\n\n{GROUNDING_INSTRUCTION}", task.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_instructions_wrap_task() {
        let prompt = with_shared_instructions("\n  Evaluate the resume.\n");
        assert!(prompt.starts_with(INPUT_LAYOUT_PREAMBLE));
        assert!(prompt.contains("\n\nEvaluate the resume.\n\n"));
        assert!(prompt.ends_with(GROUNDING_INSTRUCTION));
    }
}
