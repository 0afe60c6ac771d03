use crate::constants::prompts::{
    LESSON_FIELD_INSTRUCTIONS, LESSON_GENERATION_PROMPT, LESSON_TUTOR_ROLE,
    QUESTION_EXTRACTION_PROMPT, VISUAL_AID_POLICY,
};

/// Maximum number of characters of the selected question quoted in a lesson prompt.
pub const QUESTION_SNIPPET_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTask<'a> {
    ExtractQuestions,
    GenerateLesson {
        question_id: &'a str,
        question_text: Option<&'a str>,
    },
}

/// Builds the instruction text sent alongside the file reference.
///
/// Output depends only on the inputs.
pub fn build_prompt(task: PromptTask<'_>, document_name: &str, document_id: &str) -> String {
    match task {
        PromptTask::ExtractQuestions => format!(
            "Analyze the provided PDF document '{name}'. {body} \
Include the provided PDF file ID '{id}' in the 'pdfFileId' field.",
            name = document_name,
            body = QUESTION_EXTRACTION_PROMPT,
            id = document_id,
        ),
        PromptTask::GenerateLesson {
            question_id,
            question_text,
        } => format!(
            "{role} Referencing the provided PDF document '{name}' (ID: {id}), \
focus *only* on the question identified by {context}. {body} \
Use '{question_id}' as the 'questionId' in your response. {fields} {visual}",
            role = LESSON_TUTOR_ROLE,
            name = document_name,
            id = document_id,
            context = question_context(question_id, question_text),
            body = LESSON_GENERATION_PROMPT,
            question_id = question_id,
            fields = LESSON_FIELD_INSTRUCTIONS,
            visual = VISUAL_AID_POLICY,
        ),
    }
}

fn question_context(question_id: &str, question_text: Option<&str>) -> String {
    let mut context = format!("question ID '{}'", question_id);
    if let Some(text) = question_text.map(str::trim).filter(|t| !t.is_empty()) {
        let snippet: String = text.chars().take(QUESTION_SNIPPET_CHARS).collect();
        context.push_str(&format!(" with text starting: '{}...'", snippet));
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_prompt_names_document_and_id() {
        let prompt = build_prompt(PromptTask::ExtractQuestions, "exam.pdf", "files/abc");

        assert!(prompt.contains("'exam.pdf'"));
        assert!(prompt.contains("'files/abc'"));
        assert!(prompt.contains("'pdfFileId'"));
        assert!(prompt.contains("'questionText'"));
    }

    #[test]
    fn lesson_prompt_targets_one_question() {
        let prompt = build_prompt(
            PromptTask::GenerateLesson {
                question_id: "q2a",
                question_text: Some("Explain photosynthesis."),
            },
            "biology.pdf",
            "files/xyz",
        );

        assert!(prompt.contains("'biology.pdf' (ID: files/xyz)"));
        assert!(prompt.contains("focus *only* on the question identified by question ID 'q2a'"));
        assert!(prompt.contains("with text starting: 'Explain photosynthesis....'"));
        assert!(prompt.contains("Use 'q2a' as the 'questionId'"));
        assert!(prompt.contains("'visualAid'"));
        assert!(prompt.contains("'isPresent'"));
        assert!(prompt.contains("<strong>"));
    }

    #[test]
    fn lesson_prompt_without_text_omits_snippet() {
        let prompt = build_prompt(
            PromptTask::GenerateLesson {
                question_id: "q1",
                question_text: None,
            },
            "exam.pdf",
            "files/abc",
        );

        assert!(!prompt.contains("with text starting"));

        let blank = build_prompt(
            PromptTask::GenerateLesson {
                question_id: "q1",
                question_text: Some("   "),
            },
            "exam.pdf",
            "files/abc",
        );
        assert_eq!(prompt, blank);
    }

    #[test]
    fn long_question_text_is_truncated_on_char_boundary() {
        let text = "é".repeat(150);
        let prompt = build_prompt(
            PromptTask::GenerateLesson {
                question_id: "q1",
                question_text: Some(&text),
            },
            "exam.pdf",
            "files/abc",
        );

        let expected = format!("'{}...'", "é".repeat(QUESTION_SNIPPET_CHARS));
        assert!(prompt.contains(&expected));
        assert!(!prompt.contains(&"é".repeat(QUESTION_SNIPPET_CHARS + 1)));
    }

    #[test]
    fn prompts_are_deterministic() {
        let task = PromptTask::GenerateLesson {
            question_id: "q1",
            question_text: Some("What?"),
        };

        assert_eq!(
            build_prompt(task, "exam.pdf", "files/abc"),
            build_prompt(task, "exam.pdf", "files/abc")
        );
    }
}
