//! Fixed-structure prompts for the three model tasks

pub const ASSESSMENT_MARKER: &str = "[ASSESSMENT]";
pub const HINTS_MARKER: &str = "[HINTS]";
pub const ANSWER_MARKER: &str = "[COACH ANSWER]";

pub const ASSESS_INSTRUCTIONS: &str = r#"You are a coding coach for Scratch-style block-based programming. Blocks read like plain instructions; for example, "change number by 1" means increment the number by 1.
You will receive:
- The problem statement
- The conversation history so far
- The student's current code (a screenshot at first, later as text revisions)

Task:
1) Read the student's code and transcribe it into text code.
2) Assess whether the student's code is correct.
3) If the code has problems, write 3 hints ordered from vague to specific. Keep each hint to at most 2 sentences.

Answer in plain text using these sections:
[ASSESSMENT]
...
[HINTS]
1) ...
2) ...
3) ..."#;

pub const FALLBACK_HINTS_INSTRUCTIONS: &str = r#"From the assessment below, list exactly 3 brief hints for the student, from vague to specific, one sentence each. Use this format and nothing else:
[HINTS]
1) ...
2) ...
3) ..."#;

pub const ANSWER_INSTRUCTIONS: &str = r#"You are a coding coach for block-based programming.
Always give a short, clear and helpful answer to the student's question.
Do not repeat the question. Do not output section markers.
Start your answer directly under [COACH ANSWER]."#;

const IMAGE_CODE_NOTE: &str = "The student's current code is shown in the image.";

/// How the student's current code reaches the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentCode<'a> {
    /// Only the screenshot carries the code
    Image,
    /// A typed revision, embedded verbatim
    Text(&'a str),
}

pub fn build_assessment_prompt(problem: &str, history: &str, code: StudentCode<'_>) -> String {
    let code_section = match code {
        StudentCode::Text(text) => format!("[CURRENT STUDENT CODE - TEXT]\n{}", text),
        StudentCode::Image => format!("[CURRENT STUDENT CODE - IMAGE]\n{}", IMAGE_CODE_NOTE),
    };
    format!(
        "{}\n\n[CONVERSATION HISTORY]\n{}\n\n{}\n\n{}",
        problem, history, code_section, ASSESS_INSTRUCTIONS
    )
}

/// Re-prompt that only has the first-pass output as context
pub fn build_fallback_hint_prompt(prior_output: &str) -> String {
    format!("{}\n\n{}", FALLBACK_HINTS_INSTRUCTIONS, prior_output)
}

/// Ends on the answer marker so the model continues right after it
pub fn build_qa_prompt(history: &str, question: &str) -> String {
    format!(
        "{}\n\n[CONVERSATION HISTORY]\n{}\n\n[STUDENT QUESTION]\n{}\n\n{}\n",
        ANSWER_INSTRUCTIONS, history, question, ANSWER_MARKER
    )
}
