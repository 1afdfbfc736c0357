//! Context block assembly.
//!
//! Renders ranked results into the text block handed to the prompt builder.
//! Sections always appear in this order and are left out when empty:
//! 1. auditing standards
//! 2. audit procedures
//! 3. similar past exam questions

use std::fmt::Write;

use super::documents::{ExamQuestion, Procedure, Standard};

pub const STANDARDS_HEADING: &str = "## 관련 회계감사기준서";
pub const PROCEDURES_HEADING: &str = "## 관련 감사절차";
pub const EXAM_QUESTIONS_HEADING: &str = "## 유사 기출문제";

/// Ranked results to render, borrowed from a search.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextInput<'a> {
    pub procedures: &'a [Procedure],
    pub standards: &'a [Standard],
    pub exam_questions: &'a [ExamQuestion],
}

/// Formats the three result lists into one context block. Never fails;
/// missing fields render as empty text.
pub fn format_as_context(input: &ContextInput<'_>) -> String {
    let mut sections: Vec<String> = Vec::new();

    if !input.standards.is_empty() {
        sections.push(render_section(STANDARDS_HEADING, input.standards, render_standard));
    }
    if !input.procedures.is_empty() {
        sections.push(render_section(PROCEDURES_HEADING, input.procedures, render_procedure));
    }
    if !input.exam_questions.is_empty() {
        sections.push(render_section(
            EXAM_QUESTIONS_HEADING,
            input.exam_questions,
            render_exam_question,
        ));
    }

    sections.join("\n\n")
}

fn render_section<T>(heading: &str, items: &[T], render: fn(&mut String, &T)) -> String {
    let mut out = String::from(heading);
    for (i, item) in items.iter().enumerate() {
        let _ = write!(out, "\n{}. ", i + 1);
        render(&mut out, item);
    }
    out
}

fn render_standard(out: &mut String, standard: &Standard) {
    if !standard.reference.is_empty() {
        let _ = write!(out, "[{}] ", standard.reference);
    }
    let _ = write!(out, "질문: {}\n   답변: {}", standard.question, standard.answer);
    if !standard.explanation.is_empty() {
        let _ = write!(out, "\n   해설: {}", standard.explanation);
    }
}

fn render_procedure(out: &mut String, procedure: &Procedure) {
    out.push_str(&procedure.title);
    if !procedure.topic.is_empty() {
        let _ = write!(out, " ({})", procedure.topic);
    }
    let _ = write!(
        out,
        "\n   설명: {}\n   절차: {}",
        procedure.description, procedure.procedure
    );
}

fn render_exam_question(out: &mut String, question: &ExamQuestion) {
    let _ = write!(
        out,
        "[{} {}] {} / {}\n   문제: {}\n   모범답안: {}",
        question.year,
        question.exam_id,
        question.topic,
        question.chapter,
        question.sub_question.question,
        question.sub_question.answer
    );
}
