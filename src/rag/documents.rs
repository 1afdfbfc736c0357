//! Typed records for the three collections.
//!
//! Source JSON is not validated: every text field is optional and anything
//! missing (or `null`) becomes an empty string. Numbers are accepted where
//! strings are expected, since ids and years show up both ways.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Builds the text a document is scored against.
pub trait Searchable {
    fn surrogate_text(&self) -> String;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub procedure: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub purpose: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub topic: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub industry: String,
    #[serde(default, alias = "related_standard", deserialize_with = "lenient_string")]
    pub related_standard: String,
}

impl Searchable for Procedure {
    fn surrogate_text(&self) -> String {
        join_fields(&[
            &self.title,
            &self.description,
            &self.procedure,
            &self.purpose,
            &self.topic,
            &self.industry,
            &self.related_standard,
        ])
    }
}

/// Question/answer record drawn from the auditing standards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Standard {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "물음", default, deserialize_with = "lenient_string")]
    pub question: String,
    #[serde(rename = "정답", default, deserialize_with = "lenient_string")]
    pub answer: String,
    #[serde(rename = "기준서", default, deserialize_with = "lenient_string")]
    pub reference: String,
    #[serde(rename = "해설", default, deserialize_with = "lenient_string")]
    pub explanation: String,
    #[serde(rename = "주제", default, deserialize_with = "lenient_string")]
    pub topic: String,
}

impl Searchable for Standard {
    fn surrogate_text(&self) -> String {
        join_fields(&[
            &self.question,
            &self.answer,
            &self.reference,
            &self.explanation,
            &self.topic,
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    #[serde(default, alias = "examId", deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub cases: Vec<ExamCase>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamCase {
    #[serde(default, alias = "caseId", deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub topic: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub chapter: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub scenario: String,
    #[serde(default, alias = "sub_questions", deserialize_with = "lenient_vec")]
    pub sub_questions: Vec<SubQuestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubQuestion {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub question: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub answer: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub explanation: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub points: String,
}

/// A sub-question lifted out of its exam and case, carrying their context.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamQuestion {
    pub exam_id: String,
    pub year: String,
    pub case_id: String,
    pub topic: String,
    pub chapter: String,
    #[serde(flatten)]
    pub sub_question: SubQuestion,
}

impl Searchable for ExamQuestion {
    fn surrogate_text(&self) -> String {
        join_fields(&[
            &self.sub_question.question,
            &self.sub_question.answer,
            &self.sub_question.explanation,
            &self.topic,
            &self.chapter,
        ])
    }
}

/// Flattens exam → case → sub-question, in source order.
pub fn flatten_exams(exams: &[Exam]) -> Vec<ExamQuestion> {
    exams
        .iter()
        .flat_map(|exam| {
            exam.cases.iter().flat_map(move |case| {
                case.sub_questions.iter().map(move |sub| ExamQuestion {
                    exam_id: exam.id.clone(),
                    year: exam.year.clone(),
                    case_id: case.id.clone(),
                    topic: case.topic.clone(),
                    chapter: case.chapter.clone(),
                    sub_question: sub.clone(),
                })
            })
        })
        .collect()
}

fn join_fields(fields: &[&String]) -> String {
    fields
        .iter()
        .filter(|f| !f.is_empty())
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(value_to_text).unwrap_or_default())
}

fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .into_iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        other @ Value::Object(_) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn standard_reads_korean_field_names() {
        let standard: Standard = serde_json::from_value(json!({
            "id": 7,
            "물음": "기준서 질문 A",
            "정답": "답변 포함 KSA 200"
        }))
        .expect("standard");

        assert_eq!(standard.id, "7");
        assert_eq!(standard.question, "기준서 질문 A");
        assert_eq!(standard.explanation, "");
        assert_eq!(standard.surrogate_text(), "기준서 질문 A 답변 포함 KSA 200");
    }

    #[test]
    fn missing_and_null_fields_become_empty() {
        let procedure: Procedure =
            serde_json::from_value(json!({"title": null, "procedure": ["입회", "재실사"]}))
                .expect("procedure");
        assert_eq!(procedure.title, "");
        assert_eq!(procedure.procedure, "입회\n재실사");
        assert_eq!(procedure.surrogate_text(), "입회\n재실사");
    }

    #[test]
    fn null_cases_and_sub_questions_become_empty() {
        let exams: Vec<Exam> = serde_json::from_value(json!([
            {"examId": "2024-A", "cases": [
                {"caseId": "c1", "subQuestions": [{"id": "q1", "question": "A?"}]},
                {"caseId": "c2", "subQuestions": null}
            ]},
            {"examId": "2024-B", "cases": null}
        ]))
        .expect("exams");

        assert_eq!(exams[0].cases[1].sub_questions, Vec::<SubQuestion>::new());
        assert!(exams[1].cases.is_empty());
        let flat = flatten_exams(&exams);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].sub_question.id, "q1");
    }

    #[test]
    fn flatten_denormalizes_case_and_exam() {
        let exams: Vec<Exam> = serde_json::from_value(json!([{
            "examId": "2023-2",
            "year": 2023,
            "cases": [
                {"caseId": "c1", "topic": "감사위험", "chapter": "3장",
                 "subQuestions": [{"id": "q1", "question": "A?"}, {"id": "q2", "question": "B?"}]},
                {"caseId": "c2", "topic": "표본감사", "subQuestions": [{"id": "q3"}]}
            ]
        }]))
        .expect("exams");

        let flat = flatten_exams(&exams);
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[0].exam_id, "2023-2");
        assert_eq!(flat[0].year, "2023");
        assert_eq!(flat[1].chapter, "3장");
        assert_eq!(flat[2].topic, "표본감사");
        assert_eq!(flat[2].chapter, "");
        assert_eq!(flatten_exams(&exams), flat);
    }

    #[test]
    fn exam_question_serializes_flat() {
        let question = ExamQuestion {
            exam_id: "e".into(),
            sub_question: SubQuestion {
                id: "q".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let value = serde_json::to_value(&question).expect("serialize");
        assert_eq!(value["examId"], "e");
        assert_eq!(value["id"], "q");
    }
}
