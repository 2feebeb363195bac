use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Question as the Google Forms add-on sends it. Read-only input owned by the
/// calling form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFormQuestion {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub correct_answer_index: Option<usize>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub skill: Option<String>,
}

/// Response as the add-on sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFormResponse {
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub answers: Vec<ResponseAnswer>,
}

/// One answer pair, passed through untouched. Orphaned question ids are the
/// analysis collaborator's problem to detect, not the adapter's.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseAnswer {
    pub question_id: String,
    #[serde(default)]
    pub answer: Value,
}

/// Question in the shape the analysis engine expects. Only multiple-choice is
/// supported; other question types are an explicit non-goal of the source
/// system, not a gap to fill here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedQuestion {
    pub id: String,
    pub question: String,
    #[serde(rename = "type")]
    pub question_type: &'static str,
    pub options: Vec<String>,
    /// `None` means the form exposed no answer key: the engine must skip
    /// correctness scoring for the item rather than assume option 0.
    pub correct_option_index: Option<usize>,
    pub model_answer: Option<String>,
    pub marks: u32,
    pub topic: String,
    pub skill: String,
}

/// Response in the shape the analysis engine expects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResponse {
    pub student_name: String,
    /// Stamped at adaptation time. The source's own submission timing is
    /// lost, so this field is unsuitable for audit purposes.
    pub submitted_at: DateTime<Utc>,
    pub time_taken: u32,
    pub away_count: u32,
    pub answers: Vec<ResponseAnswer>,
}

const QUESTION_TYPE_MCQ: &str = "mcq";
const GENERAL: &str = "General";
const ANONYMOUS_STUDENT: &str = "Anonymous";

/// Map raw form questions to the analysis schema. Pure and total: one output
/// per input, input order preserved, nothing filtered.
pub fn adapt_questions(raw: &[RawFormQuestion]) -> Vec<NormalizedQuestion> {
    raw.iter()
        .map(|q| NormalizedQuestion {
            id: q.id.clone(),
            question: q.title.clone(),
            question_type: QUESTION_TYPE_MCQ,
            options: q.choices.clone(),
            correct_option_index: q.correct_answer_index,
            model_answer: q.correct_answer.clone(),
            marks: 1,
            topic: q
                .topic
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| GENERAL.to_string()),
            skill: q
                .skill
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| GENERAL.to_string()),
        })
        .collect()
}

/// Map raw form responses to the analysis schema. Same totality and ordering
/// guarantees as `adapt_questions`.
pub fn adapt_responses(raw: &[RawFormResponse]) -> Vec<NormalizedResponse> {
    let now = Utc::now();
    raw.iter()
        .map(|r| NormalizedResponse {
            student_name: r
                .student_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| ANONYMOUS_STUDENT.to_string()),
            submitted_at: now,
            time_taken: 0,
            away_count: 0,
            answers: r.answers.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(id: &str) -> RawFormQuestion {
        RawFormQuestion {
            id: id.to_string(),
            title: format!("Question {}", id),
            choices: vec!["A".to_string(), "B".to_string()],
            correct_answer_index: None,
            correct_answer: None,
            topic: None,
            skill: None,
        }
    }

    #[test]
    fn questions_preserve_order_and_cardinality() {
        let raw = vec![question("q3"), question("q1"), question("q2")];
        let adapted = adapt_questions(&raw);
        assert_eq!(adapted.len(), raw.len());
        for (input, output) in raw.iter().zip(adapted.iter()) {
            assert_eq!(output.id, input.id);
        }
    }

    #[test]
    fn question_defaults_are_applied() {
        let adapted = adapt_questions(&[question("q1")]);
        let q = &adapted[0];
        assert_eq!(q.question_type, "mcq");
        assert_eq!(q.marks, 1);
        assert_eq!(q.topic, "General");
        assert_eq!(q.skill, "General");
        assert!(q.correct_option_index.is_none());
        assert!(q.model_answer.is_none());
    }

    #[test]
    fn missing_answer_key_stays_absent_instead_of_pointing_at_option_zero() {
        let adapted = adapt_questions(&[question("q1")]);
        assert_eq!(adapted[0].correct_option_index, None);

        let mut keyed = question("q2");
        keyed.correct_answer_index = Some(0);
        let adapted = adapt_questions(&[keyed]);
        assert_eq!(adapted[0].correct_option_index, Some(0));
    }

    #[test]
    fn question_without_choices_gets_an_empty_options_list() {
        let mut q = question("q1");
        q.choices = Vec::new();
        let adapted = adapt_questions(&[q]);
        assert!(adapted[0].options.is_empty());
    }

    #[test]
    fn explicit_topic_and_skill_survive() {
        let mut q = question("q1");
        q.topic = Some("Fractions".to_string());
        q.skill = Some("Simplifying".to_string());
        let adapted = adapt_questions(&[q]);
        assert_eq!(adapted[0].topic, "Fractions");
        assert_eq!(adapted[0].skill, "Simplifying");
    }

    #[test]
    fn absent_or_blank_student_names_become_anonymous() {
        let raw = vec![
            RawFormResponse {
                student_name: None,
                answers: Vec::new(),
            },
            RawFormResponse {
                student_name: Some("   ".to_string()),
                answers: Vec::new(),
            },
            RawFormResponse {
                student_name: Some("Ada".to_string()),
                answers: Vec::new(),
            },
        ];
        let adapted = adapt_responses(&raw);
        assert_eq!(adapted.len(), 3);
        assert_eq!(adapted[0].student_name, "Anonymous");
        assert_eq!(adapted[1].student_name, "Anonymous");
        assert_eq!(adapted[2].student_name, "Ada");
    }

    #[test]
    fn answers_pass_through_untouched() {
        let raw = vec![RawFormResponse {
            student_name: Some("Ada".to_string()),
            answers: vec![
                ResponseAnswer {
                    question_id: "q1".to_string(),
                    answer: json!("B"),
                },
                ResponseAnswer {
                    question_id: "missing".to_string(),
                    answer: json!(["A", "C"]),
                },
            ],
        }];
        let adapted = adapt_responses(&raw);
        assert_eq!(adapted[0].answers.len(), 2);
        assert_eq!(adapted[0].answers[0].question_id, "q1");
        assert_eq!(adapted[0].answers[1].answer, json!(["A", "C"]));
        assert_eq!(adapted[0].time_taken, 0);
        assert_eq!(adapted[0].away_count, 0);
    }

    #[test]
    fn responses_are_stamped_with_processing_time() {
        let before = Utc::now();
        let adapted = adapt_responses(&[RawFormResponse {
            student_name: None,
            answers: Vec::new(),
        }]);
        let after = Utc::now();
        assert!(adapted[0].submitted_at >= before);
        assert!(adapted[0].submitted_at <= after);
    }
}
