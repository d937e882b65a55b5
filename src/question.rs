//! Survey questions
//!
//! Questions are loaded once per session and never mutated afterwards.
//! Reveal state lives in the round, so a fresh board for any question is
//! always rebuilt from this immutable source.

use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;

/// A single survey answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Answer {
    /// Text shown when the answer is revealed
    #[garde(length(min = 1, max = constants::answer::MAX_TEXT_LENGTH))]
    pub text: String,
    /// Points the answer is worth
    #[garde(range(max = constants::answer::MAX_POINTS))]
    pub points: u32,
}

/// A survey question with its ranked answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Question {
    /// Unique id, also the ordering key of the question set
    #[garde(skip)]
    pub id: u64,
    /// The survey prompt
    #[garde(length(
        min = constants::question::MIN_PROMPT_LENGTH,
        max = constants::question::MAX_PROMPT_LENGTH
    ))]
    pub prompt: String,
    /// Board answers
    #[garde(length(
        min = constants::question::MIN_ANSWER_COUNT,
        max = constants::question::MAX_ANSWER_COUNT
    ), dive)]
    pub answers: Vec<Answer>,
}

/// An inclusive range of question ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    /// First id in the range
    pub start: u64,
    /// Last id in the range
    pub end: u64,
}

impl IdRange {
    /// Whether `id` lies within the range
    pub fn contains(&self, id: u64) -> bool {
        (self.start..=self.end).contains(&id)
    }
}

/// Errors raised while loading or filtering questions
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The questions failed validation
    #[error("invalid question set: {0}")]
    Invalid(String),
    /// Two questions share an id
    #[error("question id {0} is used more than once")]
    DuplicateId(u64),
    /// The range start is after its end
    #[error("range start {start} is after range end {end}")]
    InvertedRange {
        /// First id of the range
        start: u64,
        /// Last id of the range
        end: u64,
    },
    /// No question id falls within the range
    #[error("no question has an id between {start} and {end}")]
    EmptyRange {
        /// First id of the range
        start: u64,
        /// Last id of the range
        end: u64,
    },
    /// There are no questions to play
    #[error("the question set is empty")]
    NoQuestions,
}

/// Serialization helper for QuestionSet
#[derive(Deserialize)]
struct QuestionSetSerde {
    questions: Vec<Question>,
}

/// The immutable question source of a session
///
/// Questions are kept in ascending id order and each question's answers in
/// descending point order, which is the order they appear on the board.
/// Deserialized sets go through [`QuestionSet::new`] as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(try_from = "QuestionSetSerde")]
pub struct QuestionSet {
    #[garde(length(max = constants::question::MAX_QUESTION_COUNT), dive)]
    questions: Vec<Question>,
}

impl TryFrom<QuestionSetSerde> for QuestionSet {
    type Error = Error;

    fn try_from(serde: QuestionSetSerde) -> Result<Self, Self::Error> {
        Self::new(serde.questions)
    }
}

impl QuestionSet {
    /// Validates and orders a list of questions
    ///
    /// # Errors
    ///
    /// * `Error::Invalid` - A question or answer breaks a length or point limit
    /// * `Error::DuplicateId` - Two questions share an id
    pub fn new(mut questions: Vec<Question>) -> Result<Self, Error> {
        if let Some(id) = questions.iter().map(|question| question.id).duplicates().next() {
            return Err(Error::DuplicateId(id));
        }

        questions.sort_by_key(|question| question.id);
        for question in &mut questions {
            question.answers.sort_by(|a, b| b.points.cmp(&a.points));
        }

        let set = Self { questions };
        set.validate().map_err(|report| Error::Invalid(report.to_string()))?;

        tracing::debug!(count = set.len(), "question set loaded");
        Ok(set)
    }

    /// Number of questions
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the set has no questions
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at a position in id order
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// All questions in id order
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Positions of the questions to play, in id order
    ///
    /// # Arguments
    ///
    /// * `range` - Optional inclusive id range; `None` selects every question
    ///
    /// # Errors
    ///
    /// * `Error::InvertedRange` - `range.start > range.end`
    /// * `Error::EmptyRange` - No id falls within `range`
    /// * `Error::NoQuestions` - The set is empty
    pub fn select(&self, range: Option<IdRange>) -> Result<Vec<usize>, Error> {
        let Some(range) = range else {
            if self.is_empty() {
                return Err(Error::NoQuestions);
            }
            return Ok((0..self.len()).collect_vec());
        };

        if range.start > range.end {
            return Err(Error::InvertedRange {
                start: range.start,
                end: range.end,
            });
        }

        let selected = self
            .questions
            .iter()
            .positions(|question| range.contains(question.id))
            .collect_vec();

        if selected.is_empty() {
            return Err(Error::EmptyRange {
                start: range.start,
                end: range.end,
            });
        }
        Ok(selected)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn question(id: u64, points: &[u32]) -> Question {
        Question {
            id,
            prompt: format!("Name something from survey {id}"),
            answers: points
                .iter()
                .enumerate()
                .map(|(i, points)| Answer {
                    text: format!("answer {i}"),
                    points: *points,
                })
                .collect(),
        }
    }

    /// Questions with ids 1 through `count`
    pub(crate) fn question_set(count: u64) -> QuestionSet {
        QuestionSet::new((1..=count).map(|id| question(id, &[40, 30, 20, 10])).collect())
            .unwrap()
    }

    #[test]
    fn test_questions_sorted_by_id() {
        let set = QuestionSet::new(vec![question(7, &[5]), question(2, &[5]), question(4, &[5])])
            .unwrap();
        assert_eq!(
            set.questions().iter().map(|q| q.id).collect_vec(),
            vec![2, 4, 7]
        );
    }

    #[test]
    fn test_answers_sorted_by_points() {
        let set = QuestionSet::new(vec![question(1, &[10, 45, 20, 25])]).unwrap();
        let points = set.get(0).unwrap().answers.iter().map(|a| a.points).collect_vec();
        assert_eq!(points, vec![45, 25, 20, 10]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        assert_eq!(
            QuestionSet::new(vec![question(3, &[5]), question(3, &[6])]),
            Err(Error::DuplicateId(3))
        );
    }

    #[test]
    fn test_validation_limits() {
        assert!(matches!(
            QuestionSet::new(vec![question(1, &[])]),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            QuestionSet::new(vec![question(1, &[constants::answer::MAX_POINTS + 1])]),
            Err(Error::Invalid(_))
        ));

        let mut empty_prompt = question(1, &[5]);
        empty_prompt.prompt.clear();
        assert!(matches!(
            QuestionSet::new(vec![empty_prompt]),
            Err(Error::Invalid(_))
        ));
    }

    #[test]
    fn test_select_range() {
        let set = question_set(8);
        let selected = set.select(Some(IdRange { start: 3, end: 5 })).unwrap();
        assert_eq!(
            selected.iter().map(|i| set.get(*i).unwrap().id).collect_vec(),
            vec![3, 4, 5]
        );
    }

    #[test]
    fn test_select_everything() {
        assert_eq!(question_set(3).select(None), Ok(vec![0, 1, 2]));
        assert_eq!(QuestionSet::default().select(None), Err(Error::NoQuestions));
    }

    #[test]
    fn test_select_bad_ranges() {
        let set = question_set(5);
        assert_eq!(
            set.select(Some(IdRange { start: 4, end: 2 })),
            Err(Error::InvertedRange { start: 4, end: 2 })
        );
        assert_eq!(
            set.select(Some(IdRange { start: 10, end: 20 })),
            Err(Error::EmptyRange { start: 10, end: 20 })
        );
    }

    #[test]
    fn test_deserialize_set_orders_questions() {
        let set: QuestionSet = serde_json::from_str(
            r#"{"questions":[
                {"id":5,"prompt":"Name a pet","answers":[{"text":"Fish","points":1},{"text":"Dog","points":90}]},
                {"id":2,"prompt":"Name a fruit","answers":[{"text":"Apple","points":40}]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            set.questions().iter().map(|q| q.id).collect_vec(),
            vec![2, 5]
        );
        let points = set.get(1).unwrap().answers.iter().map(|a| a.points).collect_vec();
        assert_eq!(points, vec![90, 1]);
        assert_eq!(set.select(Some(IdRange { start: 2, end: 5 })), Ok(vec![0, 1]));
    }

    #[test]
    fn test_deserialize_set_rejects_invalid_questions() {
        let duplicates = r#"{"questions":[
            {"id":5,"prompt":"Name a pet","answers":[{"text":"Dog","points":90}]},
            {"id":5,"prompt":"Name a pet","answers":[{"text":"Cat","points":10}]},
            {"id":2,"prompt":"Name a fruit","answers":[{"text":"Apple","points":40}]}
        ]}"#;
        let no_answers = r#"{"questions":[{"id":1,"prompt":"Name a pet","answers":[]}]}"#;
        let too_many_points = r#"{"questions":[
            {"id":1,"prompt":"Name a pet","answers":[{"text":"Dog","points":100000}]}
        ]}"#;

        for json in [duplicates, no_answers, too_many_points] {
            assert!(serde_json::from_str::<QuestionSet>(json).is_err());
        }
    }

    #[test]
    fn test_serialized_set_deserializes_back() {
        let set = question_set(3);
        let json = serde_json::to_string(&set).unwrap();
        let back: QuestionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_deserialize_question() {
        let question: Question = serde_json::from_str(
            r#"{"id":9,"prompt":"Name a fruit","answers":[{"text":"Apple","points":40}]}"#,
        )
        .unwrap();
        assert_eq!(question.answers[0].points, 40);
        assert!(question.validate().is_ok());
    }
}
