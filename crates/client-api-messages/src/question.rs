use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identifier of a benchmark question.
///
/// The question file is allowed to spell ids as JSON integers or strings,
/// while the predictions file always keys answers by string. Both normalize
/// to the string form here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for QuestionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

struct StringOrInteger;

impl Visitor<'_> for StringOrInteger {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string or an integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_owned())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StringOrInteger).map(QuestionId)
    }
}

pub(crate) fn opt_string_or_integer<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    struct OptVisitor;

    impl<'de> Visitor<'de> for OptVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("null, a string or an integer")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(StringOrInteger).map(Some)
        }
    }

    deserializer.deserialize_option(OptVisitor)
}

/// One entry of `benchmark-questions.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub question: String,
    pub max_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_string_or_integer",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum QuestionSetError {
    #[error("invalid question file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("question id `{0}` appears more than once")]
    DuplicateId(QuestionId),
}

/// The published question set, in file order.
#[derive(Debug, Clone, Default)]
pub struct QuestionSet {
    questions: Vec<Question>,
    by_id: HashMap<QuestionId, usize>,
}

impl QuestionSet {
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionSetError> {
        let mut by_id = HashMap::with_capacity(questions.len());
        for (idx, q) in questions.iter().enumerate() {
            if by_id.insert(q.id.clone(), idx).is_some() {
                return Err(QuestionSetError::DuplicateId(q.id.clone()));
            }
        }
        Ok(Self { questions, by_id })
    }

    pub fn from_json(s: &str) -> Result<Self, QuestionSetError> {
        Self::new(serde_json::from_str(s)?)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Sum of `max_score` over all questions.
    pub fn total_points(&self) -> f64 {
        self.questions.iter().map(|q| q.max_score).sum()
    }

    pub fn ids(&self) -> impl Iterator<Item = &QuestionId> + '_ {
        self.questions.iter().map(|q| &q.id)
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.by_id.get(&QuestionId::new(id)).map(|&idx| &self.questions[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
