use crate::question::{QuestionId, QuestionSet};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Answers keyed by question id, in insertion order.
///
/// This is the exact body of `predictions.json`: a flat object of
/// question-id strings to answer strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predictions(IndexMap<String, String>);

#[derive(thiserror::Error, Debug)]
pub enum PredictionsError {
    #[error("Invalid JSON file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Predictions file must be a JSON object")]
    NotAnObject,
    #[error("Answer for question {0} must be a string")]
    NonStringAnswer(String),
}

impl Predictions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a predictions file, rejecting anything that is not an object of strings.
    pub fn from_json(s: &str) -> Result<Self, PredictionsError> {
        let Value::Object(map) = serde_json::from_str::<Value>(s)? else {
            return Err(PredictionsError::NotAnObject);
        };
        let mut out = IndexMap::with_capacity(map.len());
        for (qid, answer) in map {
            let Value::String(answer) = answer else {
                return Err(PredictionsError::NonStringAnswer(qid));
            };
            out.insert(qid, answer);
        }
        Ok(Self(out))
    }

    /// Two-space indented JSON with non-ASCII text kept verbatim.
    pub fn to_json_pretty(&self) -> String {
        // A map of strings always serializes.
        serde_json::to_string_pretty(&self.0).unwrap_or_default()
    }

    pub fn insert(&mut self, id: impl Into<String>, answer: impl Into<String>) -> Option<String> {
        self.0.insert(id.into(), answer.into())
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Check the answers against `questions`, if a question set is at hand.
    pub fn check(&self, questions: Option<&QuestionSet>) -> ValidationReport {
        let empty = self
            .iter()
            .filter(|(_, answer)| answer.trim().is_empty())
            .map(|(qid, _)| QuestionId::new(qid))
            .collect();

        let (missing, unknown) = match questions {
            Some(set) => (
                set.ids().filter(|id| !self.0.contains_key(id.as_str())).cloned().collect(),
                self.0
                    .keys()
                    .filter(|qid| !set.contains(qid))
                    .map(|qid| QuestionId::new(qid.as_str()))
                    .collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        ValidationReport {
            answers: self.len(),
            expected: questions.map(QuestionSet::len),
            empty,
            missing,
            unknown,
        }
    }
}

impl FromIterator<(String, String)> for Predictions {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Soft findings about a syntactically valid predictions file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub answers: usize,
    /// Size of the question set the predictions were checked against.
    pub expected: Option<usize>,
    /// Answers that are empty or whitespace only.
    pub empty: Vec<QuestionId>,
    /// Questions without any answer.
    pub missing: Vec<QuestionId>,
    /// Answers for ids the question set does not know.
    pub unknown: Vec<QuestionId>,
}

impl ValidationReport {
    pub fn all_ids_present(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.empty.is_empty() && self.missing.is_empty() && self.unknown.is_empty()
    }
}
