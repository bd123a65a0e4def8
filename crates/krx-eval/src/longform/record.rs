//! Long-form answers and the result file that holds them
//!
//! Each detail entry names the model it came from through its answer key
//! (`"org/model-7b_answer"`), so two result files can be paired up later
//! without any side channel.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

const QUESTION_KEY: &str = "question";
const REFERENCE_KEY: &str = "gpt_answer";
const DETAILS_KEY: &str = "details";
const ANSWER_SUFFIX: &str = "_answer";
const SCORE_SUFFIX: &str = "_score";

/// One generated answer next to its reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongformRecord {
    pub question: String,
    /// Model identifier the answer came from
    pub model: String,
    pub answer: String,
    pub reference: String,
}

impl LongformRecord {
    /// Create a new record
    pub fn new(
        question: impl Into<String>,
        model: impl Into<String>,
        answer: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            model: model.into(),
            answer: answer.into(),
            reference: reference.into(),
        }
    }
}

impl Serialize for LongformRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry(QUESTION_KEY, &self.question)?;
        map.serialize_entry(&format!("{}{}", self.model, ANSWER_SUFFIX), &self.answer)?;
        map.serialize_entry(REFERENCE_KEY, &self.reference)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for LongformRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Map::<String, Value>::deserialize(deserializer)?;
        let question = take_string(&mut map, QUESTION_KEY).map_err(D::Error::custom)?;
        let reference = take_string(&mut map, REFERENCE_KEY).map_err(D::Error::custom)?;

        let mut rest = map.into_iter();
        let (key, value) = match (rest.next(), rest.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(D::Error::custom(
                    "expected exactly one `<model>_answer` field",
                ));
            }
        };

        let model = key
            .strip_suffix(ANSWER_SUFFIX)
            .ok_or_else(|| D::Error::custom(format!("unexpected field `{key}`")))?
            .to_string();
        let Value::String(answer) = value else {
            return Err(D::Error::custom(format!("field `{key}` must be a string")));
        };

        Ok(Self {
            question,
            model,
            answer,
            reference,
        })
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Result<String, String> {
    match map.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(format!("field `{key}` must be a string")),
        None => Err(format!("missing field `{key}`")),
    }
}

/// A corpus-level score of one metric, as a percentage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    /// Metric name; the result file key is `{metric}_score`
    pub metric: String,
    pub value: f64,
}

impl MetricScore {
    pub fn new(metric: impl Into<String>, value: f64) -> Self {
        Self {
            metric: metric.into(),
            value,
        }
    }
}

/// Scores plus every record of the long-form pass, in dataset order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LongformResult {
    scores: Vec<MetricScore>,
    details: Vec<LongformRecord>,
}

impl LongformResult {
    /// Create a result from computed scores and records
    pub fn new(scores: Vec<MetricScore>, details: Vec<LongformRecord>) -> Self {
        Self { scores, details }
    }

    /// Corpus-level scores
    pub fn scores(&self) -> &[MetricScore] {
        &self.scores
    }

    /// Score of a single metric
    pub fn score(&self, metric: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|s| s.metric == metric)
            .map(|s| s.value)
    }

    /// Records in dataset order
    pub fn details(&self) -> &[LongformRecord] {
        &self.details
    }

    /// Model whose answers this result holds
    pub fn model(&self) -> Option<&str> {
        self.details.first().map(|r| r.model.as_str())
    }

    pub fn len(&self) -> usize {
        self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    /// The reference answers of this result, presented as answers of `name`
    ///
    /// Lets a model be compared against the references themselves.
    pub fn reference_baseline(&self, name: &str) -> LongformResult {
        let details = self
            .details
            .iter()
            .map(|r| LongformRecord::new(&r.question, name, &r.reference, &r.reference))
            .collect();
        LongformResult::new(Vec::new(), details)
    }
}

impl Serialize for LongformResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.scores.len() + 1))?;
        for score in &self.scores {
            map.serialize_entry(&format!("{}{}", score.metric, SCORE_SUFFIX), &score.value)?;
        }
        map.serialize_entry(DETAILS_KEY, &self.details)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for LongformResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Map::<String, Value>::deserialize(deserializer)?;

        let details = map
            .remove(DETAILS_KEY)
            .ok_or_else(|| D::Error::missing_field(DETAILS_KEY))?;
        let details: Vec<LongformRecord> =
            serde_json::from_value(details).map_err(D::Error::custom)?;

        let scores = map
            .into_iter()
            .filter_map(|(key, value)| {
                let metric = key.strip_suffix(SCORE_SUFFIX)?.to_string();
                Some(MetricScore::new(metric, value.as_f64()?))
            })
            .collect();

        Ok(Self { scores, details })
    }
}
