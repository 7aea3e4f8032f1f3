use super::types::{FieldKey, Step};
use std::collections::BTreeMap;

/// Field-level checks for the free-text step
pub struct StepValidator;

impl StepValidator {
    /// Every blank field of `step`, mapped to its message. Empty when valid.
    ///
    /// Only PersonalInfo has field rules; the artifact gates of the other
    /// steps are enforced by the engine.
    pub fn validate(step: Step, fields: &BTreeMap<FieldKey, String>) -> BTreeMap<FieldKey, String> {
        match step {
            Step::PersonalInfo => FieldKey::ALL
                .into_iter()
                .filter(|key| {
                    fields
                        .get(key)
                        .map_or(true, |value| value.trim().is_empty())
                })
                .map(|key| (key, key.required_message().to_string()))
                .collect(),
            Step::Signature | Step::Photo => BTreeMap::new(),
        }
    }
}
