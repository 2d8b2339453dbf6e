//! First-match JSON object parser for model output.
//!
//! Models wrap their answer in prose or markdown fences even when asked not
//! to. Candidates are tried at each `{` in order of appearance and the first
//! one that parses as a complete object wins; later objects are never
//! looked at or merged.

use serde_json::{Deserializer, Map, Value};

use crate::error::{AdvisorError, AdvisorResult};

/// Parse the first well-formed JSON object in `text`.
pub fn first_json_object(text: &str) -> AdvisorResult<Map<String, Value>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AdvisorError::Parse("empty response".into()));
    }

    let mut first_error = None;
    for (start, _) in trimmed.match_indices('{') {
        let mut stream = Deserializer::from_str(&trimmed[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(object))) => return Ok(object),
            Some(Ok(_)) | None => {}
            Some(Err(e)) => {
                first_error.get_or_insert_with(|| format!("malformed JSON object at byte {start}: {e}"));
            }
        }
    }

    Err(AdvisorError::Parse(
        first_error.unwrap_or_else(|| "no JSON object found in response".into()),
    ))
}
