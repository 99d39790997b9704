//! Newline-delimited JSON, the format of the bulk export/import endpoints.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ProtocolError;

/// Encode records one JSON document per line, each line terminated by `\n`.
pub fn encode<T: Serialize>(records: &[T]) -> Result<String, ProtocolError> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

/// Decode an ndjson body. Blank lines are skipped; line numbers in errors
/// are 1-based.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, ProtocolError> {
    body.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| ProtocolError::InvalidRecord {
                line: i + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Count the non-blank records of an ndjson body without decoding them.
pub fn count_records(body: &str) -> usize {
    body.lines().filter(|line| !line.trim().is_empty()).count()
}
