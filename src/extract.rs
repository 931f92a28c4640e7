use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// Pull one JSON object out of free-form model text.
///
/// Models wrap their JSON in prose or markdown fences regardless of how the
/// prompt is phrased, so the parsed payload is the span from the first `{`
/// to the last `}`. No braces at all reports [`AppError::NoStructuredData`];
/// a span that does not parse reports [`AppError::MalformedStructuredData`].
/// Schema validation is the caller's concern; result types use serde
/// defaults so missing keys read as absent values.
pub fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T, AppError> {
    let start = text.find('{').ok_or(AppError::NoStructuredData)?;
    let end = text
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or(AppError::NoStructuredData)?;

    let span = &text[start..=end];
    serde_json::from_str(span).map_err(|e| AppError::MalformedStructuredData(e.to_string()))
}
