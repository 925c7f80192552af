//! Extraction of structured JSON from model responses.
//!
//! Model responses often wrap JSON in markdown code fences or mix it with
//! explanatory text. Extraction is tolerant; parsing is not — a response
//! that yields no parseable JSON fails with a [`JsonParseError`] carrying
//! the full raw text for postmortem inspection.

use clipwright_error::{ClipwrightResult, JsonParseError};

/// Extract the first JSON document from a response.
///
/// Strategies, in order: fenced ```json blocks, bare fenced blocks, then
/// the first balanced array or object, whichever opens earlier.
///
/// # Examples
///
/// ```
/// use clipwright_pipeline::extract_json;
///
/// let response = "Here you go:\n```json\n[{\"title\": \"Ambush\"}]\n```";
/// assert_eq!(extract_json(response).unwrap(), "[{\"title\": \"Ambush\"}]");
/// ```
pub fn extract_json(response: &str) -> Option<String> {
    if let Some(json) = fenced_block(response) {
        return Some(json);
    }

    // Prefer whichever structure opens first so an explanatory "{...}"
    // aside cannot shadow the real array.
    let bracket = response.find('[');
    let brace = response.find('{');
    let first = match (bracket, brace) {
        (Some(b), Some(c)) => {
            if b < c {
                ('[', ']')
            } else {
                ('{', '}')
            }
        }
        (Some(_), None) => ('[', ']'),
        (None, Some(_)) => ('{', '}'),
        (None, None) => return None,
    };

    balanced_span(response, first.0, first.1).or_else(|| {
        let (open, close) = if first.0 == '[' { ('{', '}') } else { ('[', ']') };
        balanced_span(response, open, close)
    })
}

/// Extract and parse a step's JSON output into `T`.
///
/// # Errors
///
/// Returns [`JsonParseError`] — carrying the complete raw response — when
/// no JSON is found or the JSON does not match the expected shape.
pub fn parse_step_json<T>(context: &str, response: &str) -> ClipwrightResult<T>
where
    T: serde::de::DeserializeOwned,
{
    let json_str = extract_json(response).ok_or_else(|| {
        JsonParseError::new(context, "no JSON found in model output", response)
    })?;

    serde_json::from_str(&json_str)
        .map_err(|e| JsonParseError::new(context, e.to_string(), response).into())
}

/// Content of the first markdown code fence, preferring ```json fences.
fn fenced_block(response: &str) -> Option<String> {
    for marker in ["```json", "```"] {
        let Some(start) = response.find(marker) else {
            continue;
        };
        let mut content_start = start + marker.len();
        if marker == "```" {
            // Skip a language specifier on the opening fence line.
            if let Some(newline) = response[content_start..].find('\n') {
                content_start += newline + 1;
            }
        }
        let content = match response[content_start..].find("```") {
            Some(end) => &response[content_start..content_start + end],
            // No closing fence: likely a truncated response, take the rest.
            None => &response[content_start..],
        };
        return Some(content.trim().to_string());
    }
    None
}

/// Span from the first `open` to its matching `close`, honoring nesting
/// and string escapes.
fn balanced_span(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(response[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Clip {
        title: String,
    }

    #[test]
    fn extracts_from_json_fence() {
        let response = "Sure:\n```json\n[{\"title\": \"Chase\"}]\n```\nDone.";
        let clips: Vec<Clip> = parse_step_json("clips", response).unwrap();
        assert_eq!(clips[0].title, "Chase");
    }

    #[test]
    fn extracts_balanced_array_before_later_object() {
        let response = "items: [{\"title\": \"A\"}] and meta {\"count\": 1}";
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('['));
        assert!(json.ends_with(']'));
    }

    #[test]
    fn handles_escaped_quotes_inside_strings() {
        let response = r#"{"title": "She said \"run\""}"#;
        let json = extract_json(response).unwrap();
        assert!(json.contains("run"));
    }

    #[test]
    fn unclosed_fence_takes_remainder() {
        let response = "```json\n{\"title\": \"Truncated\"}";
        let clip: Clip = parse_step_json("clip", response).unwrap();
        assert_eq!(clip.title, "Truncated");
    }

    #[test]
    fn no_json_carries_raw_text() {
        let response = "plain prose, no structure";
        let err = parse_step_json::<Vec<Clip>>("clips", response).unwrap_err();
        let parse = err.as_json_parse().expect("should be a parse error");
        assert_eq!(parse.raw_text, response);
        assert_eq!(parse.context, "clips");
    }

    #[test]
    fn shape_mismatch_carries_raw_text() {
        let response = r#"{"title": "not an array"}"#;
        let err = parse_step_json::<Vec<Clip>>("clips", response).unwrap_err();
        assert!(err.as_json_parse().is_some());
    }
}
