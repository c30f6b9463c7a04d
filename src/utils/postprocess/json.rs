use std::error::Error;
use std::fmt;
use std::fmt::Formatter;

use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{from_str, Value};

lazy_static! {
    static ref CODE_FENCE_RE: Regex = Regex::new(r"(?s)^\s*```(?:json|JSON)?[ \t]*\r?\n?(.*?)\s*```\s*$").unwrap();
}

/// Filters invalid content and tries to parse the valid json string.
///
/// Returns a [serde_json::Value] if the string is valid json else an [InvalidJSON] error.
///
/// # Example
/// ```
/// use prompt_assistant::utils::postprocess::json::filter_to_json;
/// let valid_str = "partially valid: {\"a\":\"alice\"}";
/// let json_value = filter_to_json(valid_str).expect("Expect to be fine but failed");
/// assert_eq!(json_value["a"], "alice");
///
/// let invalid_str = "partially valid: \"a\":\"alice\"}";
/// assert_eq!(filter_to_json(invalid_str).is_err(), true)
/// ```
pub fn filter_to_json(string: impl Into<String>) -> Result<Value> {
    let string = string.into();
    let left_brace_idx = string.find('{');
    let right_brace_idx = string.rfind('}');
    match (left_brace_idx, right_brace_idx) {
        (Some(lbi), Some(rbi)) if lbi < rbi => {
            let valid_json = &string[lbi..rbi + 1];
            let value = from_str(valid_json)?;
            Ok(value)
        }
        _ => Err(InvalidJSON { invalid_string: string }.into())
    }
}

/// Removes a surrounding markdown code fence such as ```` ```json ... ``` ````. Returns the input unchanged if
/// there is no fence.
pub fn strip_code_fence(string: &str) -> &str {
    CODE_FENCE_RE
        .captures(string)
        .and_then(|captures| captures.get(1))
        .map_or(string, |body| body.as_str())
}

/// Parses an LLM reply into `T`.
///
/// The reply is unfenced first. If it is not valid JSON as a whole, the outermost `{...}` is tried.
pub fn parse_json_reply<T: DeserializeOwned>(reply: &str) -> Result<T> {
    let body = strip_code_fence(reply);
    match from_str(body) {
        Ok(parsed) => Ok(parsed),
        Err(_) => Ok(serde_json::from_value(filter_to_json(body)?)?),
    }
}

/// Error when the string is not a valid json.
#[derive(Debug, Clone)]
pub struct InvalidJSON {
    pub invalid_string: String,
}


impl fmt::Display for InvalidJSON {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid string to be parsed:\n{}", self.invalid_string)
    }
}

impl Error for InvalidJSON {}


#[cfg(test)]
mod test_json {
    use serde::Deserialize;

    use super::{filter_to_json, parse_json_reply, strip_code_fence};

    #[test]
    fn test_filter_to_json() {
        let valid_str = "{\"a\":\"alice\"}";
        let json_value = filter_to_json(valid_str).expect("Expect to be fine but failed");
        assert_eq!(json_value["a"], "alice");

        let valid_str = "Here is the result you ask for: {\"a\":\"alice\"}";
        let json_value = filter_to_json(valid_str).expect("Expect to be fine but failed");
        assert_eq!(json_value["a"], "alice");

        let invalid_str = "Here is the result you ask for: {\"a\":\"alice\"";
        filter_to_json(invalid_str).expect_err("This should give error but not");

        let invalid_str = "{{}}";
        filter_to_json(invalid_str).expect_err("This should give error but not");

        let invalid_str = "} backwards {";
        filter_to_json(invalid_str).expect_err("This should give error but not");
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!("{\"a\":1}", strip_code_fence("```json\n{\"a\":1}\n```"));
        assert_eq!("{\"a\":1}", strip_code_fence("```json{\"a\":1}```"));
        assert_eq!("{\"a\":1}", strip_code_fence("  ```\n{\"a\":1}\n```  "));
        assert_eq!("{\"a\":1}", strip_code_fence("{\"a\":1}"));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reply {
        a: String,
    }

    #[test]
    fn test_parse_json_reply() {
        let reply: Reply = parse_json_reply("```json\n{\"a\":\"alice\"}\n```").unwrap();
        assert_eq!(Reply { a: "alice".to_string() }, reply);

        let reply: Reply = parse_json_reply("Sure! {\"a\":\"bob\"} Hope it helps").unwrap();
        assert_eq!(Reply { a: "bob".to_string() }, reply);

        assert!(parse_json_reply::<Reply>("no json at all").is_err());
        assert!(parse_json_reply::<Reply>("{\"b\":1}").is_err());
    }
}
