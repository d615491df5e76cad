//! Assertion helpers for test bodies

use serde_json::Value;

/// Verdict returned when [`assert_many`] receives nothing to check
pub const NO_ASSERTIONS: &str = "no assertions!";

/// Combine several verdicts into one.
///
/// Returns `true` when every value is `true`, otherwise the first value that
/// is not. An empty input fails with [`NO_ASSERTIONS`].
pub fn assert_many<I>(values: I) -> Value
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    let mut values = values.into_iter().map(Into::into).peekable();
    if values.peek().is_none() {
        return Value::from(NO_ASSERTIONS);
    }
    values
        .find(|v| *v != Value::Bool(true))
        .unwrap_or(Value::Bool(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty() {
        assert_eq!(assert_many(Vec::<Value>::new()), json!("no assertions!"));
    }

    #[test]
    fn test_all_true() {
        assert_eq!(assert_many([true, true]), Value::Bool(true));
    }

    #[test]
    fn test_first_failure_wins() {
        let verdict = assert_many([
            json!(true),
            json!("nested in a suite"),
            json!("seven wasn't nine"),
        ]);
        assert_eq!(verdict, json!("nested in a suite"));
    }
}
