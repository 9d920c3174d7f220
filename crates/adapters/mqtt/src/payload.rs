//! Parsing of incoming sensor and switch payloads.
//!
//! Sensor payloads are either a bare number (`"48.5"`) or a JSON object; for
//! objects `value_key` is a dotted path such as `AM2301.Humidity`. Numbers
//! sent as JSON strings are accepted.

use serde_json::Value;

use crate::error::MqttError;

/// Extract a finite numeric value from a sensor payload.
///
/// # Errors
///
/// Returns [`MqttError::PayloadParse`] for malformed JSON and
/// [`MqttError::MissingValue`] when no finite number is found.
pub fn parse_value(payload: &str, value_key: Option<&str>) -> Result<f64, MqttError> {
    let trimmed = payload.trim();
    if value_key.is_none()
        && let Ok(value) = trimmed.parse::<f64>()
        && value.is_finite()
    {
        return Ok(value);
    }

    let json: Value = serde_json::from_str(trimmed).map_err(MqttError::PayloadParse)?;
    let node = match value_key {
        Some(key) => key.split('.').try_fold(&json, |node, part| node.get(part)),
        None => Some(&json),
    };
    node.and_then(as_number)
        .filter(|v| v.is_finite())
        .ok_or_else(|| MqttError::MissingValue {
            key: value_key.map(str::to_string),
        })
}

fn as_number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Interpret a switch state payload: `ON`/`OFF`, `1`/`0`, `true`/`false`, or
/// a JSON object carrying one of those under `POWER` or `state`.
#[must_use]
pub fn parse_switch_state(payload: &str) -> Option<bool> {
    let trimmed = payload.trim();
    if let Some(state) = switch_word(trimmed) {
        return Some(state);
    }
    let json: Value = serde_json::from_str(trimmed).ok()?;
    ["POWER", "state"]
        .iter()
        .find_map(|key| json.get(key))
        .and_then(|v| v.as_str().and_then(switch_word).or_else(|| v.as_bool()))
}

fn switch_word(word: &str) -> Option<bool> {
    if ["on", "1", "true"].iter().any(|w| word.eq_ignore_ascii_case(w)) {
        Some(true)
    } else if ["off", "0", "false"].iter().any(|w| word.eq_ignore_ascii_case(w)) {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_bare_number() {
        assert!((parse_value(" 48.5\n", None).unwrap() - 48.5).abs() < f64::EPSILON);
    }

    #[test]
    fn should_parse_nested_json_key() {
        let payload =
            r#"{"Time":"2024-06-01T08:00:00","AM2301":{"Temperature":22.1,"Humidity":63.4}}"#;
        let value = parse_value(payload, Some("AM2301.Humidity")).unwrap();
        assert!((value - 63.4).abs() < f64::EPSILON);
    }

    #[test]
    fn should_accept_number_sent_as_string() {
        let value = parse_value(r#"{"humidity":"55"}"#, Some("humidity")).unwrap();
        assert!((value - 55.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_fail_when_key_is_missing() {
        let err = parse_value(r#"{"temperature":21}"#, Some("humidity")).unwrap_err();
        assert!(matches!(err, MqttError::MissingValue { .. }));
    }

    #[test]
    fn should_fail_on_garbage() {
        assert!(matches!(
            parse_value("unavailable", None),
            Err(MqttError::PayloadParse(_))
        ));
    }

    #[test]
    fn should_parse_switch_words() {
        assert_eq!(parse_switch_state("ON"), Some(true));
        assert_eq!(parse_switch_state("off"), Some(false));
        assert_eq!(parse_switch_state("0"), Some(false));
        assert_eq!(parse_switch_state("maybe"), None);
    }

    #[test]
    fn should_parse_switch_json() {
        assert_eq!(parse_switch_state(r#"{"POWER":"OFF"}"#), Some(false));
        assert_eq!(parse_switch_state(r#"{"state":true}"#), Some(true));
        assert_eq!(parse_switch_state(r#"{"other":"ON"}"#), None);
    }
}
