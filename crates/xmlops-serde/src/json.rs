//! JSON helpers around `serde_json`.
//!
//! The transcoding engine assembles JSON text itself; this parses that text
//! back into a value the generated `from_json` can walk.
use crate::error::Result;

/// Parse JSON text into a `serde_json::Value`.
pub fn parse_json_value(s: &str) -> Result<serde_json::Value> {
    Ok(serde_json::from_str(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranscodeError;

    #[test]
    fn test_parse_json_value() -> Result<()> {
        assert_eq!(parse_json_value("null")?, serde_json::Value::Null);
        assert!(matches!(
            parse_json_value(r#"{"Name":Ann}"#),
            Err(TranscodeError::Json(_))
        ));
        Ok(())
    }
}
