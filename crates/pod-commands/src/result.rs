use serde_json::{json, Value};

use crate::error::CommandError;

/// Outcome of one command: a data payload or a coded failure.
pub type CommandResult = Result<Value, CommandError>;

/// The machine-readable form of a result.
///
/// `{"success": true, "data": ...}` on success and
/// `{"success": false, "error": {"code": ..., "message": ...}}` on failure.
pub fn envelope(result: &CommandResult) -> Value {
    match result {
        Ok(data) => json!({ "success": true, "data": data }),
        Err(e) => json!({
            "success": false,
            "error": { "code": e.code.as_str(), "message": e.message },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn success_envelope() {
        let v = envelope(&Ok(json!({"location": "https://pod.example/"})));
        assert_eq!(v["success"], json!(true));
        assert_eq!(v["data"]["location"], json!("https://pod.example/"));
        assert!(v.get("error").is_none());
    }

    #[test]
    fn failure_envelope() {
        let v = envelope(&Err(CommandError::new(ErrorCode::NotAFile, "is a folder")));
        assert_eq!(
            v,
            json!({"success": false, "error": {"code": "NOT_A_FILE", "message": "is a folder"}})
        );
    }
}
