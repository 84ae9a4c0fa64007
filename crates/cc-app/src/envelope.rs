//! Boundary result normalization.
//!
//! The IPC layer above this crate only ever sees
//! `{success: true, data: …}` or `{success: false, error: {…}}`; raw
//! transport and driver errors never cross this boundary.

use serde::Serialize;
use serde_json::{json, Value};

use cc_core::ArchiveError;

pub fn render<T: Serialize>(module: &str, context: &str, result: Result<T, ArchiveError>) -> Value {
    match result {
        Ok(data) => match serde_json::to_value(data) {
            Ok(value) => json!({ "success": true, "data": value }),
            Err(e) => error_value(
                module,
                context,
                &ArchiveError::Validation(format!("unserializable result: {}", e)),
            ),
        },
        Err(err) => error_value(module, context, &err),
    }
}

fn error_value(module: &str, context: &str, err: &ArchiveError) -> Value {
    json!({
        "success": false,
        "error": {
            "code": err.code(),
            "message": err.to_string(),
            "module": module,
            "context": context,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_core::RemoteError;

    #[test]
    fn success_wraps_the_payload() {
        let value = render("coordinator", "getPreviewData", Ok::<_, ArchiveError>(vec![1, 2]));
        assert_eq!(value["success"], true);
        assert_eq!(value["data"], json!([1, 2]));
    }

    #[test]
    fn failure_carries_code_module_and_context() {
        let value = render::<()>(
            "coordinator",
            "deleteItem",
            Err(ArchiveError::from(RemoteError::QuotaExceeded)),
        );
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "E651");
        assert_eq!(value["error"]["context"], "deleteItem");
    }
}
