//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical across the logging macros,
//! the test capture layer and the error facility.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Graph identifiers
pub const FIELD_NODE_ID: &str = "node_id";
pub const FIELD_LINE: &str = "line";

// Collection sizes
pub const FIELD_NODE_COUNT: &str = "node_count";
pub const FIELD_LINE_COUNT: &str = "line_count";
pub const FIELD_MATCHED_PAIRS: &str = "matched_pairs";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessibility() {
        // Verify all constants are non-empty
        assert!(!FIELD_COMPONENT.is_empty());
        assert!(!FIELD_OP.is_empty());
        assert!(!FIELD_NODE_COUNT.is_empty());
        assert!(!EVENT_START.is_empty());
        assert!(!EVENT_END.is_empty());
        assert!(!EVENT_END_ERROR.is_empty());
    }

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_error_fields_match_macro_field_names() {
        // log_op_error! emits these keys verbatim
        assert_eq!(FIELD_ERR_KIND, "err_kind");
        assert_eq!(FIELD_ERR_CODE, "err_code");
        assert_eq!(FIELD_NODE_ID, "node_id");
        assert_eq!(FIELD_LINE, "line");
    }
}
