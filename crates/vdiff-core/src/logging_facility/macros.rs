//! Operation logging macros
//!
//! Extra `key = value` fields may follow the required arguments and are
//! passed through to `tracing` unchanged.

/// Log that an operation started
///
/// ```
/// # use vdiff_core::log_op_start;
/// log_op_start!("parse_diff");
/// log_op_start!("parse_diff", line_count = 12);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
            $($($field)*)?
        )
    };
}

/// Log that an operation finished
///
/// ```
/// # use vdiff_core::log_op_end;
/// log_op_end!("unparse_diff", duration_ms = 3);
/// log_op_end!("unparse_diff", duration_ms = 3, line_count = 7);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        )
    };
}

/// Log that an operation failed
///
/// The error goes through [`VdError`](crate::errors::VdError), so the event
/// carries its stable code and, when known, the offending node and diff line.
///
/// ```
/// # use vdiff_core::{log_op_error, errors::VariationDiffError};
/// log_op_error!("remove_node", VariationDiffError::CannotRemoveRoot, duration_ms = 0);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let vd_err: $crate::errors::VdError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?vd_err.kind(),
            err_code = vd_err.code(),
            node_id = vd_err.node_id(),
            line = vd_err.line(),
            $($($field)*)?
        )
    }};
}
