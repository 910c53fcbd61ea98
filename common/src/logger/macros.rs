use tracing::{Span, field};

use super::TraceId;

/// Root span for one monitor cycle. `value` and `outcome` are filled in
/// once the cycle knows them.
pub fn cycle_span(mode: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "cycle",
        mode = %mode,
        trace_id = %trace_id,
        value = field::Empty,
        outcome = field::Empty
    )
}

/// Child span, inherits the cycle's trace id through the span tree.
pub fn child_span(name: &'static str) -> Span {
    tracing::info_span!("step", name = %name, attempt = field::Empty)
}
