// self
use crate::obs::{ProbeKind, ProbeOutcome};

/// Counter incremented for every recorded detector outcome.
pub const PROBE_COUNTER_NAME: &str = "winauth_probe_detect_total";

/// Records a probe outcome via the global metrics recorder (when enabled).
pub fn record_probe_outcome(kind: ProbeKind, outcome: ProbeOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			PROBE_COUNTER_NAME,
			"kind" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn counter_name_matches_crate_prefix() {
		assert_eq!(PROBE_COUNTER_NAME, "winauth_probe_detect_total");
	}

	#[test]
	fn record_probe_outcome_noop_without_metrics() {
		record_probe_outcome(ProbeKind::Detect, ProbeOutcome::Fallback);
	}
}
