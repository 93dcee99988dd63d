//! Optional observability helpers for probe-and-decide operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `winauth_probe.detect` with the `kind`
//!   (operation) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `winauth_probe_detect_total` counter for every
//!   attempt/cache-hit/detection/fallback, labeled by `kind` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Probe operations observed by the detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProbeKind {
	/// Cached credential-type decision for an authority.
	Detect,
	/// Raw scheme-set probe bypassing the decision cache.
	Schemes,
}
impl ProbeKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProbeKind::Detect => "detect",
			ProbeKind::Schemes => "schemes",
		}
	}
}
impl Display for ProbeKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProbeOutcome {
	/// Entry to a detector operation.
	Attempt,
	/// Decision served from the cache without network activity.
	CacheHit,
	/// Challenge observed and parsed into a scheme set.
	Detected,
	/// Transport failure or non-401 response absorbed into the NTLM default.
	Fallback,
}
impl ProbeOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProbeOutcome::Attempt => "attempt",
			ProbeOutcome::CacheHit => "cache_hit",
			ProbeOutcome::Detected => "detected",
			ProbeOutcome::Fallback => "fallback",
		}
	}
}
impl Display for ProbeOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
