// self
use crate::{_prelude::*, obs::ProbeKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedProbe<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedProbe<F> = F;

/// A span builder used by detector operations.
#[derive(Clone, Debug)]
pub struct ProbeSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl ProbeSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: ProbeKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("winauth_probe.detect", kind = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedProbe<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn probe_span_builds_without_tracing() {
		// Compile-time smoke test ensures the passthrough alias lines up with the span surface.
		let span = ProbeSpan::new(ProbeKind::Detect, "test");
		let _fut: InstrumentedProbe<_> = span.instrument(async { 42 });
	}

	#[cfg(feature = "tracing")]
	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = ProbeSpan::new(ProbeKind::Schemes, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
