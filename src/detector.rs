//! Probe-and-decide facade plus the process-wide shared detector.
//!
//! Control flow: a caller asks for a decision for a URI, the cache is checked by authority
//! key, and on a miss a single unauthenticated probe runs. The parsed scheme flags map to a
//! credential type through the priority policy and the result is memoized. On a hit the cached
//! value returns immediately with no network call.

// std
#[cfg(feature = "reqwest")] use std::sync::LazyLock;
// self
#[cfg(feature = "reqwest")] use crate::error::ConfigError;
#[cfg(feature = "reqwest")] use crate::transport::{ProbeConfig, ReqwestProbeTransport};
use crate::{
	_prelude::*,
	authority::Authority,
	cache::DecisionCache,
	challenge,
	obs::{self, ProbeKind, ProbeOutcome, ProbeSpan},
	scheme::{AuthScheme, CredentialType},
	transport::ProbeTransport,
};

/// Detects the authentication scheme a server supports and caches the decision per authority.
///
/// Every detection path is total: transport failures, unexpected statuses, and malformed
/// challenges all resolve to the NTLM fallback instead of surfacing an error. Detection is
/// advisory, so a failed probe must never be the reason an otherwise-viable connection attempt
/// is aborted.
#[derive(Clone)]
pub struct SchemeDetector<T> {
	cache: DecisionCache,
	transport: T,
}
impl<T> SchemeDetector<T>
where
	T: ProbeTransport,
{
	/// Builds a detector over `transport` with an empty cache.
	pub fn new(transport: T) -> Self {
		Self { cache: DecisionCache::default(), transport }
	}

	/// Builds a detector backed by a pre-existing cache, letting several detectors share one
	/// set of decisions.
	pub fn with_cache(transport: T, cache: DecisionCache) -> Self {
		Self { cache, transport }
	}

	/// The decision cache backing this detector.
	pub fn cache(&self) -> &DecisionCache {
		&self.cache
	}

	/// Probes `target` and returns the raw scheme flag set, bypassing the decision cache.
	///
	/// Only a 401 carries an authentication signal; any other status and any transport failure
	/// (refused connection, timeout, DNS, TLS) degrade to [`AuthScheme::NTLM`]. A single probe
	/// attempt is the full failure budget — there are no retries.
	pub async fn probe_schemes(&self, target: &Url) -> AuthScheme {
		const KIND: ProbeKind = ProbeKind::Schemes;

		let span = ProbeSpan::new(KIND, "probe_schemes");

		obs::record_probe_outcome(KIND, ProbeOutcome::Attempt);

		let (schemes, outcome) = span.instrument(self.probe_schemes_with_outcome(target)).await;

		obs::record_probe_outcome(KIND, outcome);

		schemes
	}

	/// Single probe attempt plus the outcome label describing how the scheme set was obtained.
	async fn probe_schemes_with_outcome(&self, target: &Url) -> (AuthScheme, ProbeOutcome) {
		match self.transport.probe(target).await {
			Ok(response) if response.is_unauthorized() => (
				challenge::parse(response.challenges.iter().map(String::as_str)),
				ProbeOutcome::Detected,
			),
			Ok(_) | Err(_) => (AuthScheme::NTLM, ProbeOutcome::Fallback),
		}
	}

	/// Decides the credential type for `target`, probing at most once per authority between
	/// explicit invalidations.
	///
	/// Concurrent first-access to one authority may race into duplicate probes; the cache keeps
	/// the first stored decision and every caller observes it.
	pub async fn detect(&self, target: &Url) -> CredentialType {
		const KIND: ProbeKind = ProbeKind::Detect;

		let span = ProbeSpan::new(KIND, "detect");

		obs::record_probe_outcome(KIND, ProbeOutcome::Attempt);

		let authority = Authority::of(target);

		if let Some(decision) = self.cache.lookup(&authority) {
			obs::record_probe_outcome(KIND, ProbeOutcome::CacheHit);

			return decision;
		}

		let (decision, outcome) = span
			.instrument(async move {
				let (schemes, outcome) = self.probe_schemes_with_outcome(target).await;

				(CredentialType::from_schemes(schemes), outcome)
			})
			.await;

		obs::record_probe_outcome(KIND, outcome);

		self.cache.store(authority, decision)
	}

	/// Blocking variant of [`detect`](Self::detect) for synchronous callers.
	///
	/// Drives the async core on a dedicated current-thread runtime, so it must not be invoked
	/// from within an async runtime. A runtime that cannot be built is treated like any other
	/// transport failure and resolves to [`CredentialType::Ntlm`].
	pub fn detect_blocking(&self, target: &Url) -> CredentialType {
		match tokio::runtime::Builder::new_current_thread().enable_all().build() {
			Ok(runtime) => runtime.block_on(self.detect(target)),
			Err(_) => CredentialType::Ntlm,
		}
	}

	/// Drops the cached decision for `target`'s authority; a no-op when nothing is cached.
	pub fn invalidate(&self, target: &Url) {
		self.cache.invalidate(&Authority::of(target));
	}

	/// Drops every cached decision.
	pub fn clear_cache(&self) {
		self.cache.clear();
	}
}

#[cfg(feature = "reqwest")]
static SHARED: LazyLock<Result<SchemeDetector<ReqwestProbeTransport>, ConfigError>> =
	LazyLock::new(|| {
		let transport = ReqwestProbeTransport::new(&ProbeConfig::default())?;

		Ok(SchemeDetector::new(transport))
	});

#[cfg(feature = "reqwest")]
fn shared() -> Option<&'static SchemeDetector<ReqwestProbeTransport>> {
	SHARED.as_ref().ok()
}

/// Decides the credential type for `target` using the process-wide detector.
///
/// The shared detector lives until process exit and its cache is administered through
/// [`invalidate_cache`] and [`clear_cache`]. Should the shared transport fail to construct,
/// this fails open to [`CredentialType::Ntlm`].
#[cfg(feature = "reqwest")]
pub async fn detect_supported_credential_type_async(target: &Url) -> CredentialType {
	match shared() {
		Some(detector) => detector.detect(target).await,
		None => CredentialType::Ntlm,
	}
}

/// Blocking variant of [`detect_supported_credential_type_async`]; equivalent result.
///
/// Must not be invoked from within an async runtime; blocks the calling thread for up to the
/// probe timeout on a cache miss.
#[cfg(feature = "reqwest")]
pub fn detect_supported_credential_type(target: &Url) -> CredentialType {
	match shared() {
		Some(detector) => detector.detect_blocking(target),
		None => CredentialType::Ntlm,
	}
}

/// Probes `target` for the raw advertised scheme set, bypassing the decision cache.
///
/// For callers that want the finer-grained flag set rather than the mapped decision. Each call
/// probes fresh; only mapped decisions are memoized.
#[cfg(feature = "reqwest")]
pub async fn supported_authentication_schemes(target: &Url) -> AuthScheme {
	match shared() {
		Some(detector) => detector.probe_schemes(target).await,
		None => AuthScheme::NTLM,
	}
}

/// Invalidates the process-wide cached decision for `target`'s authority. Idempotent.
#[cfg(feature = "reqwest")]
pub fn invalidate_cache(target: &Url) {
	if let Some(detector) = shared() {
		detector.invalidate(target);
	}
}

/// Clears every process-wide cached decision. Idempotent.
#[cfg(feature = "reqwest")]
pub fn clear_cache() {
	if let Some(detector) = shared() {
		detector.clear_cache();
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		collections::VecDeque,
		sync::atomic::{AtomicUsize, Ordering},
	};
	// crates.io
	use parking_lot::Mutex;
	// self
	use super::*;
	use crate::{
		error::TransportError,
		transport::{ProbeFuture, ProbeResponse},
	};

	#[derive(Default)]
	struct ScriptedTransport {
		responses: Mutex<VecDeque<Result<ProbeResponse, TransportError>>>,
		calls: AtomicUsize,
	}
	impl ScriptedTransport {
		fn unauthorized(challenges: &[&str]) -> Result<ProbeResponse, TransportError> {
			Ok(ProbeResponse {
				status: 401,
				challenges: challenges.iter().map(|c| (*c).to_owned()).collect(),
			})
		}

		fn push(&self, response: Result<ProbeResponse, TransportError>) {
			self.responses.lock().push_back(response);
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}
	}
	impl ProbeTransport for Arc<ScriptedTransport> {
		fn probe<'a>(&'a self, _target: &'a Url) -> ProbeFuture<'a, ProbeResponse> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let response = self
				.responses
				.lock()
				.pop_front()
				.expect("Scripted transport ran out of responses.");

			Box::pin(async move { response })
		}
	}

	fn scripted_detector() -> (SchemeDetector<Arc<ScriptedTransport>>, Arc<ScriptedTransport>) {
		let transport = Arc::new(ScriptedTransport::default());

		(SchemeDetector::new(transport.clone()), transport)
	}

	fn target(value: &str) -> Url {
		Url::parse(value).expect("Fixture URL should parse successfully.")
	}

	#[tokio::test]
	async fn detect_memoizes_per_authority() {
		let (detector, transport) = scripted_detector();
		let uri = target("http://host-a/collection");

		transport.push(ScriptedTransport::unauthorized(&["Negotiate"]));

		assert_eq!(detector.detect(&uri).await, CredentialType::Windows);
		assert_eq!(detector.detect(&uri).await, CredentialType::Windows);

		let sibling = target("http://host-a/other/path");

		assert_eq!(detector.detect(&sibling).await, CredentialType::Windows);
		assert_eq!(transport.calls(), 1, "Cache hits must not touch the network.");
	}

	#[tokio::test]
	async fn invalidate_forces_exactly_one_new_probe() {
		let (detector, transport) = scripted_detector();
		let uri = target("http://host-a/");

		transport.push(ScriptedTransport::unauthorized(&["Negotiate"]));
		transport.push(ScriptedTransport::unauthorized(&["Negotiate, NTLM"]));

		assert_eq!(detector.detect(&uri).await, CredentialType::Windows);

		detector.invalidate(&uri);

		// Server reconfiguration between probes may legitimately change the decision.
		assert_eq!(detector.detect(&uri).await, CredentialType::Ntlm);
		assert_eq!(detector.detect(&uri).await, CredentialType::Ntlm);
		assert_eq!(transport.calls(), 2);
	}

	#[tokio::test]
	async fn transport_failure_fails_open() {
		let (detector, transport) = scripted_detector();
		let uri = target("https://unreachable/");

		transport.push(Err(TransportError::Io(std::io::Error::other("connection refused"))));

		assert_eq!(detector.detect(&uri).await, CredentialType::Ntlm);
	}

	#[tokio::test]
	async fn non_unauthorized_status_skips_challenge_parsing() {
		let (detector, transport) = scripted_detector();

		// A 200 listing Negotiate must still fall back; non-401 gives no auth signal.
		transport.push(Ok(ProbeResponse { status: 200, challenges: vec!["Negotiate".into()] }));

		assert_eq!(detector.detect(&target("http://host-a/")).await, CredentialType::Ntlm);
	}

	#[tokio::test]
	async fn probe_outcomes_distinguish_detection_from_fallback() {
		let (detector, transport) = scripted_detector();
		let uri = target("http://host-a/");

		transport.push(ScriptedTransport::unauthorized(&["Negotiate"]));
		transport.push(Ok(ProbeResponse { status: 200, challenges: Vec::new() }));
		transport.push(Err(TransportError::Io(std::io::Error::other("connection reset"))));

		assert_eq!(
			detector.probe_schemes_with_outcome(&uri).await,
			(AuthScheme::NEGOTIATE, ProbeOutcome::Detected),
		);
		// A non-401 and a transport failure both surface as fallback, not as detection.
		assert_eq!(
			detector.probe_schemes_with_outcome(&uri).await,
			(AuthScheme::NTLM, ProbeOutcome::Fallback),
		);
		assert_eq!(
			detector.probe_schemes_with_outcome(&uri).await,
			(AuthScheme::NTLM, ProbeOutcome::Fallback),
		);
	}

	#[tokio::test]
	async fn probe_schemes_bypasses_the_cache() {
		let (detector, transport) = scripted_detector();
		let uri = target("http://host-a/");

		transport.push(ScriptedTransport::unauthorized(&["Negotiate", "NTLM"]));
		transport.push(ScriptedTransport::unauthorized(&["Negotiate"]));

		assert_eq!(
			detector.probe_schemes(&uri).await,
			AuthScheme::NEGOTIATE | AuthScheme::NTLM,
		);
		assert_eq!(detector.probe_schemes(&uri).await, AuthScheme::NEGOTIATE);
		assert_eq!(transport.calls(), 2);
		assert!(detector.cache().is_empty(), "Raw probes must not populate the decision cache.");
	}

	#[tokio::test]
	async fn clear_cache_forgets_every_authority() {
		let (detector, transport) = scripted_detector();

		transport.push(ScriptedTransport::unauthorized(&["Negotiate"]));
		transport.push(ScriptedTransport::unauthorized(&["NTLM"]));

		detector.detect(&target("http://host-a/")).await;
		detector.detect(&target("http://host-b/")).await;

		assert_eq!(detector.cache().len(), 2);

		detector.clear_cache();

		assert!(detector.cache().is_empty());
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn preludet_builds_a_reqwest_detector() {
		let detector = crate::_preludet::test_scheme_detector();

		assert!(detector.cache().is_empty());
	}

	#[test]
	fn detect_blocking_matches_async_behavior() {
		let (detector, transport) = scripted_detector();
		let uri = target("http://host-a/");

		transport.push(ScriptedTransport::unauthorized(&["Negotiate"]));

		assert_eq!(detector.detect_blocking(&uri), CredentialType::Windows);
		assert_eq!(detector.detect_blocking(&uri), CredentialType::Windows);
		assert_eq!(transport.calls(), 1);
	}
}
