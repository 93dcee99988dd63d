//! Transport seam used to issue unauthenticated probe requests.
//!
//! [`ProbeTransport`] is the crate's only dependency on an HTTP stack. Implementations send a
//! single GET with no credentials attached and report the status plus every `WWW-Authenticate`
//! value they observe; HTTP-level outcomes (4xx/5xx included) are ordinary responses, while
//! connectivity, TLS, and timeout problems surface as [`TransportError`] for the detector to
//! absorb.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::{header::WWW_AUTHENTICATE, redirect::Policy};
// self
#[cfg(feature = "reqwest")] use crate::error::ConfigError;
use crate::{_prelude::*, error::TransportError};

/// Reference probe timeout applied when callers do not override it.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);
/// Status code that carries an authentication challenge.
const UNAUTHORIZED: u16 = 401;

/// Boxed future returned by [`ProbeTransport`] implementations.
pub type ProbeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Probe parameters applied to the underlying HTTP client.
#[derive(Clone, Copy, Debug)]
pub struct ProbeConfig {
	/// Upper bound on one probe request, connection establishment included.
	pub timeout: Duration,
}
impl Default for ProbeConfig {
	fn default() -> Self {
		Self { timeout: DEFAULT_PROBE_TIMEOUT }
	}
}

/// Status and challenge headers captured from a probe response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProbeResponse {
	/// HTTP status code.
	pub status: u16,
	/// Every `WWW-Authenticate` value observed on the response, in arrival order.
	pub challenges: Vec<String>,
}
impl ProbeResponse {
	/// True when the server demanded authentication.
	pub fn is_unauthorized(&self) -> bool {
		self.status == UNAUTHORIZED
	}
}

/// Abstraction over HTTP stacks able to issue one unauthenticated GET.
///
/// Implementations must not follow redirects and must not attach credentials: the probe's whole
/// purpose is to observe the server's unauthenticated challenge, and a redirect response is
/// itself a detection signal the detector turns into the fallback decision. Implementations
/// must be `Send + Sync + 'static` so one transport can back a process-wide detector.
pub trait ProbeTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends an unauthenticated GET to `target` and captures status + challenges.
	fn probe<'a>(&'a self, target: &'a Url) -> ProbeFuture<'a, ProbeResponse>;
}

/// Thin wrapper around [`ReqwestClient`] configured for probing: redirect following disabled
/// and a bounded request timeout.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestProbeTransport(ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestProbeTransport {
	/// Builds a probe client honoring `config`.
	pub fn new(config: &ProbeConfig) -> Result<Self, ConfigError> {
		let client =
			ReqwestClient::builder().redirect(Policy::none()).timeout(config.timeout).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest client.
	///
	/// The caller keeps responsibility for disabling redirect following and bounding the
	/// timeout on the supplied client.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl ProbeTransport for ReqwestProbeTransport {
	fn probe<'a>(&'a self, target: &'a Url) -> ProbeFuture<'a, ProbeResponse> {
		let client = self.0.clone();
		let target = target.clone();

		Box::pin(async move {
			let response = client.get(target).send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let challenges = response
				.headers()
				.get_all(WWW_AUTHENTICATE)
				.iter()
				.filter_map(|value| value.to_str().ok())
				.map(str::to_owned)
				.collect();

			Ok(ProbeResponse { status, challenges })
		})
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestProbeTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestProbeTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_config_matches_reference_policy() {
		assert_eq!(ProbeConfig::default().timeout, Duration::from_secs(30));
	}

	#[test]
	fn unauthorized_detection_is_exact() {
		assert!(ProbeResponse { status: 401, challenges: Vec::new() }.is_unauthorized());
		assert!(!ProbeResponse { status: 407, challenges: Vec::new() }.is_unauthorized());
		assert!(!ProbeResponse { status: 200, challenges: Vec::new() }.is_unauthorized());
	}
}
