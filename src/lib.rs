//! Fail-open Windows authentication scheme detection for HTTP endpoints—probe once per
//! authority, cache the decision, and pick the right credential type.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod authority;
pub mod cache;
pub mod challenge;
pub mod detector;
pub mod error;
pub mod obs;
pub mod scheme;
pub mod transport;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		detector::SchemeDetector,
		transport::{ProbeConfig, ReqwestProbeTransport},
	};

	/// Detector type alias used by reqwest-backed integration tests.
	pub type ReqwestTestDetector = SchemeDetector<ReqwestProbeTransport>;

	/// Builds a reqwest-backed detector with a short probe timeout so mock-server tests fail
	/// fast instead of waiting out the reference 30-second policy.
	pub fn test_scheme_detector() -> ReqwestTestDetector {
		let transport =
			ReqwestProbeTransport::new(&ProbeConfig { timeout: Duration::from_secs(5) })
				.expect("Failed to build reqwest transport for tests.");

		SchemeDetector::new(transport)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
