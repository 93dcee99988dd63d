//! Authority keys scoping one cached authentication decision.

// self
use crate::_prelude::*;

/// Sentinel port used when a scheme registers no well-known default.
const UNSPECIFIED_PORT: u16 = 0;

/// Normalized scheme + host + port triple identifying one server endpoint.
///
/// Paths and queries are deliberately excluded: authentication configuration is assumed to be
/// a server-wide property, so every URI sharing an authority shares one cached decision. The
/// port is the explicit one when present, otherwise the scheme's well-known default, so
/// `http://host` and `http://host:80` resolve to the same key while `http://host:8080` and
/// `https://host` do not.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Authority {
	/// URI scheme, already lowercased by [`Url`].
	pub scheme: String,
	/// Host component; empty for host-less URLs.
	pub host: String,
	/// Explicit or scheme-default port; `0` when the scheme has neither.
	pub port: u16,
}
impl Authority {
	/// Extracts the authority of a parsed URL.
	pub fn of(url: &Url) -> Self {
		Self {
			scheme: url.scheme().to_owned(),
			host: url.host_str().unwrap_or_default().to_owned(),
			port: url.port_or_known_default().unwrap_or(UNSPECIFIED_PORT),
		}
	}
}
impl Display for Authority {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
	}
}
