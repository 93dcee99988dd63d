//! `WWW-Authenticate` challenge parsing.

// self
use crate::scheme::AuthScheme;

/// Folds every `WWW-Authenticate` value observed on a 401 response into a scheme flag set.
///
/// One header line may pack several comma-separated challenges, and each challenge may carry
/// parameters (realm, nonce, an initial token) after the scheme name; only the leading token of
/// each challenge matters here. Unrecognized schemes are skipped, not errors. An empty result,
/// whether from a missing header or from a challenge with no recognized scheme, normalizes to
/// [`AuthScheme::NTLM`].
pub fn parse<'a, I>(values: I) -> AuthScheme
where
	I: IntoIterator<Item = &'a str>,
{
	let mut schemes = AuthScheme::NONE;

	for value in values {
		for challenge in value.split(',') {
			let token = challenge.trim();
			let name = token.split(' ').next().unwrap_or(token);

			if let Some(scheme) = AuthScheme::from_label(name) {
				schemes.insert(scheme);
			}
		}
	}

	schemes.normalized()
}
