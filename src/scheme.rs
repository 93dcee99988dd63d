//! Authentication scheme flag set and the credential-type decision derived from it.

// std
use std::ops::{BitOr, BitOrAssign};
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError, ser::SerializeSeq};
// self
use crate::_prelude::*;

/// Set of authentication schemes a server advertises.
///
/// Flags combine bitwise because a server may list several schemes across one or more
/// `WWW-Authenticate` instances. The empty set is a transient parsing state only; final
/// detection results are always passed through [`normalized`](Self::normalized) first, so the
/// zero value never escapes as an answer.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AuthScheme(u8);
impl AuthScheme {
	/// No scheme detected yet.
	pub const NONE: Self = Self(0);
	/// SPNEGO `Negotiate` (Kerberos with NTLM downgrade).
	pub const NEGOTIATE: Self = Self(1 << 0);
	/// Legacy `NTLM` challenge/response.
	pub const NTLM: Self = Self(1 << 1);
	/// Anonymous access; part of the caller vocabulary, never produced by a probe.
	pub const ANONYMOUS: Self = Self(1 << 2);

	const LABELS: [(Self, &'static str); 3] =
		[(Self::NEGOTIATE, "negotiate"), (Self::NTLM, "ntlm"), (Self::ANONYMOUS, "anonymous")];

	/// Returns true when every flag in `other` is present in `self`.
	pub const fn contains(self, other: Self) -> bool {
		self.0 & other.0 == other.0
	}

	/// Adds every flag in `other` to the set.
	pub const fn insert(&mut self, other: Self) {
		self.0 |= other.0;
	}

	/// Returns true when no flag is set.
	pub const fn is_empty(self) -> bool {
		self.0 == 0
	}

	/// Degrades the empty set to [`NTLM`](Self::NTLM).
	///
	/// The absence of a confidently detected scheme is never reported as "no auth"; it always
	/// lands on the scheme every known server generation accepts.
	pub const fn normalized(self) -> Self {
		if self.is_empty() { Self::NTLM } else { self }
	}

	/// Resolves a single scheme token (as it appears in a challenge) to its flag.
	pub fn from_label(label: &str) -> Option<Self> {
		Self::LABELS
			.iter()
			.find(|(_, candidate)| label.eq_ignore_ascii_case(candidate))
			.map(|(flag, _)| *flag)
	}

	/// Iterator over the labels of the flags present in the set.
	pub fn labels(self) -> impl Iterator<Item = &'static str> {
		Self::LABELS.iter().filter(move |(flag, _)| self.contains(*flag)).map(|(_, label)| *label)
	}
}
impl BitOr for AuthScheme {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self {
		Self(self.0 | rhs.0)
	}
}
impl BitOrAssign for AuthScheme {
	fn bitor_assign(&mut self, rhs: Self) {
		self.0 |= rhs.0;
	}
}
impl Debug for AuthScheme {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "AuthScheme({self})")
	}
}
impl Display for AuthScheme {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if self.is_empty() {
			return f.write_str("none");
		}

		let mut first = true;

		for label in self.labels() {
			if !first {
				f.write_str("|")?;
			}

			f.write_str(label)?;

			first = false;
		}

		Ok(())
	}
}
impl FromStr for AuthScheme {
	type Err = SchemeParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::from_label(s).ok_or_else(|| SchemeParseError { token: s.to_owned() })
	}
}
impl Serialize for AuthScheme {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let labels = self.labels().collect::<Vec<_>>();
		let mut seq = serializer.serialize_seq(Some(labels.len()))?;

		for label in labels {
			seq.serialize_element(label)?;
		}

		seq.end()
	}
}
impl<'de> Deserialize<'de> for AuthScheme {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let labels = <Vec<String>>::deserialize(deserializer)?;
		let mut schemes = Self::NONE;

		for label in labels {
			schemes.insert(label.parse().map_err(DeError::custom)?);
		}

		Ok(schemes)
	}
}

/// Error returned when a scheme token is not part of the known vocabulary.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unrecognized authentication scheme: {token}.")]
pub struct SchemeParseError {
	/// The offending scheme token.
	pub token: String,
}

/// Credential configuration decision produced for a probed endpoint.
///
/// Exactly one value per probe, a pure function of the detected [`AuthScheme`] set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialType {
	/// No credentials.
	None,
	/// Windows integrated credentials (Kerberos/Negotiate-backed).
	Windows,
	/// Explicit NTLM credentials.
	Ntlm,
}
impl CredentialType {
	/// Maps a detected scheme set to one credential type; first match wins.
	///
	/// NTLM deliberately outranks Negotiate even though Negotiate can itself downgrade to NTLM:
	/// every known server generation accepts NTLM, so it doubles as the default for empty or
	/// unrecognized sets. The ordering is policy; changing it changes which credentials callers
	/// present.
	pub const fn from_schemes(schemes: AuthScheme) -> Self {
		if schemes.contains(AuthScheme::NTLM) {
			Self::Ntlm
		} else if schemes.contains(AuthScheme::NEGOTIATE) {
			Self::Windows
		} else {
			Self::Ntlm
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialType::None => "none",
			CredentialType::Windows => "windows",
			CredentialType::Ntlm => "ntlm",
		}
	}
}
impl Display for CredentialType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
