//! Thread-safe in-memory decision cache keyed by server authority.

// self
use crate::{_prelude::*, authority::Authority, scheme::CredentialType};

type DecisionMap = Arc<RwLock<HashMap<Authority, CredentialType>>>;

/// Process-shareable map from authority to the credential type decided for it.
///
/// Entries never expire; they leave the map only through [`invalidate`](Self::invalidate) or
/// [`clear`](Self::clear). Cloning is cheap and every clone shares the same underlying map, so
/// one cache can back several detectors without extra coordination.
#[derive(Clone, Debug, Default)]
pub struct DecisionCache(DecisionMap);
impl DecisionCache {
	/// Returns the cached decision for an authority, if present. Never performs I/O.
	pub fn lookup(&self, authority: &Authority) -> Option<CredentialType> {
		self.0.read().get(authority).copied()
	}

	/// Stores a decision unless one is already present, returning whichever value the entry
	/// holds afterwards.
	///
	/// Concurrent misses for one authority may race to probe; insert-if-absent keeps the first
	/// writer's value and later racers adopt it. Replacing a stored decision requires an
	/// explicit [`invalidate`](Self::invalidate) first.
	pub fn store(&self, authority: Authority, decision: CredentialType) -> CredentialType {
		*self.0.write().entry(authority).or_insert(decision)
	}

	/// Removes one authority's entry; a no-op when absent.
	pub fn invalidate(&self, authority: &Authority) {
		self.0.write().remove(authority);
	}

	/// Removes every entry.
	pub fn clear(&self) {
		self.0.write().clear();
	}

	/// Number of cached decisions.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true when nothing is cached.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn authority(value: &str) -> Authority {
		Authority::of(&Url::parse(value).expect("Fixture URL should parse successfully."))
	}

	#[test]
	fn store_is_insert_if_absent() {
		let cache = DecisionCache::default();
		let key = authority("http://host-a");
		let first = cache.store(key.clone(), CredentialType::Windows);
		let second = cache.store(key.clone(), CredentialType::Ntlm);

		assert_eq!(first, CredentialType::Windows);
		assert_eq!(second, CredentialType::Windows, "Later writers adopt the stored value.");
		assert_eq!(cache.lookup(&key), Some(CredentialType::Windows));
	}

	#[test]
	fn invalidate_permits_a_new_decision() {
		let cache = DecisionCache::default();
		let key = authority("http://host-a");

		cache.store(key.clone(), CredentialType::Windows);
		cache.invalidate(&key);

		assert_eq!(cache.lookup(&key), None);
		assert_eq!(cache.store(key.clone(), CredentialType::Ntlm), CredentialType::Ntlm);
	}

	#[test]
	fn invalidate_and_clear_tolerate_absent_keys() {
		let cache = DecisionCache::default();

		cache.invalidate(&authority("http://never-stored"));
		cache.clear();

		assert!(cache.is_empty());
	}

	#[test]
	fn clear_removes_every_entry() {
		let cache = DecisionCache::default();

		cache.store(authority("http://host-a"), CredentialType::Ntlm);
		cache.store(authority("http://host-b"), CredentialType::Windows);

		assert_eq!(cache.len(), 2);

		cache.clear();

		assert!(cache.is_empty());
	}

	#[test]
	fn clones_share_one_map() {
		let cache = DecisionCache::default();
		let twin = cache.clone();
		let key = authority("http://host-a");

		cache.store(key.clone(), CredentialType::Windows);

		assert_eq!(twin.lookup(&key), Some(CredentialType::Windows));
	}
}
