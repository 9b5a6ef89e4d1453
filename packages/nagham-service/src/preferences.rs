use std::{
	collections::HashMap,
	hash::BuildHasher,
	sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};
use nagham_config::{ProviderKind, is_region_code};

pub type UserId = i64;

const DEFAULT_SHARDS: usize = 16;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreference {
	#[serde(default)]
	pub provider: Option<ProviderKind>,
	#[serde(default)]
	pub region: Option<String>,
}

/// Per-user preferences, sharded by user id so a write locks only one shard.
///
/// The resolution core only reads from the store. Writes come from the boundary adapter's
/// settings surface.
pub struct PreferenceStore {
	shards: Box<[RwLock<HashMap<UserId, UserPreference>>]>,
	hasher: RandomState,
}
impl PreferenceStore {
	pub fn new() -> Self {
		Self::with_shards(DEFAULT_SHARDS)
	}

	pub fn with_shards(count: usize) -> Self {
		let shards = (0..count.max(1)).map(|_| RwLock::new(HashMap::new())).collect();

		Self { shards, hasher: RandomState::new() }
	}

	/// Stored preference, or the default when the user never set one.
	pub fn get(&self, user_id: UserId) -> UserPreference {
		self.read(user_id).get(&user_id).cloned().unwrap_or_default()
	}

	pub fn provider(&self, user_id: UserId, default: ProviderKind) -> ProviderKind {
		self.read(user_id).get(&user_id).and_then(|pref| pref.provider).unwrap_or(default)
	}

	pub fn region(&self, user_id: UserId) -> Option<String> {
		self.read(user_id).get(&user_id).and_then(|pref| pref.region.clone())
	}

	/// Replaces the user's preference. Region codes are lowercased and must be two letters.
	pub fn set(&self, user_id: UserId, mut preference: UserPreference) -> Result<()> {
		if let Some(region) = preference.region.take() {
			let region = region.trim().to_ascii_lowercase();

			if !region.is_empty() {
				if !is_region_code(&region) {
					return Err(Error::InvalidRequest {
						message: format!("Region {region:?} must be a two-letter region code."),
					});
				}

				preference.region = Some(region);
			}
		}

		self.write(user_id).insert(user_id, preference);

		Ok(())
	}

	pub fn clear(&self, user_id: UserId) {
		self.write(user_id).remove(&user_id);
	}

	fn shard(&self, user_id: UserId) -> &RwLock<HashMap<UserId, UserPreference>> {
		let idx = (BuildHasher::hash_one(&self.hasher, user_id) % self.shards.len() as u64) as usize;

		&self.shards[idx]
	}

	fn read(&self, user_id: UserId) -> RwLockReadGuard<'_, HashMap<UserId, UserPreference>> {
		self.shard(user_id).read().unwrap_or_else(|err| err.into_inner())
	}

	fn write(&self, user_id: UserId) -> RwLockWriteGuard<'_, HashMap<UserId, UserPreference>> {
		self.shard(user_id).write().unwrap_or_else(|err| err.into_inner())
	}
}
impl Default for PreferenceStore {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use std::{sync::Arc, thread};

	use super::*;

	#[test]
	fn unknown_user_gets_defaults() {
		let store = PreferenceStore::new();

		assert_eq!(store.get(42), UserPreference::default());
		assert_eq!(store.provider(42, ProviderKind::Video), ProviderKind::Video);
		assert_eq!(store.region(42), None);
	}

	#[test]
	fn set_normalizes_region() {
		let store = PreferenceStore::new();

		store
			.set(7, UserPreference { provider: Some(ProviderKind::Catalog), region: Some(" EG ".into()) })
			.expect("valid preference");

		assert_eq!(store.region(7).as_deref(), Some("eg"));
		assert_eq!(store.provider(7, ProviderKind::Video), ProviderKind::Catalog);
	}

	#[test]
	fn blank_region_clears_it() {
		let store = PreferenceStore::new();

		store
			.set(7, UserPreference { provider: None, region: Some("  ".into()) })
			.expect("blank region is allowed");

		assert_eq!(store.region(7), None);
	}

	#[test]
	fn rejects_malformed_region() {
		let store = PreferenceStore::new();
		let err = store
			.set(7, UserPreference { provider: None, region: Some("egypt".into()) })
			.expect_err("malformed region must fail");

		assert!(matches!(err, Error::InvalidRequest { .. }));
		assert_eq!(store.get(7), UserPreference::default());
	}

	#[test]
	fn concurrent_writers_do_not_interfere() {
		let store = Arc::new(PreferenceStore::with_shards(4));
		let handles: Vec<_> = (0..8)
			.map(|user| {
				let store = store.clone();

				thread::spawn(move || {
					for _ in 0..100 {
						store
							.set(user, UserPreference {
								provider: Some(ProviderKind::Catalog),
								region: Some("sa".into()),
							})
							.expect("valid preference");
						assert_eq!(store.provider(user, ProviderKind::Video), ProviderKind::Catalog);
					}
				})
			})
			.collect();

		for handle in handles {
			handle.join().expect("writer thread panicked");
		}
		for user in 0..8 {
			assert_eq!(store.region(user).as_deref(), Some("sa"));
		}

		store.clear(3);

		assert_eq!(store.get(3), UserPreference::default());
	}
}
