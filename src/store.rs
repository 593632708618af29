//! Storage contracts and built-in store implementations.
//!
//! Two contracts cover the bridge's persistence needs: [`HandshakeStore`] is a
//! TTL key-value cache holding in-flight OAuth handshakes, [`RecordStore`] is
//! the relational mirror for redditors, subreddits, Salesforce orgs, client
//! orgs, and bearer tokens. [`MemoryStore`] implements both for tests and
//! single-process deployments.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::TokenKey,
	handshake::HandshakeRecord,
	model::{ClientOrg, ClientOrgId, NewClientOrg, Redditor, SalesforceOrg, Subreddit, Token},
};

/// Boxed future returned by store trait methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Error type produced by store implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// TTL cache contract for in-flight OAuth handshakes.
///
/// Entries expire `ttl` after [`put`](Self::put); [`update`](Self::update)
/// rewrites the value without extending the deadline.
pub trait HandshakeStore
where
	Self: Send + Sync,
{
	/// Stores a record under the key with the given time to live.
	fn put<'a>(
		&'a self,
		key: &'a str,
		record: HandshakeRecord,
		ttl: Duration,
	) -> StoreFuture<'a, ()>;

	/// Fetches the record under the key, if present and unexpired.
	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<HandshakeRecord>>;

	/// Rewrites an existing record without touching its expiry. Returns `false`
	/// when the key is absent or already expired.
	fn update<'a>(&'a self, key: &'a str, record: HandshakeRecord) -> StoreFuture<'a, bool>;

	/// Removes and returns the record under the key, if present and unexpired.
	fn take<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<HandshakeRecord>>;

	/// Whether an unexpired record exists under the key.
	fn contains<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool>;
}

/// Relational mirror contract for the objects the bridge brokers.
pub trait RecordStore
where
	Self: Send + Sync,
{
	/// Inserts or refreshes a redditor mirror row.
	fn upsert_redditor(&self, redditor: Redditor) -> StoreFuture<'_, ()>;

	/// Fetches a redditor by provider id.
	fn redditor<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<Redditor>>;

	/// Fetches a redditor by username.
	fn redditor_by_name<'a>(&'a self, name: &'a str) -> StoreFuture<'a, Option<Redditor>>;

	/// Inserts or refreshes a subreddit mirror row.
	fn upsert_subreddit(&self, subreddit: Subreddit) -> StoreFuture<'_, ()>;

	/// Fetches a subreddit by provider id.
	fn subreddit<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<Subreddit>>;

	/// Inserts or refreshes a Salesforce org mirror row.
	fn upsert_salesforce_org(&self, org: SalesforceOrg) -> StoreFuture<'_, ()>;

	/// Fetches a Salesforce org by its 18-character id.
	fn salesforce_org<'a>(&'a self, org_id: &'a str) -> StoreFuture<'a, Option<SalesforceOrg>>;

	/// Inserts a client org, assigning its id.
	fn insert_client_org(&self, new: NewClientOrg) -> StoreFuture<'_, ClientOrg>;

	/// Replaces an existing client org row.
	fn update_client_org(&self, org: ClientOrg) -> StoreFuture<'_, ()>;

	/// Fetches a client org by id.
	fn client_org(&self, id: ClientOrgId) -> StoreFuture<'_, Option<ClientOrg>>;

	/// Fetches the client org linking the redditor to the Salesforce org.
	fn client_org_for<'a>(
		&'a self,
		redditor_id: &'a str,
		salesforce_org_id: &'a str,
	) -> StoreFuture<'a, Option<ClientOrg>>;

	/// Fetches the most recently created active client org for the redditor.
	fn latest_client_org_for<'a>(
		&'a self,
		redditor_id: &'a str,
	) -> StoreFuture<'a, Option<ClientOrg>>;

	/// Stores a token, dropping any previous token for the same client org.
	fn replace_token(&self, token: Token) -> StoreFuture<'_, ()>;

	/// Fetches a token by its key.
	fn token<'a>(&'a self, key: &'a TokenKey) -> StoreFuture<'a, Option<Token>>;

	/// Deletes the token held by the client org, if any.
	fn delete_token_for(&self, client_org_id: ClientOrgId) -> StoreFuture<'_, ()>;

	/// Links a subreddit to a client org. Idempotent.
	fn link_subreddit<'a>(
		&'a self,
		subreddit_id: &'a str,
		client_org_id: ClientOrgId,
	) -> StoreFuture<'a, ()>;

	/// Unlinks a subreddit from a client org. Idempotent.
	fn unlink_subreddit<'a>(
		&'a self,
		subreddit_id: &'a str,
		client_org_id: ClientOrgId,
	) -> StoreFuture<'a, ()>;

	/// Lists the subreddits linked to the client org.
	fn linked_subreddits(&self, client_org_id: ClientOrgId) -> StoreFuture<'_, Vec<Subreddit>>;
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_bridge_error_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let bridge_error: Error = store_error.clone().into();

		assert!(matches!(bridge_error, Error::Storage(_)));

		let source = StdError::source(&bridge_error)
			.expect("Bridge error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
