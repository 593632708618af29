//! Thread-safe in-memory store implementation for local development and tests.

// std
use std::collections::HashSet;
// self
use crate::{
	_prelude::*,
	auth::TokenKey,
	handshake::HandshakeRecord,
	model::{ClientOrg, ClientOrgId, NewClientOrg, Redditor, SalesforceOrg, Subreddit, Token},
	store::{HandshakeStore, RecordStore, StoreError, StoreFuture},
};

#[derive(Debug, Default)]
struct Tables {
	handshakes: HashMap<String, (HandshakeRecord, OffsetDateTime)>,
	redditors: HashMap<String, Redditor>,
	subreddits: HashMap<String, Subreddit>,
	salesforce_orgs: HashMap<String, SalesforceOrg>,
	client_orgs: HashMap<ClientOrgId, ClientOrg>,
	next_client_org_id: u64,
	tokens: HashMap<TokenKey, Token>,
	subreddit_links: HashSet<(String, ClientOrgId)>,
}

type SharedTables = Arc<RwLock<Tables>>;

/// In-process store backing both the handshake cache and the relational mirror.
///
/// Handshake expiry is lazy: entries past their deadline are dropped the next
/// time any handshake operation touches their key.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SharedTables);
impl MemoryStore {
	fn live_handshake(tables: &mut Tables, key: &str) -> Option<HandshakeRecord> {
		let now = OffsetDateTime::now_utc();

		match tables.handshakes.get(key) {
			Some((_, deadline)) if *deadline <= now => {
				tables.handshakes.remove(key);

				None
			},
			Some((record, _)) => Some(record.clone()),
			None => None,
		}
	}

	fn insert_client_org_now(tables: SharedTables, new: NewClientOrg) -> ClientOrg {
		let mut guard = tables.write();

		guard.next_client_org_id += 1;

		let org = new.into_client_org(ClientOrgId(guard.next_client_org_id));

		guard.client_orgs.insert(org.id, org.clone());

		org
	}

	fn replace_token_now(tables: SharedTables, token: Token) {
		let mut guard = tables.write();

		guard.tokens.retain(|_, existing| existing.client_org_id != token.client_org_id);
		guard.tokens.insert(token.key.clone(), token);
	}
}
impl HandshakeStore for MemoryStore {
	fn put<'a>(
		&'a self,
		key: &'a str,
		record: HandshakeRecord,
		ttl: Duration,
	) -> StoreFuture<'a, ()> {
		let tables = self.0.clone();

		Box::pin(async move {
			let deadline = OffsetDateTime::now_utc() + ttl;

			tables.write().handshakes.insert(key.to_owned(), (record, deadline));

			Ok(())
		})
	}

	fn get<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<HandshakeRecord>> {
		let tables = self.0.clone();

		Box::pin(async move { Ok(Self::live_handshake(&mut tables.write(), key)) })
	}

	fn update<'a>(&'a self, key: &'a str, record: HandshakeRecord) -> StoreFuture<'a, bool> {
		let tables = self.0.clone();

		Box::pin(async move {
			let mut guard = tables.write();

			if Self::live_handshake(&mut guard, key).is_none() {
				return Ok(false);
			}

			// Deadline stays where `put` set it.
			if let Some((existing, _)) = guard.handshakes.get_mut(key) {
				*existing = record;
			}

			Ok(true)
		})
	}

	fn take<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<HandshakeRecord>> {
		let tables = self.0.clone();

		Box::pin(async move {
			let mut guard = tables.write();

			if Self::live_handshake(&mut guard, key).is_none() {
				return Ok(None);
			}

			Ok(guard.handshakes.remove(key).map(|(record, _)| record))
		})
	}

	fn contains<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool> {
		let tables = self.0.clone();

		Box::pin(async move { Ok(Self::live_handshake(&mut tables.write(), key).is_some()) })
	}
}
impl RecordStore for MemoryStore {
	fn upsert_redditor(&self, redditor: Redditor) -> StoreFuture<'_, ()> {
		let tables = self.0.clone();

		Box::pin(async move {
			tables.write().redditors.insert(redditor.id.clone(), redditor);

			Ok(())
		})
	}

	fn redditor<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<Redditor>> {
		let tables = self.0.clone();

		Box::pin(async move { Ok(tables.read().redditors.get(id).cloned()) })
	}

	fn redditor_by_name<'a>(&'a self, name: &'a str) -> StoreFuture<'a, Option<Redditor>> {
		let tables = self.0.clone();

		Box::pin(async move {
			Ok(tables.read().redditors.values().find(|r| r.name == name).cloned())
		})
	}

	fn upsert_subreddit(&self, subreddit: Subreddit) -> StoreFuture<'_, ()> {
		let tables = self.0.clone();

		Box::pin(async move {
			tables.write().subreddits.insert(subreddit.id.clone(), subreddit);

			Ok(())
		})
	}

	fn subreddit<'a>(&'a self, id: &'a str) -> StoreFuture<'a, Option<Subreddit>> {
		let tables = self.0.clone();

		Box::pin(async move { Ok(tables.read().subreddits.get(id).cloned()) })
	}

	fn upsert_salesforce_org(&self, org: SalesforceOrg) -> StoreFuture<'_, ()> {
		let tables = self.0.clone();

		Box::pin(async move {
			tables.write().salesforce_orgs.insert(org.org_id.clone(), org);

			Ok(())
		})
	}

	fn salesforce_org<'a>(&'a self, org_id: &'a str) -> StoreFuture<'a, Option<SalesforceOrg>> {
		let tables = self.0.clone();

		Box::pin(async move { Ok(tables.read().salesforce_orgs.get(org_id).cloned()) })
	}

	fn insert_client_org(&self, new: NewClientOrg) -> StoreFuture<'_, ClientOrg> {
		let tables = self.0.clone();

		Box::pin(async move { Ok(Self::insert_client_org_now(tables, new)) })
	}

	fn update_client_org(&self, org: ClientOrg) -> StoreFuture<'_, ()> {
		let tables = self.0.clone();

		Box::pin(async move {
			let mut guard = tables.write();

			if !guard.client_orgs.contains_key(&org.id) {
				return Err(StoreError::Backend {
					message: format!("no client org with id {}", org.id),
				});
			}

			guard.client_orgs.insert(org.id, org);

			Ok(())
		})
	}

	fn client_org(&self, id: ClientOrgId) -> StoreFuture<'_, Option<ClientOrg>> {
		let tables = self.0.clone();

		Box::pin(async move { Ok(tables.read().client_orgs.get(&id).cloned()) })
	}

	fn client_org_for<'a>(
		&'a self,
		redditor_id: &'a str,
		salesforce_org_id: &'a str,
	) -> StoreFuture<'a, Option<ClientOrg>> {
		let tables = self.0.clone();

		Box::pin(async move {
			Ok(tables
				.read()
				.client_orgs
				.values()
				.find(|org| {
					org.redditor_id == redditor_id && org.salesforce_org_id == salesforce_org_id
				})
				.cloned())
		})
	}

	fn latest_client_org_for<'a>(
		&'a self,
		redditor_id: &'a str,
	) -> StoreFuture<'a, Option<ClientOrg>> {
		let tables = self.0.clone();

		Box::pin(async move {
			Ok(tables
				.read()
				.client_orgs
				.values()
				.filter(|org| org.redditor_id == redditor_id && org.is_active)
				.max_by_key(|org| org.id)
				.cloned())
		})
	}

	fn replace_token(&self, token: Token) -> StoreFuture<'_, ()> {
		let tables = self.0.clone();

		Box::pin(async move {
			Self::replace_token_now(tables, token);

			Ok(())
		})
	}

	fn token<'a>(&'a self, key: &'a TokenKey) -> StoreFuture<'a, Option<Token>> {
		let tables = self.0.clone();

		Box::pin(async move { Ok(tables.read().tokens.get(key).cloned()) })
	}

	fn delete_token_for(&self, client_org_id: ClientOrgId) -> StoreFuture<'_, ()> {
		let tables = self.0.clone();

		Box::pin(async move {
			tables.write().tokens.retain(|_, token| token.client_org_id != client_org_id);

			Ok(())
		})
	}

	fn link_subreddit<'a>(
		&'a self,
		subreddit_id: &'a str,
		client_org_id: ClientOrgId,
	) -> StoreFuture<'a, ()> {
		let tables = self.0.clone();

		Box::pin(async move {
			tables.write().subreddit_links.insert((subreddit_id.to_owned(), client_org_id));

			Ok(())
		})
	}

	fn unlink_subreddit<'a>(
		&'a self,
		subreddit_id: &'a str,
		client_org_id: ClientOrgId,
	) -> StoreFuture<'a, ()> {
		let tables = self.0.clone();

		Box::pin(async move {
			tables.write().subreddit_links.remove(&(subreddit_id.to_owned(), client_org_id));

			Ok(())
		})
	}

	fn linked_subreddits(&self, client_org_id: ClientOrgId) -> StoreFuture<'_, Vec<Subreddit>> {
		let tables = self.0.clone();

		Box::pin(async move {
			let guard = tables.read();
			let mut linked = guard
				.subreddit_links
				.iter()
				.filter(|(_, org_id)| *org_id == client_org_id)
				.filter_map(|(subreddit_id, _)| guard.subreddits.get(subreddit_id).cloned())
				.collect::<Vec<_>>();

			linked.sort_by(|a, b| a.display_name.cmp(&b.display_name));

			Ok(linked)
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::handshake::HandshakeStatus;

	fn pending() -> HandshakeRecord {
		HandshakeRecord { status: HandshakeStatus::Pending, code: None, org_id: None, detail: None }
	}

	#[tokio::test]
	async fn expired_handshakes_read_as_absent() {
		let store = MemoryStore::default();

		store
			.put("oauth_42", pending(), Duration::seconds(-1))
			.await
			.expect("Putting a handshake should succeed.");

		assert!(store.get("oauth_42").await.expect("Reading should succeed.").is_none());
		assert!(!store.contains("oauth_42").await.expect("Probing should succeed."));
		assert!(!store.update("oauth_42", pending()).await.expect("Updating should succeed."));
	}

	#[tokio::test]
	async fn replace_token_drops_the_previous_token() {
		let store = MemoryStore::default();
		let first = Token::issue(ClientOrgId(7));
		let second = Token::issue(ClientOrgId(7));

		store.replace_token(first.clone()).await.expect("Storing a token should succeed.");
		store.replace_token(second.clone()).await.expect("Replacing a token should succeed.");

		assert!(store.token(&first.key).await.expect("Reading should succeed.").is_none());
		assert_eq!(
			store.token(&second.key).await.expect("Reading should succeed."),
			Some(second)
		);
	}

	#[tokio::test]
	async fn client_org_ids_are_assigned_sequentially() {
		let store = MemoryStore::default();
		let new = |redditor: &str| NewClientOrg {
			redditor_id: redditor.into(),
			salesforce_org_id: "00D5g000004NVq7EAG".into(),
			reddit_token: None,
		};
		let a = store.insert_client_org(new("a")).await.expect("Insert should succeed.");
		let b = store.insert_client_org(new("b")).await.expect("Insert should succeed.");

		assert!(a.id < b.id);
	}

	#[tokio::test]
	async fn latest_client_org_skips_inactive_rows() {
		let store = MemoryStore::default();
		let new = NewClientOrg {
			redditor_id: "4rfkxa54".into(),
			salesforce_org_id: "00D5g000004NVq7EAG".into(),
			reddit_token: None,
		};
		let older = store.insert_client_org(new.clone()).await.expect("Insert should succeed.");
		let mut newer = store.insert_client_org(new).await.expect("Insert should succeed.");

		newer.is_active = false;

		store.update_client_org(newer).await.expect("Update should succeed.");

		let latest = store
			.latest_client_org_for("4rfkxa54")
			.await
			.expect("Lookup should succeed.")
			.expect("An active client org should remain.");

		assert_eq!(latest.id, older.id);
	}

	#[tokio::test]
	async fn subreddit_links_are_idempotent() {
		let store = MemoryStore::default();
		let subreddit = Subreddit {
			id: "2qh0y".into(),
			name: "t5_2qh0y".into(),
			display_name: "salesforce".into(),
			public_description: None,
			created_utc: OffsetDateTime::now_utc(),
			subscribers: 1,
		};

		store.upsert_subreddit(subreddit).await.expect("Upsert should succeed.");
		store.link_subreddit("2qh0y", ClientOrgId(1)).await.expect("Linking should succeed.");
		store.link_subreddit("2qh0y", ClientOrgId(1)).await.expect("Relinking should succeed.");

		assert_eq!(
			store.linked_subreddits(ClientOrgId(1)).await.expect("Listing should succeed.").len(),
			1
		);

		store.unlink_subreddit("2qh0y", ClientOrgId(1)).await.expect("Unlinking should succeed.");

		assert!(
			store
				.linked_subreddits(ClientOrgId(1))
				.await
				.expect("Listing should succeed.")
				.is_empty()
		);
	}
}
