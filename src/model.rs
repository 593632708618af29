//! Relational mirror rows kept alongside provider data.
//!
//! The bridge denormalizes the objects it brokers so that identity and linkage
//! survive provider outages: redditors and subreddits mirror their provider
//! payloads, Salesforce orgs mirror the identity extracted from the OAuth
//! handshake, and client orgs tie the two together under a bearer token.

// self
use crate::{
	_prelude::*,
	auth::{Secret, TokenKey},
	provider::{RedditorData, SubredditData},
};

/// Locally mirrored redditor row, keyed by the provider-issued id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Redditor {
	/// Provider-issued redditor id.
	pub id: String,
	/// Username.
	pub name: String,
	/// Account creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_utc: OffsetDateTime,
	/// Whether the account verified its email.
	pub has_verified_email: bool,
	/// Avatar URL.
	pub icon_img: String,
	/// Comment karma at last refresh.
	pub comment_karma: i64,
	/// Link karma at last refresh.
	pub link_karma: i64,
	/// Friend count at last refresh, when exposed.
	pub num_friends: Option<u32>,
}
impl From<&RedditorData> for Redditor {
	fn from(data: &RedditorData) -> Self {
		Self {
			id: data.id.clone(),
			name: data.name.clone(),
			created_utc: data.created_utc,
			has_verified_email: data.has_verified_email,
			icon_img: data.icon_img.clone(),
			comment_karma: data.comment_karma,
			link_karma: data.link_karma,
			num_friends: data.num_friends,
		}
	}
}

/// Locally mirrored subreddit row, keyed by the provider-issued id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subreddit {
	/// Provider-issued subreddit id.
	pub id: String,
	/// Fullname (`t5_*`).
	pub name: String,
	/// Display name.
	pub display_name: String,
	/// Public description at last refresh.
	pub public_description: Option<String>,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_utc: OffsetDateTime,
	/// Subscriber count at last refresh.
	pub subscribers: u64,
}
impl From<&SubredditData> for Subreddit {
	fn from(data: &SubredditData) -> Self {
		Self {
			id: data.id.clone(),
			name: data.name.clone(),
			display_name: data.display_name.clone(),
			public_description: data.public_description.clone(),
			created_utc: data.created_utc,
			subscribers: data.subscribers,
		}
	}
}

/// Mirrored Salesforce org row, keyed by the 18-character org id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesforceOrg {
	/// 18-character Salesforce org id.
	pub org_id: String,
	/// Org display name.
	pub org_name: String,
	/// Org-specific API base URL, when known.
	pub instance_url: Option<String>,
	/// Salesforce access token captured by the connected-app flow.
	pub access_token: Option<Secret>,
	/// Salesforce refresh token captured by the connected-app flow.
	pub refresh_token: Option<Secret>,
	/// Version of the managed package installed in the org, when reported.
	pub package_version: Option<String>,
	/// Row creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	/// Last mutation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl SalesforceOrg {
	/// Creates a fresh org row with no captured tokens.
	pub fn new(org_id: impl Into<String>, org_name: impl Into<String>) -> Self {
		let now = OffsetDateTime::now_utc();

		Self {
			org_id: org_id.into(),
			org_name: org_name.into(),
			instance_url: None,
			access_token: None,
			refresh_token: None,
			package_version: None,
			created_at: now,
			updated_at: now,
		}
	}
}

/// Store-assigned client-org id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientOrgId(pub u64);
impl Display for ClientOrgId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0, f)
	}
}

/// Link row tying a Salesforce org to a Reddit account.
///
/// `reddit_token` is `None` for read-only client orgs; such orgs serve cached
/// mirror data and reject mutating operations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientOrg {
	/// Store-assigned id.
	pub id: ClientOrgId,
	/// Mirrored redditor this org is connected as.
	pub redditor_id: String,
	/// Salesforce org on the other end of the link.
	pub salesforce_org_id: String,
	/// Refresh token for the Reddit grant; `None` for read-only orgs.
	pub reddit_token: Option<Secret>,
	/// Whether the link is active; inactive orgs fail authentication.
	pub is_active: bool,
	/// Instant of the most recent connect (reset when the org reconnects).
	#[serde(with = "time::serde::rfc3339")]
	pub connected_at: OffsetDateTime,
	/// Instant of deactivation, when disconnected.
	#[serde(with = "time::serde::rfc3339::option")]
	pub disconnected_at: Option<OffsetDateTime>,
	/// Instant of the last authenticated request, when any.
	#[serde(with = "time::serde::rfc3339::option")]
	pub last_request_at: Option<OffsetDateTime>,
}

/// Insertion payload for a client org; the store assigns the id.
#[derive(Clone, Debug)]
pub struct NewClientOrg {
	/// Mirrored redditor this org is connected as.
	pub redditor_id: String,
	/// Salesforce org on the other end of the link.
	pub salesforce_org_id: String,
	/// Refresh token for the Reddit grant; `None` for read-only orgs.
	pub reddit_token: Option<Secret>,
}
impl NewClientOrg {
	/// Materializes the row with a store-assigned id and creation instant.
	pub fn into_client_org(self, id: ClientOrgId) -> ClientOrg {
		ClientOrg {
			id,
			redditor_id: self.redditor_id,
			salesforce_org_id: self.salesforce_org_id,
			reddit_token: self.reddit_token,
			is_active: true,
			connected_at: OffsetDateTime::now_utc(),
			disconnected_at: None,
			last_request_at: None,
		}
	}
}

/// Bearer token row; the key itself is the primary key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
	/// 40-hex bearer key.
	pub key: TokenKey,
	/// Client org this token authenticates.
	pub client_org_id: ClientOrgId,
	/// Issuance instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}
impl Token {
	/// Issues a fresh token for the client org.
	pub fn issue(client_org_id: ClientOrgId) -> Self {
		Self { key: TokenKey::generate(), client_org_id, created_at: OffsetDateTime::now_utc() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn new_client_org_starts_active_without_requests() {
		let org = NewClientOrg {
			redditor_id: "4rfkxa54".into(),
			salesforce_org_id: "00D5g000004NVq7EAG".into(),
			reddit_token: None,
		}
		.into_client_org(ClientOrgId(1));

		assert!(org.is_active);
		assert!(org.reddit_token.is_none());
		assert!(org.last_request_at.is_none());
	}

	#[test]
	fn issued_tokens_carry_distinct_keys() {
		let a = Token::issue(ClientOrgId(1));
		let b = Token::issue(ClientOrgId(1));

		assert_ne!(a.key, b.key);
	}
}
