//! Token authentication and Reddit session resolution.

// self
use crate::{
	_prelude::*,
	auth::{Principal, TokenKey},
	error::Error,
	model::{ClientOrg, ClientOrgId, Token},
	provider::{RedditApp, RedditSession},
	store::RecordStore,
};

/// A resolved Reddit session plus the client org it was resolved through.
pub struct ResolvedSession {
	/// Session ready for provider calls.
	pub session: Arc<dyn RedditSession>,
	/// Backing client org; `None` for operator lookups that matched nothing.
	pub client_org: Option<ClientOrg>,
}

/// Resolves principals into live Reddit sessions.
///
/// Bearer principals are strict: a dead grant fails the request. Operator
/// principals degrade: when the stored grant no longer works, the resolver
/// hands back a read-only session so cached mirrors stay reachable.
pub struct SessionResolver {
	records: Arc<dyn RecordStore>,
	reddit: Arc<dyn RedditApp>,
}
impl SessionResolver {
	/// Creates a resolver over the given record store and Reddit app.
	pub fn new(records: Arc<dyn RecordStore>, reddit: Arc<dyn RedditApp>) -> Self {
		Self { records, reddit }
	}

	/// Authenticates a presented bearer key and stamps the org's last request.
	pub async fn authenticate(&self, presented: &str) -> Result<ClientOrg> {
		let key = TokenKey::parse(presented).map_err(|_| Error::authentication("Invalid token."))?;
		let token =
			self.records.token(&key).await?.ok_or_else(|| Error::authentication("Invalid token."))?;
		let mut org = self
			.records
			.client_org(token.client_org_id)
			.await?
			.filter(|org| org.is_active)
			.ok_or_else(|| Error::authentication("Client org inactive or deleted."))?;

		org.last_request_at = Some(OffsetDateTime::now_utc());

		self.records.update_client_org(org.clone()).await?;

		Ok(org)
	}

	/// Resolves a principal into a Reddit session.
	pub async fn resolve(&self, principal: &Principal) -> Result<ResolvedSession> {
		match principal {
			Principal::Bearer(org) => {
				let session = self.reddit.session(org.reddit_token.as_ref());

				if !session.is_read_only() {
					session.check().await.map_err(|e| Error::from_provider(e, "session"))?;
				}

				Ok(ResolvedSession { session, client_org: Some(org.clone()) })
			},
			Principal::Operator { username } => self.resolve_operator(username).await,
		}
	}

	/// Replaces the org's bearer token, revoking any previous one in the store.
	pub async fn issue_token(&self, client_org_id: ClientOrgId) -> Result<Token> {
		let token = Token::issue(client_org_id);

		self.records.replace_token(token.clone()).await?;

		Ok(token)
	}

	/// Deletes the org's bearer token, if any.
	pub async fn revoke_token(&self, client_org_id: ClientOrgId) -> Result<()> {
		self.records.delete_token_for(client_org_id).await?;

		Ok(())
	}

	async fn resolve_operator(&self, username: &str) -> Result<ResolvedSession> {
		let Some(redditor) = self.records.redditor_by_name(username).await? else {
			return Ok(ResolvedSession { session: self.reddit.session(None), client_org: None });
		};
		let Some(mut org) = self.records.latest_client_org_for(&redditor.id).await? else {
			return Ok(ResolvedSession { session: self.reddit.session(None), client_org: None });
		};

		org.last_request_at = Some(OffsetDateTime::now_utc());

		self.records.update_client_org(org.clone()).await?;

		let session = self.reddit.session(org.reddit_token.as_ref());

		if !session.is_read_only() && session.check().await.is_err() {
			// Dead grant; operators still get the cached view.
			return Ok(ResolvedSession {
				session: self.reddit.session(None),
				client_org: Some(org),
			});
		}

		Ok(ResolvedSession { session, client_org: Some(org) })
	}
}
