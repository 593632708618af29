//! Reddit OAuth handshake, client-org identity, and disconnect endpoints.

// crates.io
use serde_json::{Value, json};
// self
use crate::{
	_prelude::*,
	api::{Bridge, Reply, observed},
	handshake::{FlowPrefix, HandshakeStatus},
	model::{NewClientOrg, Redditor, SalesforceOrg},
	obs::RequestKind,
	provider::RedditorData,
};

/// Body of [`Bridge::oauth_confirm`] carrying the calling org's identity.
#[derive(Clone, Debug, Deserialize)]
pub struct ConfirmRequest {
	/// 18-character Salesforce org id.
	pub org_id: String,
	/// Org display name.
	pub org_name: String,
}

impl Bridge {
	/// Opens a Reddit handshake and returns the authorization URL to visit.
	pub async fn oauth_begin(&self) -> Result<Reply> {
		observed(RequestKind::RedditOauth, "oauth_begin", async {
			let state = self.handshakes.begin(FlowPrefix::Reddit, None).await?;
			let url = self.reddit.authorize_url(&state);

			Reply::data(200, json!({ "oauth_url": url.as_str(), "state": state }))
		})
		.await
	}

	/// Receives the browser redirect from Reddit and parks the outcome in the
	/// handshake for [`Bridge::oauth_confirm`] to collect.
	pub async fn oauth_callback(
		&self,
		state: Option<&str>,
		code: Option<&str>,
		error: Option<&str>,
	) -> Result<Reply> {
		observed(RequestKind::RedditOauth, "oauth_callback", async {
			let state = state.ok_or_else(|| Error::parse("State must be provided."))?;

			if self.handshakes.poll(FlowPrefix::Reddit, state).await?.is_none() {
				return Err(Error::authentication("Invalid or expired state."));
			}

			if let Some(error) = error {
				self.handshakes.fail(FlowPrefix::Reddit, state, error).await?;

				return Err(Error::permission_denied(format!(
					"Reddit authorization failed: {error}."
				)));
			}

			let code = code.ok_or_else(|| Error::parse("Code must be provided."))?;

			if !self.handshakes.accept(FlowPrefix::Reddit, state, code).await? {
				return Err(Error::authentication("Invalid or expired state."));
			}

			Ok(Reply::detail(200, "OAuth code saved successfully."))
		})
		.await
	}

	/// Non-destructive poll of a handshake's progress.
	pub async fn oauth_status(&self, state: &str) -> Result<Reply> {
		observed(RequestKind::RedditOauth, "oauth_status", async {
			let record = self
				.handshakes
				.poll(FlowPrefix::Reddit, state)
				.await?
				.ok_or_else(|| Error::authentication("Invalid or expired state."))?;

			Ok(match record.status {
				HandshakeStatus::Pending => Reply::detail(202, "Authorization still pending."),
				HandshakeStatus::Accepted => Reply::data(
					200,
					json!({ "result": "accepted", "detail": "Authorization complete." }),
				)?,
				HandshakeStatus::Error => Reply::data(
					200,
					json!({
						"result": "error",
						"detail": record.detail.unwrap_or_else(|| "Authorization failed.".into()),
					}),
				)?,
			})
		})
		.await
	}

	/// Closes an accepted handshake: exchanges the code, mirrors the redditor
	/// and org, links them as a client org, and issues the bearer token.
	///
	/// The destructive handshake read is serialized per state, so concurrent
	/// confirms cannot both redeem the same authorization code.
	pub async fn oauth_confirm(&self, state: &str, request: ConfirmRequest) -> Result<Reply> {
		observed(RequestKind::RedditOauth, "oauth_confirm", async {
			let _singleflight = self.confirm_guard(state).await;
			let record = self
				.handshakes
				.finalize(FlowPrefix::Reddit, state)
				.await?
				.ok_or_else(|| Error::authentication("Invalid or expired state."))?;
			let code = match record.status {
				HandshakeStatus::Accepted => record.code.ok_or_else(|| {
					Error::authentication("Handshake carries no authorization code.")
				})?,
				HandshakeStatus::Pending =>
					return Err(Error::authentication("Authorization is not complete.")),
				HandshakeStatus::Error =>
					return Err(Error::permission_denied(
						record.detail.unwrap_or_else(|| "Authorization failed.".into()),
					)),
			};
			let refresh = self
				.reddit
				.exchange_code(&code)
				.await
				.map_err(|e| Error::from_provider(e, "authorization code"))?;
			let session = self.reddit.session(Some(&refresh));
			let me =
				session.me().await.map_err(|e| Error::from_provider(e, "redditor identity"))?;

			self.records.upsert_redditor(Redditor::from(&me)).await?;

			let now = OffsetDateTime::now_utc();
			let mut sf_org = self
				.records
				.salesforce_org(&request.org_id)
				.await?
				.unwrap_or_else(|| SalesforceOrg::new(&request.org_id, &request.org_name));

			sf_org.org_name = request.org_name;
			sf_org.updated_at = now;

			self.records.upsert_salesforce_org(sf_org).await?;

			let client_org = match self.records.client_org_for(&me.id, &request.org_id).await? {
				Some(mut existing) => {
					existing.is_active = true;
					existing.reddit_token = Some(refresh);
					existing.connected_at = now;
					existing.disconnected_at = None;

					self.records.update_client_org(existing.clone()).await?;

					existing
				},
				None =>
					self.records
						.insert_client_org(NewClientOrg {
							redditor_id: me.id.clone(),
							salesforce_org_id: request.org_id,
							reddit_token: Some(refresh),
						})
						.await?,
			};
			let token = self.resolver.issue_token(client_org.id).await?;
			let subscriptions = session
				.my_subreddits()
				.await
				.map_err(|e| Error::from_provider(e, "subscription listing"))?;
			let mut payload = identity_payload(&me, &subscriptions)?;

			payload["bearer_token"] = json!(token.key.expose());

			Reply::data(201, payload)
		})
		.await
	}

	/// Identity of the connected redditor plus its live subscriptions.
	///
	/// Read-only client orgs serve the cached mirror with an empty
	/// subscription list instead of calling the provider.
	pub async fn me(&self, bearer: &str) -> Result<Reply> {
		observed(RequestKind::Client, "me", async {
			let (org, session) = self.authed_session(bearer).await?;

			if session.is_read_only() {
				let mirror = self.records.redditor(&org.redditor_id).await?.ok_or_else(|| {
					Error::not_found("No redditor is connected to this client org.")
				})?;
				let mut payload = serde_json::to_value(&mirror)?;

				payload["subscriptions"] = json!([]);

				return Reply::data(200, payload);
			}

			let me =
				session.me().await.map_err(|e| Error::from_provider(e, "redditor identity"))?;

			self.records.upsert_redditor(Redditor::from(&me)).await?;

			let subscriptions = session
				.my_subreddits()
				.await
				.map_err(|e| Error::from_provider(e, "subscription listing"))?;

			Reply::data(200, identity_payload(&me, &subscriptions)?)
		})
		.await
	}

	/// Severs the Reddit link: best-effort provider revoke, deactivate the
	/// client org, and delete its bearer token.
	pub async fn disconnect(&self, bearer: &str) -> Result<Reply> {
		observed(RequestKind::Client, "disconnect", async {
			let mut org = self.resolver.authenticate(bearer).await?;

			if let Some(token) = org.reddit_token.as_ref()
				&& let Err(e) = self.reddit.revoke_refresh_token(token).await
			{
				// Revocation is advisory; the local link still comes down.
				#[cfg(feature = "tracing")]
				tracing::warn!(error = %e, "reddit refresh token revocation failed");
				#[cfg(not(feature = "tracing"))]
				let _ = e;
			}

			org.is_active = false;
			org.reddit_token = None;
			org.disconnected_at = Some(OffsetDateTime::now_utc());

			self.records.update_client_org(org.clone()).await?;
			self.resolver.revoke_token(org.id).await?;

			Ok(Reply::detail(200, "Client org disconnected successfully."))
		})
		.await
	}
}

fn identity_payload(me: &RedditorData, subscriptions: &impl Serialize) -> Result<Value> {
	let mut payload = serde_json::to_value(me)?;

	payload["subscriptions"] = serde_json::to_value(subscriptions)?;

	Ok(payload)
}
