//! Salesforce connected-app OAuth and token management endpoints.

// crates.io
use serde_json::json;
// self
use crate::{
	_prelude::*,
	api::{Bridge, Reply, observed},
	auth::Secret,
	handshake::FlowPrefix,
	model::SalesforceOrg,
	obs::RequestKind,
	provider::salesforce::verify_identity_signature,
};

/// Body of [`Bridge::salesforce_token_set`].
#[derive(Clone, Debug, Deserialize)]
pub struct TokenSetRequest {
	/// Salesforce access token.
	pub access_token: String,
	/// Salesforce refresh token.
	pub refresh_token: String,
	/// Org-specific API base URL, when known.
	pub instance_url: Option<String>,
}

impl Bridge {
	/// Opens a Salesforce handshake bound to the caller's org.
	pub async fn salesforce_oauth_begin(&self, bearer: &str) -> Result<Reply> {
		observed(RequestKind::SalesforceOauth, "salesforce_oauth_begin", async {
			let org = self.resolver.authenticate(bearer).await?;
			let state = self
				.handshakes
				.begin(FlowPrefix::Salesforce, Some(org.salesforce_org_id))
				.await?;
			let url = self.salesforce.authorize_url(&state);

			Reply::data(200, json!({ "oauth_url": url.as_str(), "state": state }))
		})
		.await
	}

	/// Receives the Salesforce redirect: exchanges the code, verifies the
	/// identity signature, and stores the tokens on the org captured at flow
	/// start. The handshake is deleted on success.
	pub async fn salesforce_oauth_callback(
		&self,
		state: Option<&str>,
		code: Option<&str>,
	) -> Result<Reply> {
		observed(RequestKind::SalesforceOauth, "salesforce_oauth_callback", async {
			let state = state.ok_or_else(|| Error::parse("State must be provided."))?;
			let code = code.ok_or_else(|| Error::parse("Code must be provided."))?;
			let _singleflight = self.confirm_guard(&format!("salesforce_{state}")).await;
			let record = self
				.handshakes
				.poll(FlowPrefix::Salesforce, state)
				.await?
				.ok_or_else(|| Error::authentication("Invalid or expired state."))?;
			let grant = self
				.salesforce
				.exchange_code(code)
				.await
				.map_err(|e| Error::from_provider(e, "authorization code"))?;

			if !verify_identity_signature(&grant.identity, &self.config.salesforce.consumer_secret)
			{
				return Err(Error::authentication(
					"Salesforce identity signature verification failed.",
				));
			}

			let org_id = record
				.org_id
				.or_else(|| grant.identity.org_id().map(str::to_owned))
				.ok_or_else(|| Error::authentication("Handshake carries no org context."))?;
			let mut org = self.records.salesforce_org(&org_id).await?.ok_or_else(|| {
				Error::not_found(format!("No Salesforce org exists with the id: {org_id}."))
			})?;

			org.access_token = Some(grant.access_token);
			org.refresh_token = Some(grant.refresh_token);
			org.instance_url = Some(grant.instance_url);
			org.updated_at = OffsetDateTime::now_utc();

			self.records.upsert_salesforce_org(org).await?;
			self.handshakes.finalize(FlowPrefix::Salesforce, state).await?;

			Ok(Reply::detail(200, "Salesforce tokens saved successfully."))
		})
		.await
	}

	/// Stores caller-supplied Salesforce tokens on the org, bypassing the
	/// browser flow for orgs that manage their own grants.
	pub async fn salesforce_token_set(&self, bearer: &str, request: TokenSetRequest) -> Result<Reply> {
		observed(RequestKind::SalesforceOauth, "salesforce_token_set", async {
			let org = self.resolver.authenticate(bearer).await?;
			let mut sf_org = self.fetch_salesforce_org(&org.salesforce_org_id).await?;

			sf_org.access_token = Some(Secret::new(request.access_token));
			sf_org.refresh_token = Some(Secret::new(request.refresh_token));

			if request.instance_url.is_some() {
				sf_org.instance_url = request.instance_url;
			}

			sf_org.updated_at = OffsetDateTime::now_utc();

			self.records.upsert_salesforce_org(sf_org).await?;

			Ok(Reply::detail(201, "Salesforce tokens saved successfully."))
		})
		.await
	}

	/// Clears the org's stored Salesforce token pair. Idempotent.
	pub async fn salesforce_token_revoke(&self, bearer: &str) -> Result<Reply> {
		observed(RequestKind::SalesforceOauth, "salesforce_token_revoke", async {
			let org = self.resolver.authenticate(bearer).await?;
			let mut sf_org = self.fetch_salesforce_org(&org.salesforce_org_id).await?;

			sf_org.access_token = None;
			sf_org.refresh_token = None;
			sf_org.updated_at = OffsetDateTime::now_utc();

			self.records.upsert_salesforce_org(sf_org).await?;

			Ok(Reply::detail(200, "Salesforce tokens revoked successfully."))
		})
		.await
	}

	async fn fetch_salesforce_org(&self, org_id: &str) -> Result<SalesforceOrg> {
		self.records.salesforce_org(org_id).await?.ok_or_else(|| {
			Error::not_found(format!("No Salesforce org exists with the id: {org_id}."))
		})
	}
}
