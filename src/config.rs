//! Explicitly constructed configuration passed to the bridge at startup.
//!
//! There is no process-global state: every component receives its settings
//! through [`BridgeConfig`], which keeps tests hermetic and lets multiple
//! bridges with different credentials coexist in one process.

// self
use crate::_prelude::*;

/// Default lifetime of an OAuth handshake record.
pub const DEFAULT_HANDSHAKE_TTL: Duration = Duration::seconds(900);

/// Top-level bridge configuration.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
	/// Reddit script-app credentials and endpoints.
	pub reddit: RedditAppConfig,
	/// Salesforce connected-app credentials and endpoints.
	pub salesforce: SalesforceAppConfig,
	/// Lifetime of pending OAuth handshakes (defaults to 900 seconds).
	pub handshake_ttl: Duration,
}
impl BridgeConfig {
	/// Creates a configuration with the default handshake TTL.
	pub fn new(reddit: RedditAppConfig, salesforce: SalesforceAppConfig) -> Self {
		Self { reddit, salesforce, handshake_ttl: DEFAULT_HANDSHAKE_TTL }
	}

	/// Overrides the handshake TTL; non-positive durations are clamped to zero.
	pub fn with_handshake_ttl(mut self, ttl: Duration) -> Self {
		self.handshake_ttl = if ttl.is_negative() { Duration::ZERO } else { ttl };

		self
	}
}

/// Credentials and endpoints for the Reddit OAuth application.
#[derive(Clone, Debug)]
pub struct RedditAppConfig {
	/// OAuth client identifier issued by Reddit.
	pub client_id: String,
	/// OAuth client secret issued by Reddit.
	pub client_secret: String,
	/// User agent sent on every provider call; Reddit rejects generic agents.
	pub user_agent: String,
	/// Redirect URI registered with the Reddit app, targeted by `oauth_callback`.
	pub redirect_uri: Url,
	/// Scopes requested during authorization (defaults to `*`).
	pub scopes: Vec<String>,
}
impl RedditAppConfig {
	/// Creates a Reddit app configuration requesting the wildcard scope.
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		user_agent: impl Into<String>,
		redirect_uri: Url,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: client_secret.into(),
			user_agent: user_agent.into(),
			redirect_uri,
			scopes: vec!["*".into()],
		}
	}

	/// Replaces the requested scope list.
	pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = scopes.into_iter().map(Into::into).collect();

		self
	}
}

/// Credentials and endpoints for the Salesforce connected app.
#[derive(Clone, Debug)]
pub struct SalesforceAppConfig {
	/// Connected-app consumer key.
	pub consumer_key: String,
	/// Connected-app consumer secret, also the HMAC key for identity signatures.
	pub consumer_secret: String,
	/// Redirect URI registered with the connected app.
	pub redirect_uri: Url,
	/// Login host used for the authorize and token endpoints.
	pub login_url: Url,
}
impl SalesforceAppConfig {
	/// Creates a connected-app configuration against the production login host.
	pub fn new(
		consumer_key: impl Into<String>,
		consumer_secret: impl Into<String>,
		redirect_uri: Url,
	) -> Self {
		Self {
			consumer_key: consumer_key.into(),
			consumer_secret: consumer_secret.into(),
			redirect_uri,
			login_url: Url::parse("https://login.salesforce.com")
				.expect("Static Salesforce login URL must parse."),
		}
	}

	/// Overrides the login host (sandboxes use `test.salesforce.com`).
	pub fn with_login_url(mut self, login_url: Url) -> Self {
		self.login_url = login_url;

		self
	}
}
