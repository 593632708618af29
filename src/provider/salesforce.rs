//! Salesforce OAuth contract and identity-signature verification.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::{_prelude::*, auth::Secret, provider::ProviderFuture};

/// Identity fields extracted from a Salesforce token response.
///
/// Salesforce signs `id + issued_at` with the connected app's consumer secret;
/// [`verify_identity_signature`] checks that signature before the grant is trusted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesforceIdentity {
	/// Identity URL, `https://login.salesforce.com/id/{org_id}/{user_id}`.
	pub id: String,
	/// Issuance instant in epoch milliseconds, as a decimal string.
	pub issued_at: String,
	/// Base64 HMAC-SHA256 over `id + issued_at`.
	pub signature: String,
}
impl SalesforceIdentity {
	/// Extracts the 18-character org id from the identity URL.
	pub fn org_id(&self) -> Option<&str> {
		let mut segments = self.id.rsplit('/');

		segments.nth(1)
	}
}

/// Outcome of a successful Salesforce code exchange.
#[derive(Clone, Debug)]
pub struct SalesforceGrant {
	/// Short-lived access token.
	pub access_token: Secret,
	/// Long-lived refresh token.
	pub refresh_token: Secret,
	/// Org-specific API base URL.
	pub instance_url: String,
	/// Signed identity attached to the response.
	pub identity: SalesforceIdentity,
}

/// App-level Salesforce contract.
pub trait SalesforceApp
where
	Self: Send + Sync,
{
	/// Fully-formed authorization URL embedding the handshake state.
	fn authorize_url(&self, state: &str) -> Url;

	/// Exchanges an authorization code for tokens plus the signed identity.
	fn exchange_code<'a>(&'a self, code: &'a str) -> ProviderFuture<'a, SalesforceGrant>;
}

/// Verifies the identity signature against the connected app's consumer secret.
pub fn verify_identity_signature(identity: &SalesforceIdentity, consumer_secret: &str) -> bool {
	let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(consumer_secret.as_bytes()) else {
		return false;
	};

	mac.update(identity.id.as_bytes());
	mac.update(identity.issued_at.as_bytes());

	let Ok(expected) = BASE64.decode(&identity.signature) else { return false };

	mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn signed_identity(consumer_secret: &str) -> SalesforceIdentity {
		let id = "https://login.salesforce.com/id/00D5g000004NVq7EAG/0055g000004XvDkAAK";
		let issued_at = "1572549765000";
		let mut mac = Hmac::<Sha256>::new_from_slice(consumer_secret.as_bytes())
			.expect("HMAC should accept a key of any length.");

		mac.update(id.as_bytes());
		mac.update(issued_at.as_bytes());

		SalesforceIdentity {
			id: id.into(),
			issued_at: issued_at.into(),
			signature: BASE64.encode(mac.finalize().into_bytes()),
		}
	}

	#[test]
	fn identity_signature_verifies_with_the_right_secret() {
		let identity = signed_identity("consumer-secret");

		assert!(verify_identity_signature(&identity, "consumer-secret"));
		assert!(!verify_identity_signature(&identity, "other-secret"));
	}

	#[test]
	fn tampered_identity_fails_verification() {
		let mut identity = signed_identity("consumer-secret");

		identity.issued_at = "1572549765001".into();

		assert!(!verify_identity_signature(&identity, "consumer-secret"));
	}

	#[test]
	fn org_id_comes_from_the_identity_url() {
		let identity = signed_identity("consumer-secret");

		assert_eq!(identity.org_id(), Some("00D5g000004NVq7EAG"));
	}
}
