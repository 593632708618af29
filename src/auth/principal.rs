//! Authenticated caller identities.

// self
use crate::{_prelude::*, model::ClientOrg};

/// Who a request acts as once authentication succeeds.
#[derive(Clone, Debug)]
pub enum Principal {
	/// A client org authenticated with its bearer token.
	Bearer(ClientOrg),
	/// An operator acting by redditor username, without a bearer token.
	///
	/// Operator sessions resolve through the latest client org connected as
	/// that redditor and fall back to a read-only session when the stored
	/// grant no longer works.
	Operator {
		/// Redditor username supplied by the operator.
		username: String,
	},
}
impl Principal {
	/// The client org backing this principal, when it carries one directly.
	pub fn client_org(&self) -> Option<&ClientOrg> {
		match self {
			Self::Bearer(org) => Some(org),
			Self::Operator { .. } => None,
		}
	}
}
