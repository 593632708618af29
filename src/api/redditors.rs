//! Redditor lookup endpoint.

// self
use crate::{
	_prelude::*,
	api::{Bridge, Reply, observed},
	model::Redditor,
	obs::RequestKind,
};

impl Bridge {
	/// Looks up a redditor by username and refreshes the local mirror.
	pub async fn redditor_lookup(&self, bearer: &str, name: &str) -> Result<Reply> {
		observed(RequestKind::Redditor, "redditor_lookup", async {
			let (_, session) = self.authed_session(bearer).await?;
			let data = session
				.redditor(name)
				.await
				.map_err(|e| Error::from_provider(e, &format!("redditor {name}")))?
				.ok_or_else(|| {
					Error::not_found(format!("No redditor exists with the name: {name}."))
				})?;

			self.records.upsert_redditor(Redditor::from(&data)).await?;

			Reply::data(200, data)
		})
		.await
	}
}
