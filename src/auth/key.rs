//! Bearer token keys: 40 lowercase hex characters, generated from 20 random bytes.

// crates.io
use rand::RngCore;
// self
use crate::_prelude::*;

const TOKEN_KEY_LEN: usize = 40;

/// Error returned when a presented token key is malformed.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Invalid token.")]
pub struct TokenKeyError;

/// 40-hex bearer key identifying a token row.
///
/// The key doubles as the token's primary key, so equality and hashing work on
/// the raw hex; only the formatters redact it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenKey(String);
impl TokenKey {
	/// Generates a fresh random key.
	pub fn generate() -> Self {
		let mut bytes = [0_u8; TOKEN_KEY_LEN / 2];

		rand::rng().fill_bytes(&mut bytes);

		Self(hex::encode(bytes))
	}

	/// Parses a presented key, rejecting anything that is not 40 lowercase hex.
	pub fn parse(value: &str) -> Result<Self, TokenKeyError> {
		if value.len() != TOKEN_KEY_LEN
			|| !value.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
		{
			return Err(TokenKeyError);
		}

		Ok(Self(value.to_owned()))
	}

	/// Returns the raw hex key. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl TryFrom<String> for TokenKey {
	type Error = TokenKeyError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::parse(&value)
	}
}
impl From<TokenKey> for String {
	fn from(value: TokenKey) -> Self {
		value.0
	}
}
impl Debug for TokenKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenKey").field(&"<redacted>").finish()
	}
}
impl Display for TokenKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn generated_keys_are_forty_lowercase_hex() {
		let key = TokenKey::generate();

		assert_eq!(key.expose().len(), 40);
		assert!(key.expose().bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
	}

	#[test]
	fn parse_rejects_malformed_keys() {
		assert!(TokenKey::parse("0123456789abcdef0123456789abcdef01234567").is_ok());
		assert_eq!(TokenKey::parse("too-short"), Err(TokenKeyError));
		assert_eq!(
			TokenKey::parse("0123456789ABCDEF0123456789ABCDEF01234567"),
			Err(TokenKeyError)
		);
		assert_eq!(
			TokenKey::parse("0123456789abcdef0123456789abcdef0123456g"),
			Err(TokenKeyError)
		);
	}

	#[test]
	fn key_formatters_redact() {
		let key = TokenKey::generate();

		assert_eq!(format!("{key:?}"), "TokenKey(\"<redacted>\")");
		assert_eq!(format!("{key}"), "<redacted>");
	}
}
