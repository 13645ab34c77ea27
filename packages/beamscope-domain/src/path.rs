use serde::{Deserialize, Serialize};

use crate::{END_OF_SEQUENCE_ID, PADDING_ID};

const PATH_KEY_DELIMITER: char = ':';

/// One beam hypothesis up to some decoding step. Position 0 is the decoder start slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenPath(Vec<u32>);
impl TokenPath {
	pub fn new(ids: Vec<u32>) -> Self {
		Self(ids)
	}

	/// The path every search graph is rooted at.
	pub fn root() -> Self {
		Self(vec![PADDING_ID])
	}

	pub fn ids(&self) -> &[u32] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn last(&self) -> Option<u32> {
		self.0.last().copied()
	}

	/// An empty path or one whose final token is padding stands for an inactive beam slot.
	pub fn ends_with_padding(&self) -> bool {
		self.last().is_none_or(|id| id == PADDING_ID)
	}

	pub fn is_completed(&self) -> bool {
		self.last() == Some(END_OF_SEQUENCE_ID)
	}

	pub fn parent(&self) -> TokenPath {
		let end = self.0.len().saturating_sub(1);

		Self(self.0[..end].to_vec())
	}

	/// Prefix of the first `len` tokens, clamped to the path length.
	pub fn prefix(&self, len: usize) -> TokenPath {
		Self(self.0[..len.min(self.0.len())].to_vec())
	}

	/// The path without trailing padding tokens.
	pub fn trim_padding(&self) -> TokenPath {
		let end = self.0.iter().rposition(|id| *id != PADDING_ID).map(|idx| idx + 1).unwrap_or(0);

		Self(self.0[..end].to_vec())
	}

	/// Emitted tokens, i.e. everything after the start slot.
	pub fn emitted(&self) -> &[u32] {
		self.0.get(1..).unwrap_or(&[])
	}

	pub fn key(&self) -> PathKey {
		PathKey::from(self)
	}
}

impl From<Vec<u32>> for TokenPath {
	fn from(ids: Vec<u32>) -> Self {
		Self(ids)
	}
}

/// Canonical identity of a [`TokenPath`]: its ids joined by `:`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathKey(String);
impl PathKey {
	/// Key of this path extended by one token.
	pub fn child(&self, id: u32) -> PathKey {
		if self.0.is_empty() {
			return Self(id.to_string());
		}

		Self(format!("{}{PATH_KEY_DELIMITER}{id}", self.0))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_string(self) -> String {
		self.0
	}
}

impl From<&TokenPath> for PathKey {
	fn from(path: &TokenPath) -> Self {
		let mut key = String::with_capacity(path.len() * 4);

		for (i, id) in path.ids().iter().enumerate() {
			if i > 0 {
				key.push(PATH_KEY_DELIMITER);
			}

			key.push_str(&id.to_string());
		}

		Self(key)
	}
}

impl std::fmt::Display for PathKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}
