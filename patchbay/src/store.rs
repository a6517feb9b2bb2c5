// SPDX-FileCopyrightText: 2026 LunNova
//
// SPDX-License-Identifier: MIT

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Patch {
	pub id: String,
	pub title: String,
	pub author: String,
	/// Unix seconds; totally ordered for listing purposes.
	pub date_created: i64,
	pub files: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
	pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
	pub author: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("not found")]
	NotFound,
	#[error(transparent)]
	Internal(#[from] anyhow::Error),
}

pub trait PatchStore: Send + Sync {
	fn patch(&self, id: &str) -> Result<Patch, StoreError>;
	fn patches(&self, filter: &SearchFilter) -> Result<Vec<Patch>, StoreError>;
	fn user(&self, name: &str) -> Result<User, StoreError>;
}

/// Sort newest first. Ties on `date_created` are broken by ascending `id` so
/// the listing order is deterministic for any input order.
pub fn order_by_recency(patches: &mut [Patch]) {
	patches.sort_by_key(|p| (Reverse(p.date_created), p.id.clone()));
}

#[derive(Debug)]
pub struct MemoryStore {
	patches: HashMap<String, Patch>,
	users: HashMap<String, User>,
}

impl MemoryStore {
	pub fn new(patches: Vec<Patch>, users: Vec<User>) -> Self {
		Self {
			patches: patches.into_iter().map(|p| (p.id.clone(), p)).collect(),
			users: users.into_iter().map(|u| (u.name.clone(), u)).collect(),
		}
	}

	/// Load `patches.json` and `users.json` from the data directory.
	pub fn load(data_dir: &Path) -> anyhow::Result<Self> {
		let patches_path = data_dir.join("patches.json");
		let patches_content =
			std::fs::read_to_string(&patches_path).with_context(|| format!("Failed to read {}", patches_path.display()))?;
		let patches: Vec<Patch> =
			serde_json::from_str(&patches_content).with_context(|| format!("Failed to parse {}", patches_path.display()))?;

		let users_path = data_dir.join("users.json");
		let users_content = std::fs::read_to_string(&users_path).with_context(|| format!("Failed to read {}", users_path.display()))?;
		let users: Vec<User> = serde_json::from_str(&users_content).with_context(|| format!("Failed to parse {}", users_path.display()))?;

		info!("Loaded {} patches and {} users from {}", patches.len(), users.len(), data_dir.display());
		Ok(Self::new(patches, users))
	}
}

impl PatchStore for MemoryStore {
	fn patch(&self, id: &str) -> Result<Patch, StoreError> {
		self.patches.get(id).cloned().ok_or(StoreError::NotFound)
	}

	fn patches(&self, filter: &SearchFilter) -> Result<Vec<Patch>, StoreError> {
		Ok(self
			.patches
			.values()
			.filter(|p| filter.author.as_deref().is_none_or(|author| p.author == author))
			.cloned()
			.collect())
	}

	fn user(&self, name: &str) -> Result<User, StoreError> {
		self.users.get(name).cloned().ok_or(StoreError::NotFound)
	}
}
