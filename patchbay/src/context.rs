// SPDX-FileCopyrightText: 2026 LunNova
//
// SPDX-License-Identifier: MIT

use serde::Serialize;

use crate::config::SiteConfig;
use crate::store::{Patch, User};

/// Markup that bypasses template escaping. The layout emits these fields
/// through `| safe`, so values must never be built from request input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TrustedHtml(String);

impl TrustedHtml {
	pub fn new(markup: impl Into<String>) -> Self {
		Self(markup.into())
	}
}

/// Per-request template context. Built fresh for every request, filled in by
/// the view handler, discarded once the response is written.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewData {
	/// Logical page identifier; the layout selects the fragment and
	/// highlights navigation with it.
	pub current_view: String,
	pub logged_in: bool,
	/// Empty iff `logged_in` is false.
	pub user_name: String,
	/// Only meaningful on the patch detail view.
	pub can_edit_patch: bool,
	pub static_root: String,
	pub headline: String,
	pub headline_prefix: String,
	/// Inline script appended after the page scripts; used to restore
	/// autosaved editor state.
	pub final_script: TrustedHtml,
	pub patch: Option<Patch>,
	pub patches: Vec<Patch>,
	pub referer: String,
	pub viewing_user: Option<User>,
	/// Spliced tutorial body; empty except on the tutorial view.
	pub tutorial: TrustedHtml,
}

/// Seed a context with process-wide config and the session identity; view
/// handlers fill in the rest.
pub fn base_context(config: &SiteConfig, identity: Option<&str>) -> ViewData {
	ViewData {
		logged_in: identity.is_some(),
		user_name: identity.unwrap_or("").to_string(),
		static_root: config.site.static_root.clone(),
		..ViewData::default()
	}
}
