// SPDX-FileCopyrightText: 2026 LunNova
//
// SPDX-License-Identifier: MIT

use argh::FromArgs;
use serde::Deserialize;

#[derive(FromArgs)]
/// Serve the patch sharing site
pub struct Args {
	#[argh(positional)]
	/// path to the site directory containing site.toml
	pub site_dir: String,

	#[argh(option)]
	/// override the listen address from site.toml
	pub listen: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SiteConfig {
	pub site: SiteSection,
	pub content: ContentSection,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SiteSection {
	pub title: String,
	pub listen_addr: String,
	/// Prefix rendered into asset URLs; the assets themselves are served elsewhere.
	pub static_root: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ContentSection {
	pub templates_dir: String,
	pub tutorial_dir: String,
	pub data_dir: String,
}
