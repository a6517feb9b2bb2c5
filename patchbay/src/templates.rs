// SPDX-FileCopyrightText: 2026 LunNova
//
// SPDX-License-Identifier: MIT

use anyhow::{Context as _, bail};
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use tera::{Context, Tera, Value};

use crate::context::ViewData;

pub const LAYOUT_TEMPLATE: &str = "layout.html";

/// Fragments the layout dispatches to via `current_view`. All of them have
/// to exist at startup; a partial set is a deployment error.
const REQUIRED_TEMPLATES: &[&str] = &[
	LAYOUT_TEMPLATE,
	"patch.html",
	"user.html",
	"browse.html",
	"about.html",
	"learn.html",
	"404.html",
];

/// The two template sets. Compiled once before the server accepts traffic
/// and read-only afterwards; concurrent renders share it behind an `Arc`.
pub struct TemplateRegistry {
	site: Tera,
	tutorial: Tera,
}

impl TemplateRegistry {
	pub fn load(templates_dir: &str, tutorial_dir: &str) -> anyhow::Result<Self> {
		let mut site = Tera::new(&format!("{templates_dir}/*.html")).with_context(|| format!("Failed to compile {templates_dir}"))?;
		for name in REQUIRED_TEMPLATES {
			if !site.get_template_names().any(|t| t == *name) {
				bail!("missing template {name} in {templates_dir}");
			}
		}
		register_helpers(&mut site);

		let mut tutorial = Tera::new(&format!("{tutorial_dir}/*.html")).with_context(|| format!("Failed to compile {tutorial_dir}"))?;
		register_helpers(&mut tutorial);

		Ok(Self { site, tutorial })
	}

	pub fn render_layout(&self, data: &ViewData) -> Result<String, tera::Error> {
		let context = Context::from_serialize(data)?;
		self.site.render(LAYOUT_TEMPLATE, &context)
	}

	/// Render a standalone tutorial document into a buffer. The caller tells
	/// an unknown page apart from a broken one with [`is_unknown_template`].
	pub fn render_tutorial(&self, name: &str, data: &ViewData) -> Result<String, tera::Error> {
		let context = Context::from_serialize(data)?;
		self.tutorial.render(name, &context)
	}
}

pub fn is_unknown_template(error: &tera::Error) -> bool {
	matches!(error.kind, tera::ErrorKind::TemplateNotFound(_))
}

fn register_helpers(tera: &mut Tera) {
	tera.register_function("human_date", |args: &HashMap<String, Value>| {
		let ts = args
			.get("ts")
			.and_then(Value::as_i64)
			.ok_or_else(|| tera::Error::msg("human_date needs an integer `ts` argument"))?;
		let date = Utc
			.timestamp_opt(ts, 0)
			.single()
			.ok_or_else(|| tera::Error::msg(format!("human_date: timestamp {ts} out of range")))?;
		Ok(Value::String(date.format("%Y/%m/%d").to_string()))
	});
}
