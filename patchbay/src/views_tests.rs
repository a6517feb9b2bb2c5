// SPDX-FileCopyrightText: 2026 LunNova
//
// SPDX-License-Identifier: MIT

use crate::config::{ContentSection, SiteConfig, SiteSection};
use crate::context::{ViewData, base_context};
use crate::session::SessionStore;
use crate::store::{MemoryStore, Patch, PatchStore, User};
use crate::templates::TemplateRegistry;
use crate::views::{self, App, ViewError};
use hyper::StatusCode;
use std::collections::BTreeMap;

fn manifest_path(rel: &str) -> String {
	std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(rel).to_string_lossy().to_string()
}

fn test_config() -> SiteConfig {
	SiteConfig {
		site: SiteSection {
			title: "patchbay".to_string(),
			listen_addr: "127.0.0.1:0".to_string(),
			static_root: "/static".to_string(),
		},
		content: ContentSection {
			templates_dir: manifest_path("templates"),
			tutorial_dir: manifest_path("templates/tutorial"),
			data_dir: manifest_path("data"),
		},
	}
}

fn sample_patch(id: &str, author: &str, date_created: i64) -> Patch {
	Patch {
		id: id.to_string(),
		title: id.to_string(),
		author: author.to_string(),
		date_created,
		files: BTreeMap::from([("main.sp".to_string(), "440 0.5 sine\n".to_string())]),
	}
}

fn test_app() -> App {
	let config = test_config();
	let templates = TemplateRegistry::load(&config.content.templates_dir, &config.content.tutorial_dir)
		.unwrap_or_else(|e| panic!("Failed to load templates for tests: {e:#}"));
	let store = MemoryStore::new(
		vec![
			sample_patch("alpha", "ada", 100),
			sample_patch("beta", "grace", 300),
			sample_patch("gamma", "ada", 200),
		],
		vec![User { name: "ada".to_string() }, User { name: "grace".to_string() }],
	);

	App {
		config,
		templates,
		sessions: SessionStore::new(),
		store: Box::new(store),
	}
}

fn anonymous(app: &App) -> ViewData {
	base_context(&app.config, None)
}

fn logged_in_as(app: &App, name: &str) -> ViewData {
	base_context(&app.config, Some(name))
}

#[test]
fn test_patch_view_headline_and_files() {
	let app = test_app();
	let page = views::view_patch(&app, anonymous(&app), "alpha").unwrap();

	assert_eq!(page.status, StatusCode::OK);
	assert!(page.html.contains("alpha by ada"), "headline should name title and author");
	assert!(page.html.contains("440 0.5 sine"), "patch file contents should be shown");
	assert!(!page.html.contains("id=\"update\""), "anonymous visitors can never edit");
}

#[test]
fn test_patch_view_edit_rights() {
	let app = test_app();

	let owner_page = views::view_patch(&app, logged_in_as(&app, "ada"), "alpha").unwrap();
	assert!(owner_page.html.contains("id=\"update\""), "the author should get the update button");

	let other_page = views::view_patch(&app, logged_in_as(&app, "grace"), "alpha").unwrap();
	assert!(!other_page.html.contains("id=\"update\""), "other users should not get the update button");
}

#[test]
fn test_missing_patch_renders_not_found() {
	let app = test_app();
	let base = anonymous(&app);

	let result = views::view_patch(&app, base.clone(), "doesnotexist");
	assert!(matches!(result, Err(ViewError::NotFound)));

	let page = views::or_not_found(&app, &base, result).unwrap();
	assert_eq!(page.status, StatusCode::NOT_FOUND);
	assert!(page.html.contains("404 - Not Found"));
}

#[test]
fn test_browse_is_ordered_by_recency() {
	let app = test_app();
	let page = views::view_browse(&app, anonymous(&app)).unwrap();

	assert_eq!(page.status, StatusCode::OK);
	let beta = page.html.find("beta").unwrap();
	let gamma = page.html.find("gamma").unwrap();
	let alpha = page.html.find("alpha").unwrap();
	assert!(beta < gamma && gamma < alpha, "newest patch must come first, got offsets {beta}/{gamma}/{alpha}");
}

#[test]
fn test_user_view_lists_only_their_patches() {
	let app = test_app();
	let page = views::view_user(&app, anonymous(&app), "ada").unwrap();

	assert!(page.html.contains("patches by ada"));
	assert!(page.html.contains("alpha") && page.html.contains("gamma"));
	assert!(!page.html.contains("beta"), "someone else's patch must not appear");
	assert!(page.html.contains("Viewing: "));
}

#[test]
fn test_unknown_user_is_not_found() {
	let app = test_app();
	let result = views::view_user(&app, anonymous(&app), "nobody");
	assert!(matches!(result, Err(ViewError::NotFound)));
}

#[test]
fn test_new_and_continue_editor_seed() {
	let app = test_app();

	let new_page = views::view_new(&app, anonymous(&app)).unwrap();
	let continue_page = views::view_continue(&app, anonymous(&app)).unwrap();

	for page in [&new_page, &continue_page] {
		assert!(page.html.contains("You have just one Sporth"), "editor should be seeded with the default file");
		assert!(page.html.contains("Editing: new patch"));
	}

	assert!(continue_page.html.contains("restoreAutosave"), "continue must restore the autosave");
	assert!(!new_page.html.contains("restoreAutosave"), "a fresh editor must not touch the autosave");
}

#[test]
fn test_learn_defaults_to_index() {
	let app = test_app();
	let page = views::view_learn(&app, anonymous(&app), None).unwrap();

	assert_eq!(page.status, StatusCode::OK);
	assert!(page.html.contains("<h1>Learning Sporth</h1>"), "headline should come from the tutorial title");
	assert!(page.html.contains("<!-- start content -->") && page.html.contains("<!-- end content -->"));
}

#[test]
fn test_learn_page_headline_comes_from_title() {
	let app = test_app();
	let page = views::view_learn(&app, anonymous(&app), Some("first-sounds")).unwrap();

	assert!(page.html.contains("<h1>First sounds</h1>"));
	assert!(page.html.contains("440 0.5 sine"), "the tutorial body should be embedded");
}

#[test]
fn test_learn_unknown_page_is_not_found() {
	let app = test_app();
	let base = anonymous(&app);

	let result = views::view_learn(&app, base.clone(), Some("doesnotexist"));
	assert!(matches!(result, Err(ViewError::NotFound)));

	let page = views::or_not_found(&app, &base, result).unwrap();
	assert_eq!(page.status, StatusCode::NOT_FOUND);
}

#[test]
fn test_render_is_idempotent() {
	let app = test_app();
	let first = views::view_browse(&app, anonymous(&app)).unwrap();
	let second = views::view_browse(&app, anonymous(&app)).unwrap();
	assert_eq!(first.html, second.html, "rendering the same context twice must be byte-identical");
}

#[test]
fn test_nav_highlights_current_view() {
	let app = test_app();

	let browse = views::view_browse(&app, anonymous(&app)).unwrap();
	assert!(browse.html.contains("<li class=\"current\"><a href=\"/browse\">"));

	let about = views::view_about(&app, anonymous(&app)).unwrap();
	assert!(about.html.contains("<li class=\"current\"><a href=\"/about\">"));
	assert!(!about.html.contains("<li class=\"current\"><a href=\"/browse\">"));
}

#[test]
fn test_layout_identity_display() {
	let app = test_app();

	let anon = views::view_about(&app, anonymous(&app)).unwrap();
	assert!(anon.html.contains("anonymous"));

	let known = views::view_about(&app, logged_in_as(&app, "ada")).unwrap();
	assert!(known.html.contains("href=\"/user/ada\""));
}

#[test]
fn test_shipped_data_files_load() {
	let config = test_config();
	let store = MemoryStore::load(std::path::Path::new(&config.content.data_dir))
		.unwrap_or_else(|e| panic!("Failed to load shipped data: {e:#}"));
	let patch = store.patch("gentle-drone").unwrap();
	assert_eq!(patch.author, "ada");
}
