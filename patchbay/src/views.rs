// SPDX-FileCopyrightText: 2026 LunNova
//
// SPDX-License-Identifier: MIT

//! One handler per page. Each takes a freshly built base context, pulls in
//! whatever the page needs from the store, fills the context fields and
//! renders the shared layout. Expected-absence failures come back as
//! [`ViewError::NotFound`]; everything else is internal and the HTTP
//! boundary answers it with a 500.

use hyper::StatusCode;
use std::collections::BTreeMap;

use crate::config::SiteConfig;
use crate::context::{TrustedHtml, ViewData};
use crate::session::SessionStore;
use crate::splice::splice_tutorial;
use crate::store::{Patch, PatchStore, SearchFilter, StoreError, order_by_recency};
use crate::templates::{TemplateRegistry, is_unknown_template};

const DEFAULT_FILE: &str = "main.sp";
const DEFAULT_FILE_CONTENT: &str = "# You have just one Sporth. Make something.\n\n";
const RESTORE_AUTOSAVE_SCRIPT: &str = "  restoreAutosave(); ";
const DEFAULT_TUTORIAL_PAGE: &str = "index";

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
	#[error("not found")]
	NotFound,
	#[error(transparent)]
	Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ViewError {
	fn from(error: StoreError) -> Self {
		match error {
			StoreError::NotFound => ViewError::NotFound,
			StoreError::Internal(e) => ViewError::Internal(e),
		}
	}
}

pub struct RenderedPage {
	pub status: StatusCode,
	pub html: String,
}

/// Process-wide state shared by every request. Everything in here is built
/// before the listener starts and read-only afterwards.
pub struct App {
	pub config: SiteConfig,
	pub templates: TemplateRegistry,
	pub sessions: SessionStore,
	pub store: Box<dyn PatchStore>,
}

fn render(app: &App, data: &ViewData, status: StatusCode) -> Result<RenderedPage, ViewError> {
	let html = app
		.templates
		.render_layout(data)
		.map_err(|e| anyhow::Error::new(e).context(format!("layout render failed for view {:?}", data.current_view)))?;
	Ok(RenderedPage { status, html })
}

pub fn view_patch(app: &App, mut data: ViewData, id: &str) -> Result<RenderedPage, ViewError> {
	let patch = app.store.patch(id)?;
	data.can_edit_patch = data.logged_in && patch.author == data.user_name;
	data.current_view = "Patch".to_string();
	data.headline = format!("{} by {}", patch.title, patch.author);
	data.patch = Some(patch);
	render(app, &data, StatusCode::OK)
}

pub fn view_user(app: &App, mut data: ViewData, name: &str) -> Result<RenderedPage, ViewError> {
	let user = app.store.user(name)?;
	let mut patches = app.store.patches(&SearchFilter {
		author: Some(user.name.clone()),
	})?;
	order_by_recency(&mut patches);
	data.current_view = "User".to_string();
	data.headline_prefix = "Viewing: ".to_string();
	data.headline = format!("patches by {}", user.name);
	data.viewing_user = Some(user);
	data.patches = patches;
	render(app, &data, StatusCode::OK)
}

fn editor_context(mut data: ViewData) -> ViewData {
	data.current_view = "Patch".to_string();
	data.headline_prefix = "Editing: ".to_string();
	data.headline = "new patch".to_string();
	data.patch = Some(Patch {
		files: BTreeMap::from([(DEFAULT_FILE.to_string(), DEFAULT_FILE_CONTENT.to_string())]),
		..Patch::default()
	});
	data
}

pub fn view_new(app: &App, data: ViewData) -> Result<RenderedPage, ViewError> {
	let data = editor_context(data);
	render(app, &data, StatusCode::OK)
}

pub fn view_continue(app: &App, data: ViewData) -> Result<RenderedPage, ViewError> {
	let mut data = editor_context(data);
	data.final_script = TrustedHtml::new(RESTORE_AUTOSAVE_SCRIPT);
	render(app, &data, StatusCode::OK)
}

pub fn view_browse(app: &App, mut data: ViewData) -> Result<RenderedPage, ViewError> {
	let mut patches = app.store.patches(&SearchFilter::default())?;
	order_by_recency(&mut patches);
	data.current_view = "Browse".to_string();
	data.headline_prefix = "Viewing: ".to_string();
	data.headline = "all patches".to_string();
	data.patches = patches;
	render(app, &data, StatusCode::OK)
}

pub fn view_about(app: &App, mut data: ViewData) -> Result<RenderedPage, ViewError> {
	data.current_view = "About".to_string();
	data.headline = "About".to_string();
	render(app, &data, StatusCode::OK)
}

pub fn view_learn(app: &App, mut data: ViewData, page: Option<&str>) -> Result<RenderedPage, ViewError> {
	let page = page.unwrap_or(DEFAULT_TUTORIAL_PAGE);
	let template_name = format!("{page}.html");
	data.current_view = "Learn".to_string();

	// Nested render pass against the tutorial set, into a buffer.
	let document = match app.templates.render_tutorial(&template_name, &data) {
		Ok(document) => document,
		Err(e) if is_unknown_template(&e) => return Err(ViewError::NotFound),
		Err(e) => {
			return Err(ViewError::Internal(
				anyhow::Error::new(e).context(format!("tutorial page {template_name} failed to render")),
			));
		}
	};

	let spliced =
		splice_tutorial(&document).map_err(|e| anyhow::Error::new(e).context(format!("tutorial page {template_name} is malformed")))?;
	data.headline = spliced.headline;
	data.tutorial = TrustedHtml::new(spliced.fragment);
	render(app, &data, StatusCode::OK)
}

pub fn view_not_found(app: &App, mut data: ViewData) -> Result<RenderedPage, ViewError> {
	data.current_view = "404".to_string();
	data.headline = "404 - Not Found".to_string();
	render(app, &data, StatusCode::NOT_FOUND)
}

/// Collapse the expected-absence path: any handler's `NotFound` becomes the
/// rendered not-found page. Internal errors pass through to the boundary.
pub fn or_not_found(app: &App, base: &ViewData, result: Result<RenderedPage, ViewError>) -> Result<RenderedPage, ViewError> {
	match result {
		Err(ViewError::NotFound) => view_not_found(app, base.clone()),
		other => other,
	}
}
