// SPDX-FileCopyrightText: 2026 LunNova
//
// SPDX-License-Identifier: MIT

mod config;
mod context;
mod session;
mod splice;
mod store;
mod templates;
mod views;
#[cfg(test)]
mod views_tests;

// hyper 1.4 imports. Don't change these, don't assume things that work in hyper 0.x
use hyper::body::{Bytes, Incoming};
use hyper::header::CONTENT_TYPE;
use hyper::server::conn::http1;
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use http_body_util::Full;
use tracing::{error, info};
use tracing_subscriber::prelude::*;

use config::{Args, SiteConfig};
use context::base_context;
use session::{SessionStore, session_id_from_cookie_header};
use store::MemoryStore;
use templates::TemplateRegistry;
use views::{App, RenderedPage, ViewError};

const INTERNAL_ERROR_BODY: &str = "<!DOCTYPE html><html><head><title>500 - Internal Server Error</title></head>\
	<body><h1>Internal Server Error</h1><p>Something went wrong on our end.</p></body></html>";

fn setup_logging() {
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::fmt::layer().with_filter(tracing_subscriber::filter::filter_fn(|metadata| {
				let level = metadata.level();
				match (cfg!(debug_assertions), metadata.target().starts_with(env!("CARGO_PKG_NAME"))) {
					(true, true) => level <= &tracing::Level::TRACE,
					_ => level <= &tracing::Level::INFO,
				}
			})),
		)
		.init();
}

fn load_site_config(site_dir: &str) -> SiteConfig {
	// Relative paths in site.toml work only from the site directory
	let site_dir = Path::new(site_dir)
		.canonicalize()
		.unwrap_or_else(|e| panic!("Failed to resolve site directory '{site_dir}': {e}"));
	std::env::set_current_dir(&site_dir).unwrap_or_else(|e| panic!("Failed to change to site directory: {e}"));

	let config_content = std::fs::read_to_string("site.toml").unwrap_or_else(|e| panic!("Failed to read site.toml: {e}"));
	toml::from_str(&config_content).unwrap_or_else(|e| panic!("Failed to parse config: {e}"))
}

#[tokio::main]
async fn main() {
	setup_logging();

	let args: Args = argh::from_env();
	let mut config = load_site_config(&args.site_dir);
	if let Some(listen) = args.listen {
		config.site.listen_addr = listen;
	}

	let templates = TemplateRegistry::load(&config.content.templates_dir, &config.content.tutorial_dir)
		.unwrap_or_else(|e| panic!("Failed to load templates: {e:#}"));
	let store =
		MemoryStore::load(Path::new(&config.content.data_dir)).unwrap_or_else(|e| panic!("Failed to load site data: {e:#}"));

	let addr: SocketAddr = config
		.site
		.listen_addr
		.parse()
		.unwrap_or_else(|e| panic!("Invalid listen address '{}': {e}", config.site.listen_addr));
	info!("Starting {} on http://{}", config.site.title, addr);

	let app = Arc::new(App {
		config,
		templates,
		sessions: SessionStore::new(),
		store: Box::new(store),
	});

	let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

	loop {
		let (stream, _) = listener.accept().await.unwrap();
		let io = TokioIo::new(stream);

		let app = app.clone();

		tokio::spawn(async move {
			if let Err(err) = http1::Builder::new()
				.serve_connection(io, hyper::service::service_fn(move |req| handle_request(req, app.clone())))
				.await
			{
				eprintln!("Error serving connection: {err:?}");
			}
		});
	}
}

async fn handle_request(req: Request<Incoming>, app: Arc<App>) -> Result<hyper::Response<Full<Bytes>>, hyper::Error> {
	let span = tracing::span!(
		tracing::Level::INFO,
		"handle_request",
		http.method = ?req.method(),
		url.path = ?req.uri().path(),
	);
	let _enter = span.enter();

	if !matches!(req.method(), &Method::GET | &Method::HEAD) {
		return Ok(empty_response(StatusCode::METHOD_NOT_ALLOWED));
	}

	let cookie_header = req.headers().get(hyper::header::COOKIE).and_then(|v| v.to_str().ok());
	let session_id = session_id_from_cookie_header(cookie_header);
	let identity = match app.sessions.identity(session_id.as_deref()) {
		Ok(identity) => identity,
		Err(e) => {
			error!("session lookup failed: {e:#}");
			return Ok(internal_error_response(req.method()));
		}
	};

	let base = base_context(&app.config, identity.as_deref());
	let path = req.uri().path();
	let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

	let result = match segments.as_slice() {
		[] | ["browse"] => views::view_browse(&app, base.clone()),
		["patch", id] => views::view_patch(&app, base.clone(), id),
		["user", name] => views::view_user(&app, base.clone(), name),
		["new"] => views::view_new(&app, base.clone()),
		["continue"] => views::view_continue(&app, base.clone()),
		["about"] => views::view_about(&app, base.clone()),
		["learn"] => views::view_learn(&app, base.clone(), None),
		["learn", page] => views::view_learn(&app, base.clone(), Some(page)),
		_ => Err(ViewError::NotFound),
	};

	match views::or_not_found(&app, &base, result) {
		Ok(page) => Ok(page_response(page, req.method())),
		Err(e) => {
			error!("request for {} failed: {e:#}", req.uri().path());
			Ok(internal_error_response(req.method()))
		}
	}
}

fn page_response(page: RenderedPage, method: &Method) -> hyper::Response<Full<Bytes>> {
	let body = if method == Method::HEAD { Bytes::new() } else { Bytes::from(page.html) };
	hyper::Response::builder()
		.status(page.status)
		.header(CONTENT_TYPE, "text/html; charset=utf-8")
		.body(Full::new(body))
		.unwrap()
}

fn internal_error_response(method: &Method) -> hyper::Response<Full<Bytes>> {
	page_response(
		RenderedPage {
			status: StatusCode::INTERNAL_SERVER_ERROR,
			html: INTERNAL_ERROR_BODY.to_string(),
		},
		method,
	)
}

fn empty_response(status: StatusCode) -> hyper::Response<Full<Bytes>> {
	hyper::Response::builder().status(status).body(Full::new(Bytes::new())).unwrap()
}
