// SPDX-FileCopyrightText: 2026 LunNova
//
// SPDX-License-Identifier: MIT

use anyhow::anyhow;
use std::collections::HashMap;
use std::sync::RwLock;

pub const SESSION_COOKIE: &str = "sess";
const NAME_ATTRIBUTE: &str = "name";

/// Opaque per-session key-value attributes. Login writes the `name`
/// attribute; everything here only ever reads it.
pub type SessionAttributes = HashMap<String, String>;

#[derive(Default)]
pub struct SessionStore {
	sessions: RwLock<HashMap<String, SessionAttributes>>,
}

impl SessionStore {
	pub fn new() -> Self {
		Self::default()
	}

	// The login flow writes through here; account handling lives outside this crate.
	#[allow(dead_code)]
	pub fn insert(&self, session_id: &str, attributes: SessionAttributes) -> anyhow::Result<()> {
		let mut sessions = self.sessions.write().map_err(|_| anyhow!("session store lock poisoned"))?;
		sessions.insert(session_id.to_string(), attributes);
		Ok(())
	}

	/// Resolve the logged-in name for a request's session, if any.
	///
	/// A missing cookie, unknown session id, or absent name attribute is the
	/// normal anonymous outcome (`Ok(None)`). Only a store failure is an
	/// error, and that fails the whole request.
	pub fn identity(&self, session_id: Option<&str>) -> anyhow::Result<Option<String>> {
		let Some(session_id) = session_id else {
			return Ok(None);
		};
		let sessions = self.sessions.read().map_err(|_| anyhow!("session store lock poisoned"))?;
		Ok(sessions.get(session_id).and_then(|attributes| attributes.get(NAME_ATTRIBUTE).cloned()))
	}
}

/// Extract the session id from a Cookie request header.
pub fn session_id_from_cookie_header(header: Option<&str>) -> Option<String> {
	let header = header?;
	header.split(';').find_map(|pair| {
		let (key, value) = pair.trim().split_once('=')?;
		if key == SESSION_COOKIE && !value.is_empty() {
			Some(value.to_string())
		} else {
			None
		}
	})
}
