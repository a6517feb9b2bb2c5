// SPDX-FileCopyrightText: 2026 LunNova
//
// SPDX-License-Identifier: MIT

//! Extracts a headline and body fragment from standalone tutorial documents
//! so they can be embedded in the site layout.
//!
//! **WARNING**: This module is tested enough to work with the documents we
//! author ourselves, but is not intended to handle arbitrary possibly
//! malicious HTML. It drives html5ever's tokenizer directly and manually
//! reconstructs markup for the body fragment, which works for well-formed
//! content but normalizes attribute quoting and may have edge cases with
//! malformed input. Only the first `<title>`, `<h1>` and `<body>` in the
//! document are honored.

use html5ever::Attribute;
use html5ever::tokenizer::{BufferQueue, EndTag, StartTag, Token, TokenSink, Tokenizer, TokenizerOpts};
use markup5ever::TokenizerResult;
use std::cell::RefCell;
use tracing::debug;

pub const START_SENTINEL: &str = "<!-- start content -->";
pub const END_SENTINEL: &str = "<!-- end content -->";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpliceError {
	#[error("document has no <title> or <h1> to take a headline from")]
	MissingHeadline,
	#[error("document has no <body> element")]
	MissingBody,
}

#[derive(Debug)]
pub struct SplicedTutorial {
	pub headline: String,
	/// Body fragment bracketed by the content sentinels. Pre-trusted markup;
	/// must not be escaped again downstream.
	pub fragment: String,
}

#[derive(Clone, Copy, PartialEq)]
enum TextTarget {
	Title,
	H1,
}

/// Extraction token sink.
///
/// Note: forced to use RefCell for interior mutability because html5ever's
/// TokenSink trait takes `&self`.
struct ExtractingTokenSink {
	title: RefCell<Option<String>>,
	h1: RefCell<Option<String>>,
	body: RefCell<Option<String>>,
	capturing: RefCell<Option<TextTarget>>,
	in_body: RefCell<bool>,
	in_raw_tag: RefCell<bool>,
}

impl ExtractingTokenSink {
	fn new() -> Self {
		Self {
			title: RefCell::new(None),
			h1: RefCell::new(None),
			body: RefCell::new(None),
			capturing: RefCell::new(None),
			in_body: RefCell::new(false),
			in_raw_tag: RefCell::new(false),
		}
	}

	fn write_start_tag(&self, name: &str, attrs: &[Attribute], self_closing: bool) {
		let mut body = self.body.borrow_mut();
		let Some(output) = body.as_mut() else { return };
		output.push('<');
		output.push_str(name);

		for attr in attrs {
			output.push(' ');
			output.push_str(&attr.name.local);
			output.push_str("=\"");
			output.push_str(&html_escape(&attr.value));
			output.push('"');
		}

		if self_closing {
			output.push_str(" />");
		} else {
			output.push('>');
		}
	}

	fn write_end_tag(&self, name: &str) {
		let mut body = self.body.borrow_mut();
		let Some(output) = body.as_mut() else { return };
		output.push_str("</");
		output.push_str(name);
		output.push('>');
	}
}

fn html_escape(s: &str) -> String {
	s.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
		.replace('\'', "&#39;")
}

impl TokenSink for ExtractingTokenSink {
	type Handle = ();

	fn process_token(&self, token: Token, _line_number: u64) -> html5ever::tokenizer::TokenSinkResult<Self::Handle> {
		use html5ever::tokenizer::TokenSinkResult;

		match token {
			Token::TagToken(tag) => match tag.kind {
				StartTag => {
					let name = &*tag.name;
					// First <body> opens capture; a nested <body> is content.
					if name == "body" && self.body.borrow().is_none() {
						*self.in_body.borrow_mut() = true;
						*self.body.borrow_mut() = Some(String::new());
						return TokenSinkResult::Continue;
					}
					if *self.in_body.borrow() {
						self.write_start_tag(name, &tag.attrs, tag.self_closing);
					}
					if name == "script" || name == "style" {
						*self.in_raw_tag.borrow_mut() = true;
					}
					let capturing = *self.capturing.borrow();
					if capturing.is_none() {
						if name == "title" && self.title.borrow().is_none() {
							*self.title.borrow_mut() = Some(String::new());
							*self.capturing.borrow_mut() = Some(TextTarget::Title);
						} else if name == "h1" && self.h1.borrow().is_none() {
							*self.h1.borrow_mut() = Some(String::new());
							*self.capturing.borrow_mut() = Some(TextTarget::H1);
						}
					}
				}
				EndTag => {
					let name = &*tag.name;
					if name == "script" || name == "style" {
						*self.in_raw_tag.borrow_mut() = false;
					}
					let capturing = *self.capturing.borrow();
					match (capturing, name) {
						(Some(TextTarget::Title), "title") | (Some(TextTarget::H1), "h1") => {
							*self.capturing.borrow_mut() = None;
						}
						_ => {}
					}
					// Capture stops at the first </body>; the rest of the
					// document is dropped.
					if name == "body" && *self.in_body.borrow() {
						*self.in_body.borrow_mut() = false;
						return TokenSinkResult::Continue;
					}
					if *self.in_body.borrow() {
						self.write_end_tag(name);
					}
				}
			},
			Token::CharacterTokens(chars) => {
				if let Some(target) = *self.capturing.borrow() {
					let cell = match target {
						TextTarget::Title => &self.title,
						TextTarget::H1 => &self.h1,
					};
					if let Some(text) = cell.borrow_mut().as_mut() {
						text.push_str(&chars);
					}
				}
				if *self.in_body.borrow()
					&& let Some(output) = self.body.borrow_mut().as_mut()
				{
					if *self.in_raw_tag.borrow() {
						output.push_str(&chars);
					} else {
						output.push_str(&html_escape(&chars));
					}
				}
			}
			Token::CommentToken(comment) => {
				if *self.in_body.borrow()
					&& let Some(output) = self.body.borrow_mut().as_mut()
				{
					output.push_str("<!--");
					output.push_str(&comment);
					output.push_str("-->");
				}
			}
			Token::DoctypeToken(_) => {}
			Token::NullCharacterToken => {}
			Token::EOFToken => {}
			Token::ParseError(err) => {
				debug!("tutorial markup parse error: {err}");
			}
		}

		TokenSinkResult::Continue
	}
}

/// Pull a headline and the body fragment out of a rendered tutorial
/// document. The headline is the first `<title>` text, falling back to the
/// first `<h1>` when the title is absent or empty.
pub fn splice_tutorial(document: &str) -> Result<SplicedTutorial, SpliceError> {
	let sink = ExtractingTokenSink::new();
	let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());

	let input = BufferQueue::default();
	input.push_back(document.into());

	loop {
		match tokenizer.feed(&input) {
			TokenizerResult::Done => break,
			TokenizerResult::Script(_) => continue, // Script execution is not our concern
			TokenizerResult::EncodingIndicator(_) => continue, // non-terminal; keep feeding
		}
	}
	tokenizer.end();

	let title = tokenizer.sink.title.take().filter(|t| !t.is_empty());
	let h1 = tokenizer.sink.h1.take().filter(|t| !t.is_empty());
	let headline = title.or(h1).ok_or(SpliceError::MissingHeadline)?;
	let body = tokenizer.sink.body.take().ok_or(SpliceError::MissingBody)?;

	Ok(SplicedTutorial {
		headline,
		fragment: format!("{START_SENTINEL}{body}{END_SENTINEL}"),
	})
}
