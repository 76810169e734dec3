//! Wiki-link tokenizer.
//!
//! Recognizes `[[Target]]` and `[[Target|Display]]` inside page text. The
//! grammar is forgiving: anything that does not form a complete link stays in
//! the output as literal text. [`link_targets`] scans with the same grammar so
//! the links shown in a rendered page are exactly the edges of the graph.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static WIKI_LINK: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("wiki-link pattern"));

const SNIPPET_RADIUS: usize = 40;

/// One piece of tokenized page text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LinkToken {
	/// Literal text, rendered as-is.
	Text {
		/// The text.
		value: String,
	},
	/// A wiki-link to another page.
	Link {
		/// Trimmed page title (or id) the link points at.
		target: String,
		/// Trimmed visible text; falls back to `target` when empty.
		display: String,
	},
}

impl LinkToken {
	/// The visible text of this token.
	pub fn visible(&self) -> &str {
		match self {
			LinkToken::Text { value } => value,
			LinkToken::Link { display, .. } => display,
		}
	}
}

/// Split the inside of `[[...]]` into a `(target, display)` pair.
///
/// Returns `None` when the target is blank, in which case the whole match is
/// kept as literal text.
fn split_link(inner: &str) -> Option<(String, String)> {
	let (target, display) = match inner.split_once('|') {
		Some((t, d)) => (t.trim(), d.trim()),
		None => (inner.trim(), ""),
	};
	if target.is_empty() {
		return None;
	}
	let display = if display.is_empty() { target } else { display };
	Some((target.to_string(), display.to_string()))
}

fn push_text(tokens: &mut Vec<LinkToken>, text: &str) {
	if text.is_empty() {
		return;
	}
	if let Some(LinkToken::Text { value }) = tokens.last_mut() {
		value.push_str(text);
	} else {
		tokens.push(LinkToken::Text {
			value: text.to_string(),
		});
	}
}

/// Tokenize page content into text and link tokens, left to right.
///
/// Adjacent literal runs are merged into a single text token.
pub fn tokenize(content: &str) -> Vec<LinkToken> {
	let mut tokens = Vec::new();
	let mut cursor = 0;

	for caps in WIKI_LINK.captures_iter(content) {
		let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
			continue;
		};
		push_text(&mut tokens, &content[cursor..whole.start()]);
		match split_link(inner.as_str()) {
			Some((target, display)) => tokens.push(LinkToken::Link { target, display }),
			None => push_text(&mut tokens, whole.as_str()),
		}
		cursor = whole.end();
	}
	push_text(&mut tokens, &content[cursor..]);

	tokens
}

/// Targets of every well-formed link, de-duplicated in first-seen order.
pub fn link_targets(content: &str) -> Vec<String> {
	let mut targets: Vec<String> = Vec::new();
	for token in tokenize(content) {
		if let LinkToken::Link { target, .. } = token {
			if !targets.contains(&target) {
				targets.push(target);
			}
		}
	}
	targets
}

/// A short excerpt of `content` around the first link to `target`.
///
/// Matching is case-insensitive on the trimmed target. Whitespace is collapsed
/// and cut ends are marked with `…`. Returns an empty string when `content`
/// has no such link.
pub fn context_snippet(content: &str, target: &str) -> String {
	let wanted = target.trim().to_lowercase();
	let Some(found) = WIKI_LINK.captures_iter(content).find_map(|caps| {
		let inner = caps.get(1)?;
		let (t, _) = split_link(inner.as_str())?;
		(t.to_lowercase() == wanted).then(|| caps.get(0)).flatten()
	}) else {
		return String::new();
	};

	let before: Vec<char> = content[..found.start()].chars().collect();
	let after: Vec<char> = content[found.end()..].chars().collect();
	let head_start = before.len().saturating_sub(SNIPPET_RADIUS);
	let tail_end = after.len().min(SNIPPET_RADIUS);

	let mut snippet = String::new();
	if head_start > 0 {
		snippet.push('…');
	}
	snippet.extend(&before[head_start..]);
	snippet.push_str(found.as_str());
	snippet.extend(&after[..tail_end]);
	if tail_end < after.len() {
		snippet.push('…');
	}

	snippet.split_whitespace().collect::<Vec<_>>().join(" ")
}
