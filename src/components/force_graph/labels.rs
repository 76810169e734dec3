//! Node label layout.

const ELLIPSIS: char = '…';
const MIN_LABEL_OPACITY: f64 = 0.3;

/// Wrap `title` onto at most two lines of `budget` characters, breaking on
/// spaces where possible. Overflow past the second line is cut with `…`.
pub fn wrap_label(title: &str, budget: usize) -> Vec<String> {
	let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
	let budget = budget.max(2);
	if title.chars().count() <= budget {
		return vec![title];
	}

	let (first, rest) = split_line(&title, budget);
	let rest = rest.trim_start();
	let second = if rest.chars().count() <= budget {
		rest.to_string()
	} else {
		let mut cut: String = rest.chars().take(budget - 1).collect();
		cut.truncate(cut.trim_end().len());
		cut.push(ELLIPSIS);
		cut
	};
	vec![first.trim_end().to_string(), second]
}

/// First line of at most `budget` chars: up to the last space that fits, or
/// a hard break when the first word is longer than the budget.
fn split_line(text: &str, budget: usize) -> (&str, &str) {
	let limit = text.char_indices().nth(budget).map_or(text.len(), |(i, _)| i);
	let head = &text[..limit];
	if text[limit..].starts_with(' ') {
		return (head, &text[limit..]);
	}
	match head.rfind(' ') {
		Some(space) if space > 0 => (&text[..space], &text[space..]),
		_ => (head, &text[limit..]),
	}
}

/// Label opacity rising with degree, so sparse nodes fade back.
pub fn label_opacity(link_count: u32, max_link_count: u32) -> f64 {
	if max_link_count == 0 {
		return MIN_LABEL_OPACITY;
	}
	let share = (link_count.min(max_link_count) as f64 / max_link_count as f64).sqrt();
	MIN_LABEL_OPACITY + (1.0 - MIN_LABEL_OPACITY) * share
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn short_titles_stay_on_one_line() {
		assert_eq!(wrap_label("Inbox", 18), vec!["Inbox"]);
		assert_eq!(wrap_label("Exactly eighteen c", 18), vec!["Exactly eighteen c"]);
	}

	#[test]
	fn long_titles_break_on_words() {
		assert_eq!(
			wrap_label("Force Directed Layouts", 18),
			vec!["Force Directed", "Layouts"]
		);
	}

	#[test]
	fn overflowing_second_line_is_ellipsized() {
		let lines = wrap_label("Designing a code fine tuning model from fundamentals data", 18);
		assert_eq!(lines.len(), 2);
		assert_eq!(lines[0], "Designing a code");
		assert!(lines[1].ends_with('…'));
		assert!(lines[1].chars().count() <= 18);
	}

	#[test]
	fn unbroken_word_is_hard_split() {
		let lines = wrap_label("Supercalifragilisticexpialidocious", 10);
		assert_eq!(lines[0], "Supercalif");
		assert_eq!(lines[1], "ragilisti…");
	}

	#[test]
	fn multibyte_titles_are_cut_on_char_boundaries() {
		let lines = wrap_label("Ünïcödé wörds everywhere in this tïtle", 8);
		assert_eq!(lines.len(), 2);
		assert!(lines.iter().all(|l| l.chars().count() <= 8));
	}

	#[test]
	fn opacity_scales_with_degree() {
		assert_eq!(label_opacity(0, 0), MIN_LABEL_OPACITY);
		assert_eq!(label_opacity(0, 10), MIN_LABEL_OPACITY);
		assert!((label_opacity(10, 10) - 1.0).abs() < 1e-12);
		assert!(label_opacity(3, 10) < label_opacity(6, 10));
	}
}
