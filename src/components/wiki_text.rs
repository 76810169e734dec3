use std::rc::Rc;

use leptos::prelude::*;
use web_sys::MouseEvent;

use crate::links::{LinkToken, tokenize};

/// Called with a link target (a page title or id).
pub type NavigateByTitle = Rc<dyn Fn(&str)>;

/// Page content with `[[wiki links]]` turned into anchors.
#[component]
pub fn WikiText(#[prop(into)] content: String, on_navigate: NavigateByTitle) -> impl IntoView {
	tokenize(&content)
		.into_iter()
		.map(|token| match token {
			LinkToken::Text { value } => view! { <span>{value}</span> }.into_any(),
			LinkToken::Link { target, display } => {
				let navigate = on_navigate.clone();
				let title = target.clone();
				view! {
					<a
						class="wiki-link"
						href="#"
						title=title
						on:click=move |ev: MouseEvent| {
							ev.prevent_default();
							navigate(&target);
						}
					>
						{display}
					</a>
				}
				.into_any()
			}
		})
		.collect_view()
}
