use leptos::prelude::*;

use super::wiki_text::{NavigateByTitle, WikiText};
use crate::graph::Backlink;
use crate::pages::page_path;

/// Pages linking here, each with the text around its link.
#[component]
pub fn BacklinksPanel(
	#[prop(into)] backlinks: Signal<Vec<Backlink>>,
	on_link: NavigateByTitle,
) -> impl IntoView {
	let on_link = StoredValue::new_local(on_link);

	let entries = move || {
		backlinks
			.get()
			.into_iter()
			.map(|b| {
				view! {
					<li class="backlink">
						<a href=page_path(&b.page_id)>{b.page_title}</a>
						<p class="context">
							<WikiText content=b.context_snippet on_navigate=on_link.get_value() />
						</p>
					</li>
				}
			})
			.collect_view()
	};

	view! {
		<section class="backlinks">
			<h2>{move || format!("Linked from ({})", backlinks.with(Vec::len))}</h2>
			<Show
				when=move || backlinks.with(|b| !b.is_empty())
				fallback=|| view! { <p class="empty">"No backlinks yet"</p> }
			>
				<ul>{entries}</ul>
			</Show>
		</section>
	}
}
