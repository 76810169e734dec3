use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params_map;
use log::{debug, info};

use super::{navigate_to_page, page_path};
use crate::components::backlinks::BacklinksPanel;
use crate::components::force_graph::ForceGraphCanvas;
use crate::components::wiki_text::NavigateByTitle;
use crate::config::GraphViewConfig;
use crate::graph::{
	Backlink, GraphBackend, GraphNode, GraphQuery, GraphSession, GraphSnapshot, GraphSource,
	list_or_empty, load_snapshot,
};

const SUGGESTION_LIMIT: usize = 5;

/// One page, its direct neighbors, and who links to it.
#[component]
pub fn NeighborhoodPage() -> impl IntoView {
	let params = use_params_map();
	let page_id = Memo::new(move |_| params.with(|p| p.get("id").unwrap_or_default()));

	let config = GraphViewConfig::load().neighborhood_view();
	let backend = Rc::new(GraphBackend::from_config(&config));
	let session = Rc::new(RefCell::new(GraphSession::default()));

	let snapshot = RwSignal::new(GraphSnapshot::empty());
	let backlinks = RwSignal::new(Vec::<Backlink>::new());
	let suggestions = RwSignal::new(Vec::<GraphNode>::new());

	Effect::new(move |_| {
		let id = page_id.get();
		let ticket = session.borrow_mut().begin();
		let (backend, session) = (backend.clone(), session.clone());
		spawn_local(async move {
			let query = GraphQuery::Neighborhood { page_id: id.clone() };
			let loaded = load_snapshot(&*backend, &query).await;
			let inbound = list_or_empty(backend.backlinks(&id).await);
			let related = list_or_empty(backend.suggestions(&id, SUGGESTION_LIMIT).await);

			let (nodes, edges) = (loaded.nodes.len(), loaded.edges.len());
			if session.borrow_mut().accept(ticket, loaded.clone()) {
				info!("applied neighborhood of {id}: {nodes} nodes, {edges} edges");
				snapshot.set(loaded);
				backlinks.set(inbound);
				suggestions.set(related);
			}
		});
	});

	let on_navigate = navigate_to_page();
	let open_page = on_navigate.clone();
	let on_link: NavigateByTitle = Rc::new(move |target: &str| {
		let found = snapshot.with_untracked(|s| s.resolve(target).map(|n| (n.id.clone(), n.title.clone())));
		match found {
			Some((id, title)) => open_page(&id, &title),
			None => debug!("link target {target:?} is not in this neighborhood"),
		}
	});

	let title = move || {
		let id = page_id.get();
		snapshot.with(|s| s.node(&id).map_or(id.clone(), |n| n.title.clone()))
	};

	let related = move || {
		suggestions
			.get()
			.into_iter()
			.map(|n| view! { <li><a href=page_path(&n.id)>{n.title}</a></li> })
			.collect_view()
	};

	view! {
		<div class="neighborhood-page">
			<header>
				<a href="/">"All pages"</a>
				<h1>{title}</h1>
			</header>
			<div class="neighborhood-graph" style="height: 420px;">
				<ForceGraphCanvas data=snapshot config=config on_navigate=on_navigate />
			</div>
			<BacklinksPanel backlinks=backlinks on_link=on_link />
			<Show when=move || suggestions.with(|s| !s.is_empty())>
				<section class="suggestions">
					<h2>"Related pages"</h2>
					<ul>{related}</ul>
				</section>
			</Show>
		</div>
	}
}
