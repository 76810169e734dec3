use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::info;

use super::{navigate_to_page, page_path};
use crate::components::force_graph::ForceGraphCanvas;
use crate::components::workspace_filter::{WorkspaceChanged, WorkspaceFilter};
use crate::config::GraphViewConfig;
use crate::graph::{
	GraphBackend, GraphNode, GraphQuery, GraphSession, GraphSnapshot, GraphSource, list_or_empty,
	load_snapshot,
};

/// Every page and link, optionally scoped to one workspace.
#[component]
pub fn GraphPage() -> impl IntoView {
	let config = GraphViewConfig::load().full_graph_view();
	let backend = Rc::new(GraphBackend::from_config(&config));
	let session = Rc::new(RefCell::new(GraphSession::default()));

	let snapshot = RwSignal::new(GraphSnapshot::empty());
	let workspace = RwSignal::new(None::<String>);
	let workspaces = RwSignal::new(Vec::<String>::new());
	let orphans = RwSignal::new(Vec::<GraphNode>::new());

	let backend_lists = backend.clone();
	spawn_local(async move {
		workspaces.set(list_or_empty(backend_lists.workspaces().await));
		orphans.set(list_or_empty(backend_lists.orphans().await));
	});

	Effect::new(move |_| {
		let query = GraphQuery::Full {
			workspace: workspace.get(),
		};
		let ticket = session.borrow_mut().begin();
		let (backend, session) = (backend.clone(), session.clone());
		spawn_local(async move {
			let loaded = load_snapshot(&*backend, &query).await;
			let (nodes, edges) = (loaded.nodes.len(), loaded.edges.len());
			if session.borrow_mut().accept(ticket, loaded.clone()) {
				info!("applied full graph: {nodes} nodes, {edges} edges");
				snapshot.set(loaded);
			}
		});
	});

	let on_workspace: WorkspaceChanged = Rc::new(move |ws| workspace.set(ws));

	let orphan_list = move || {
		orphans
			.get()
			.into_iter()
			.map(|n| view! { <li><a href=page_path(&n.id)>{n.title}</a></li> })
			.collect_view()
	};

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas
				data=snapshot
				config=config
				on_navigate=navigate_to_page()
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Page Graph"</h1>
				<p class="subtitle">
					"Click a page to open its neighborhood. Drag to pin. Scroll to zoom."
				</p>
				<WorkspaceFilter workspaces=workspaces selected=workspace on_change=on_workspace />
				<Show when=move || orphans.with(|o| !o.is_empty())>
					<details class="orphans">
						<summary>{move || format!("Unlinked pages ({})", orphans.with(Vec::len))}</summary>
						<ul>{orphan_list}</ul>
					</details>
				</Show>
			</div>
		</div>
	}
}
