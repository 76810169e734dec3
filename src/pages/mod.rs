pub mod graph;
pub mod neighborhood;
pub mod not_found;

use std::rc::Rc;

use leptos_router::hooks::use_navigate;

use crate::components::force_graph::NavigateFn;

/// Route of a page's neighborhood view.
pub fn page_path(page_id: &str) -> String {
	format!("/graph/{}", String::from(js_sys::encode_uri_component(page_id)))
}

/// Node-click handler that routes to the clicked page's neighborhood.
fn navigate_to_page() -> NavigateFn {
	let navigate = use_navigate();
	Rc::new(move |page_id: &str, _title: &str| navigate(&page_path(page_id), Default::default()))
}
