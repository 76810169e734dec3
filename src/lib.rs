//! Page link graph for a wiki-style notebook: link parsing, graph queries,
//! and a Leptos canvas view of the result.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod config;
pub mod error;
pub mod graph;
pub mod links;

mod components;
mod pages;

use crate::pages::graph::GraphPage;
use crate::pages::neighborhood::NeighborhoodPage;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Router for the full graph and per-page neighborhoods.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />
		<Title text="Page Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=GraphPage />
				<Route path=path!("/graph/:id") view=NeighborhoodPage />
			</Routes>
		</Router>
	}
}
