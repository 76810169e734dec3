use std::rc::Rc;

use leptos::prelude::*;

/// Called with the chosen workspace, `None` for all.
pub type WorkspaceChanged = Rc<dyn Fn(Option<String>)>;

/// The empty option stands for "all workspaces".
fn selection(value: &str) -> Option<String> {
	let value = value.trim();
	(!value.is_empty()).then(|| value.to_string())
}

#[component]
pub fn WorkspaceFilter(
	#[prop(into)] workspaces: Signal<Vec<String>>,
	#[prop(into)] selected: Signal<Option<String>>,
	on_change: WorkspaceChanged,
) -> impl IntoView {
	let options = move || {
		workspaces
			.get()
			.into_iter()
			.map(|ws| {
				let (value, current) = (ws.clone(), ws.clone());
				view! {
					<option
						value=value
						selected=move || selected.with(|s| s.as_deref() == Some(current.as_str()))
					>
						{ws}
					</option>
				}
			})
			.collect_view()
	};

	view! {
		<label class="workspace-filter">
			"Workspace "
			<select on:change=move |ev| on_change(selection(&event_target_value(&ev)))>
				<option value="" selected=move || selected.with(Option::is_none)>
					"All"
				</option>
				{options}
			</select>
		</label>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_option_means_all_workspaces() {
		assert_eq!(selection(""), None);
		assert_eq!(selection("  "), None);
		assert_eq!(selection("work"), Some("work".to_string()));
	}
}
