pub mod backlinks;
pub mod force_graph;
pub mod wiki_text;
pub mod workspace_filter;
