//! Canvas rendering of the page link graph.

mod component;
mod drift;
mod frame_loop;
mod labels;
mod palette;
mod render;
mod simulation;
mod state;

pub use component::{ForceGraphCanvas, NavigateFn};
