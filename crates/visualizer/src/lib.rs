//! Host page and red-black tree visualizer the insert driver feeds.

pub mod document;
pub mod page;
mod selector;
pub mod target;
pub mod tree_view;

pub use document::{Document, Listener, SignalContext};
pub use page::{algorithm_page, AlgorithmPage};
pub use target::{DocumentLocator, InputTarget};
pub use tree_view::TreeVisualizer;

#[cfg(test)]
#[path = "tests/document_tests.rs"]
mod tests;
