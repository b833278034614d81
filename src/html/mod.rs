//! Rendu et persistance des pages HTML.

pub mod renderer;
pub mod writer;

pub use renderer::HtmlRenderer;
pub use writer::{output_path, write_course};
