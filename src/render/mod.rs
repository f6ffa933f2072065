//! Config rendering: environment snapshot, templates, and the renderer.
//!
//! This module implements the templating step that runs before any dependent
//! process starts:
//! - [`Bindings`] — immutable name→value snapshot captured once at startup;
//! - [`Template`] — a file with `${NAME}` placeholders;
//! - [`render`] — validate, substitute, write, verify non-empty.
//!
//! Rendering fails closed: a missing or empty binding aborts before any output
//! is written, and a degenerate (empty) output file is an error of its own.

mod bindings;
mod renderer;
mod template;

pub use bindings::Bindings;
pub use renderer::{render, render_template, RenderedConfig};
pub use template::Template;
