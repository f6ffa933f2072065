//! # Render a template to its target path.
//!
//! `render` is the once-per-start templating step: it validates every
//! placeholder against the binding snapshot, substitutes literally, writes the
//! target (creating parent directories, overwriting any prior version), and
//! verifies the result is non-empty.
//!
//! ## Rules
//! - All missing bindings are collected and reported **before** any output
//!   is written.
//! - Re-running with identical inputs yields byte-identical output.
//! - An empty output file is [`RenderError::EmptyOutput`], distinct from a
//!   missing binding, even when substitution itself reported no error.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::RenderError;
use crate::render::{Bindings, Template};

/// A successfully rendered config file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedConfig {
    /// Where the file was written.
    pub path: PathBuf,
    /// Size of the written file in bytes (always > 0).
    pub bytes: u64,
}

/// Loads `template_path`, substitutes `bindings`, and writes `target_path`.
///
/// See [`render_template`] for the contract; this is the file-to-file wrapper.
pub fn render(
    template_path: impl AsRef<Path>,
    target_path: impl AsRef<Path>,
    bindings: &Bindings,
) -> Result<RenderedConfig, RenderError> {
    let template = Template::load(template_path)?;
    render_template(&template, target_path.as_ref(), bindings)
}

/// Renders an already-loaded [`Template`] to `target`.
///
/// ### Flow
/// 1. Scan placeholders and collect every missing/empty binding → fail with
///    [`RenderError::MissingBindings`] before touching the target.
/// 2. Substitute literally (no evaluation, no recursion).
/// 3. `create_dir_all` the target's parent, write the file (overwrite).
/// 4. Verify the written file exists and is non-empty, else
///    [`RenderError::EmptyOutput`].
pub fn render_template(
    template: &Template,
    target: &Path,
    bindings: &Bindings,
) -> Result<RenderedConfig, RenderError> {
    let output = template.substitute(bindings)?;

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| RenderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    fs::write(target, output.as_bytes()).map_err(|source| RenderError::Io {
        path: target.to_path_buf(),
        source,
    })?;

    let meta = fs::metadata(target).map_err(|source| RenderError::Io {
        path: target.to_path_buf(),
        source,
    })?;
    if meta.len() == 0 {
        return Err(RenderError::EmptyOutput {
            path: target.to_path_buf(),
        });
    }

    Ok(RenderedConfig {
        path: target.to_path_buf(),
        bytes: meta.len(),
    })
}
