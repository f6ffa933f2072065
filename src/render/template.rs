//! # Template scanning and literal substitution.
//!
//! A [`Template`] is plain text with placeholders of the form `${NAME}`.
//! The delimiter was chosen so it cannot collide with legal characters in
//! substituted values: values are copied verbatim into the output and are
//! never re-scanned, so a credential containing `/`, `$`, or even `${...}`
//! round-trips unchanged.
//!
//! ## Rules
//! - `${NAME}` is a placeholder; a bare `$NAME` or lone `$` is literal text.
//! - `${` without a closing `}` (or an empty `${}`) is a structural error;
//!   a file with unresolved markers is never written.
//! - Substitution is single-pass and literal: no evaluation, no recursion.

use std::path::{Path, PathBuf};

use crate::error::RenderError;
use crate::render::Bindings;

/// A loaded template file.
#[derive(Clone, Debug)]
pub struct Template {
    path: PathBuf,
    text: String,
}

impl Template {
    /// Reads a template from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref().to_path_buf();
        let text = std::fs::read_to_string(&path).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, text })
    }

    /// Creates a template from already-loaded text. The path is kept for
    /// diagnostics only.
    pub fn from_text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// The template's source path (diagnostics).
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the placeholder names referenced by this template,
    /// deduplicated, in first-occurrence order.
    pub fn placeholders(&self) -> Result<Vec<String>, RenderError> {
        let mut names = Vec::new();
        self.scan(|_, name| {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
            Ok(())
        })?;
        Ok(names)
    }

    /// Substitutes every placeholder with its binding, literally.
    ///
    /// Fails with [`RenderError::MissingBindings`] listing **all** unresolved
    /// names; on failure nothing is produced.
    pub fn substitute(&self, bindings: &Bindings) -> Result<String, RenderError> {
        let missing = bindings.missing(self.placeholders()?.iter().map(String::as_str));
        if !missing.is_empty() {
            return Err(RenderError::MissingBindings {
                template: self.path.clone(),
                names: missing,
            });
        }

        let mut out = String::with_capacity(self.text.len());
        self.scan(|literal, name| {
            out.push_str(literal);
            // Checked above; a name that slipped through is still fail-closed.
            match bindings.resolve(name) {
                Some(value) => {
                    out.push_str(value);
                    Ok(())
                }
                None => Err(RenderError::MissingBindings {
                    template: self.path.clone(),
                    names: vec![name.to_string()],
                }),
            }
        })
        .map(|tail| {
            out.push_str(tail);
            out
        })
    }

    /// Walks the text, invoking `f(literal_before, placeholder_name)` for each
    /// placeholder and returning the trailing literal after the last one.
    fn scan<'a, F>(&'a self, mut f: F) -> Result<&'a str, RenderError>
    where
        F: FnMut(&'a str, &'a str) -> Result<(), RenderError>,
    {
        let text = self.text.as_str();
        let mut rest = 0usize;
        let mut search = 0usize;

        while let Some(pos) = text[search..].find("${") {
            let open = search + pos;
            let name_start = open + 2;
            match text[name_start..].find('}') {
                Some(0) | None => {
                    return Err(RenderError::UnterminatedPlaceholder {
                        template: self.path.clone(),
                        offset: open,
                    });
                }
                Some(len) => {
                    let name = &text[name_start..name_start + len];
                    f(&text[rest..open], name)?;
                    rest = name_start + len + 1;
                    search = rest;
                }
            }
        }
        Ok(&text[rest..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tpl(text: &str) -> Template {
        Template::from_text("test.tpl", text)
    }

    #[test]
    fn placeholders_dedup_in_order() {
        let t = tpl("a=${A} b=${B} again=${A}");
        assert_eq!(t.placeholders().unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn no_placeholders_is_fine() {
        let t = tpl("plain text $HOME $ {X}");
        assert!(t.placeholders().unwrap().is_empty());
        let out = t.substitute(&Bindings::new()).unwrap();
        assert_eq!(out, "plain text $HOME $ {X}");
    }

    #[test]
    fn unterminated_placeholder_is_an_error() {
        let t = tpl("user=${U");
        match t.placeholders() {
            Err(RenderError::UnterminatedPlaceholder { offset, .. }) => assert_eq!(offset, 5),
            other => panic!("expected UnterminatedPlaceholder, got {other:?}"),
        }
    }

    #[test]
    fn empty_placeholder_is_an_error() {
        let t = tpl("x=${}");
        assert!(matches!(
            t.placeholders(),
            Err(RenderError::UnterminatedPlaceholder { .. })
        ));
    }

    #[test]
    fn substitution_is_literal_and_single_pass() {
        let b = Bindings::new()
            .with("U", "alice")
            .with("P", "p@ss/w0rd")
            .with("NESTED", "${U}");
        let t = tpl("user=${U} pass=${P} raw=${NESTED}");
        let out = t.substitute(&b).unwrap();
        assert_eq!(out, "user=alice pass=p@ss/w0rd raw=${U}");
    }

    #[test]
    fn all_missing_names_reported_once() {
        let t = tpl("${A} ${B} ${A}");
        let b = Bindings::new().with("B", "ok");
        match t.substitute(&b) {
            Err(RenderError::MissingBindings { names, .. }) => {
                assert_eq!(names, vec!["A"]);
            }
            other => panic!("expected MissingBindings, got {other:?}"),
        }
    }

    #[test]
    fn adjacent_placeholders() {
        let b = Bindings::new().with("A", "1").with("B", "2");
        assert_eq!(tpl("${A}${B}").substitute(&b).unwrap(), "12");
    }
}
