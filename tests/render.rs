//! End-to-end tests for the config renderer: fail-closed validation,
//! literal substitution, and output verification.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use bootvisor::{render, Bindings, RenderError};

fn write_template(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn renders_all_placeholders() {
    let dir = TempDir::new().unwrap();
    let tpl = write_template(&dir, "app.conf.tpl", "user=${PG_USER} pass=${PG_PASSWORD}\n");
    let out = dir.path().join("app.conf");

    let bindings = Bindings::new()
        .with("PG_USER", "app")
        .with("PG_PASSWORD", "p@ss/w0rd");
    let rendered = render(&tpl, &out, &bindings).unwrap();

    assert_eq!(rendered.path, out);
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "user=app pass=p@ss/w0rd\n"
    );
}

#[test]
fn missing_bindings_reported_together_and_nothing_written() {
    let dir = TempDir::new().unwrap();
    let tpl = write_template(&dir, "t.tpl", "${HOST}:${PORT}/${DB}");
    let out = dir.path().join("t.conf");

    let bindings = Bindings::new().with("PORT", "5432");
    match render(&tpl, &out, &bindings) {
        Err(RenderError::MissingBindings { names, .. }) => {
            assert_eq!(names, vec!["HOST", "DB"]);
        }
        other => panic!("expected MissingBindings, got {other:?}"),
    }
    assert!(!out.exists());
}

#[test]
fn empty_value_counts_as_missing() {
    let dir = TempDir::new().unwrap();
    let tpl = write_template(&dir, "t.tpl", "secret=${TOKEN}");
    let out = dir.path().join("t.conf");

    let bindings = Bindings::new().with("TOKEN", "");
    match render(&tpl, &out, &bindings) {
        Err(RenderError::MissingBindings { names, .. }) => {
            assert_eq!(names, vec!["TOKEN"]);
        }
        other => panic!("expected MissingBindings, got {other:?}"),
    }
}

#[test]
fn empty_template_is_empty_output_not_missing_binding() {
    let dir = TempDir::new().unwrap();
    let tpl = write_template(&dir, "empty.tpl", "");
    let out = dir.path().join("empty.conf");

    match render(&tpl, &out, &Bindings::new()) {
        Err(RenderError::EmptyOutput { path }) => assert_eq!(path, out),
        other => panic!("expected EmptyOutput, got {other:?}"),
    }
}

#[test]
fn rerender_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let tpl = write_template(&dir, "t.tpl", "host=${HOST}\n");
    let out = dir.path().join("t.conf");
    let bindings = Bindings::new().with("HOST", "db.internal");

    render(&tpl, &out, &bindings).unwrap();
    let first = fs::read(&out).unwrap();
    render(&tpl, &out, &bindings).unwrap();
    assert_eq!(fs::read(&out).unwrap(), first);
}

#[test]
fn creates_missing_target_directories() {
    let dir = TempDir::new().unwrap();
    let tpl = write_template(&dir, "t.tpl", "x=${X}");
    let out = dir.path().join("deeply/nested/dir/t.conf");

    render(&tpl, &out, &Bindings::new().with("X", "1")).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), "x=1");
}

#[test]
fn unterminated_placeholder_is_rejected() {
    let dir = TempDir::new().unwrap();
    let tpl = write_template(&dir, "t.tpl", "ok=${A} broken=${B");
    let out = dir.path().join("t.conf");

    let bindings = Bindings::new().with("A", "1").with("B", "2");
    assert!(matches!(
        render(&tpl, &out, &bindings),
        Err(RenderError::UnterminatedPlaceholder { .. })
    ));
    assert!(!out.exists());
}

#[test]
fn bare_dollar_is_literal() {
    let dir = TempDir::new().unwrap();
    let tpl = write_template(&dir, "t.tpl", "path=$HOME and ${REAL}");
    let out = dir.path().join("t.conf");

    render(&tpl, &out, &Bindings::new().with("REAL", "v")).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), "path=$HOME and v");
}

#[test]
fn substituted_values_are_not_rescanned() {
    let dir = TempDir::new().unwrap();
    let tpl = write_template(&dir, "t.tpl", "a=${A}");
    let out = dir.path().join("t.conf");

    // A value that looks like a placeholder stays literal.
    let bindings = Bindings::new().with("A", "${B}").with("B", "nope");
    render(&tpl, &out, &bindings).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), "a=${B}");
}

#[test]
fn duplicate_placeholder_reported_once() {
    let dir = TempDir::new().unwrap();
    let tpl = write_template(&dir, "t.tpl", "${X} ${X} ${X}");
    let out = dir.path().join("t.conf");

    match render(&tpl, &out, &Bindings::new()) {
        Err(RenderError::MissingBindings { names, .. }) => {
            assert_eq!(names, vec!["X"]);
        }
        other => panic!("expected MissingBindings, got {other:?}"),
    }
}

#[test]
fn missing_template_is_io_error() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("t.conf");
    assert!(matches!(
        render(dir.path().join("nope.tpl"), &out, &Bindings::new()),
        Err(RenderError::Io { .. })
    ));
}
