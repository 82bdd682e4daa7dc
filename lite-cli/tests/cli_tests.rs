use std::fs;
use std::path::PathBuf;

fn write_template(name: &str, source: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../target/lite-cli-tests")
        .join(std::process::id().to_string());
    fs::create_dir_all(&dir).expect("create test dir");
    let path = dir.join(name);
    fs::write(&path, source).expect("write template");
    path
}

#[test]
fn tokenize_lists_bindings() {
    let input = write_template("list.html", "<ul title={}><li>{}</li></ul>");
    let out = lite_cli::tokenize_cmd(&input).expect("tokenize");
    assert!(out.contains("0: attribute title [\"\", \"\"] at [0]"), "{out}");
    assert!(out.contains("1: node at [0, 0, 0]"), "{out}");
    assert!(out.contains("2 value slot(s)"), "{out}");
}

#[test]
fn render_fills_values_in_order() {
    let input = write_template("greet.html", "<p class=\"{}\">Hello {}</p>");
    let values = vec!["big".to_string(), "<world>".to_string()];
    let out = lite_cli::render_cmd(&input, &values, false).expect("render");
    assert_eq!(out, "<p class=\"big\">Hello &lt;world&gt;</p>");
}

#[test]
fn render_keeps_markers_on_request() {
    let input = write_template("marked.html", "<b>{}</b>");
    let out = lite_cli::render_cmd(&input, &["x".to_string()], true).expect("render");
    assert_eq!(out, "<!----><b><!---->x<!----></b><!---->");
}

#[test]
fn render_reports_value_count() {
    let input = write_template("two.html", "<i>{}{}</i>");
    let err = lite_cli::render_cmd(&input, &["only".to_string()], false).unwrap_err();
    assert!(format!("{err:#}").contains("2 value slots but 1 values"), "{err:#}");
}

#[test]
fn missing_file_has_context() {
    let err = lite_cli::tokenize_cmd(&PathBuf::from("/nonexistent/t.html")).unwrap_err();
    assert!(err.to_string().starts_with("failed to read"));
}

#[test]
fn render_keeps_authored_comments() {
    let input = write_template("commented.html", "<p><!---->{}<!--note--></p>");
    let out = lite_cli::render_cmd(&input, &["x".to_string()], false).expect("render");
    assert_eq!(out, "<p><!---->x<!--note--></p>");
}
