use dirserve::response::Status;
use dirserve::templates::{TemplateEngine, ERROR_TEMPLATE, LISTING_TEMPLATE};
use std::collections::HashMap;

/// Test that templates are properly embedded and can render without filesystem access
#[test]
fn test_embedded_templates_functionality() {
    let engine = TemplateEngine::new();

    let shell = engine.listing_shell().expect("listing shell should be embedded");
    assert!(shell.contains("function start(location)"));
    assert!(shell.contains("function addRow(name, url, isdir, size, date)"));
    assert!(shell.contains("id=\"tbody\""));

    let mut variables = HashMap::new();
    variables.insert("STATUS_CODE", "404".to_string());
    variables.insert("STATUS_TEXT", "Not Found".to_string());
    variables.insert(
        "DESCRIPTION",
        "The requested resource was not found.".to_string(),
    );

    let error_html = engine.render(ERROR_TEMPLATE, &variables).unwrap();
    assert!(error_html.contains("404"), "Should contain the status code");
    assert!(error_html.contains("Not Found"), "Should contain the status text");
    assert!(error_html.contains("The requested resource was not found."));
    assert!(!error_html.contains("{{"), "All placeholders should be filled");
}

#[test]
fn test_listing_shell_is_left_open_for_rows() {
    let engine = TemplateEngine::new();
    let shell = engine.get(LISTING_TEMPLATE).unwrap();
    assert!(!shell.contains("</body>"), "rows are appended after the shell");
}

#[test]
fn test_error_page_rendering() {
    let engine = TemplateEngine::new();

    let html = engine.render_error_page(Status::BadRequest).unwrap();
    assert!(html.contains("400"));
    assert!(html.contains("Bad Request"));
    assert!(html.contains("malformed syntax"));
}

#[test]
fn test_missing_template_is_an_error() {
    let engine = TemplateEngine::new();
    assert!(engine.get("nonexistent.html").is_err());
    assert!(engine.render("nonexistent.html", &HashMap::new()).is_err());
}
