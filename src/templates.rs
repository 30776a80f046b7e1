//! Embedded HTML templates and the escaping needed to fill them.

use crate::error::AppError;
use crate::response::Status;
use rust_embed::RustEmbed;
use std::collections::HashMap;

/// Templates compiled into the binary from `templates/`.
#[derive(RustEmbed)]
#[folder = "templates/"]
struct Assets;

pub const LISTING_TEMPLATE: &str = "listing.html";
pub const ERROR_TEMPLATE: &str = "error.html";

/// Template loader and renderer for the embedded HTML templates
pub struct TemplateEngine {
    templates: HashMap<String, String>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Create a template engine holding every embedded template
    pub fn new() -> Self {
        let mut templates = HashMap::new();
        for name in Assets::iter() {
            if let Some(file) = Assets::get(&name) {
                match String::from_utf8(file.data.into_owned()) {
                    Ok(content) => {
                        templates.insert(name.into_owned(), content);
                    }
                    Err(e) => log::warn!("Skipping non UTF-8 template '{name}': {e}"),
                }
            }
        }
        Self { templates }
    }

    pub fn get(&self, template_name: &str) -> Result<&str, AppError> {
        self.templates
            .get(template_name)
            .map(String::as_str)
            .ok_or_else(|| AppError::Template(format!("Template '{template_name}' not found")))
    }

    /// Render a template with variables in the format {{VARIABLE_NAME}}
    pub fn render(
        &self,
        template_name: &str,
        variables: &HashMap<&str, String>,
    ) -> Result<String, AppError> {
        let mut rendered = self.get(template_name)?.to_string();
        for (key, value) in variables {
            let placeholder = format!("{{{{{key}}}}}");
            rendered = rendered.replace(&placeholder, value);
        }
        Ok(rendered)
    }

    /// The fixed page that directory rows are appended to.
    pub fn listing_shell(&self) -> Result<&str, AppError> {
        self.get(LISTING_TEMPLATE)
    }

    pub fn render_error_page(&self, status: Status) -> Result<String, AppError> {
        let mut variables = HashMap::new();
        variables.insert("STATUS_CODE", status.code().to_string());
        variables.insert("STATUS_TEXT", status.reason().to_string());
        variables.insert("DESCRIPTION", get_error_description(status).to_string());
        self.render(ERROR_TEMPLATE, &variables)
    }
}

/// Get human-friendly error descriptions
pub fn get_error_description(status: Status) -> &'static str {
    match status {
        Status::Ok => "The request completed successfully.",
        Status::BadRequest => "The request could not be understood due to malformed syntax.",
        Status::NotFound => "The requested file or directory could not be found.",
    }
}

/// Quotes `value` as a JavaScript string literal that is also safe inside a `<script>`
/// element.
pub fn js_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // `</script>` and `<!--` must not appear verbatim.
            '<' | '>' | '&' | '\'' | '\u{2028}' | '\u{2029}' => {
                out.push_str(&format!("\\u{:04x}", c as u32))
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
