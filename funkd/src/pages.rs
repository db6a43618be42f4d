use std::path::Path;

use funk_api::status::StatusCode;

use crate::proto::http_like::Response;
use crate::store::TemplateStore;

pub const STATIC_SITE_TEMPLATE: &str = "static_site";

const TITLE_PLACEHOLDER: &str = "{{title}}";
const CONTENT_PLACEHOLDER: &str = "{{content}}";

/// Render the `static_site` template for an error status: title is the
/// numeric code, content the (escaped) message. The response carries the
/// status, so the status line gets the matching description.
pub fn build_error(
    templates: &dyn TemplateStore,
    template_root: &Path,
    code: StatusCode,
    message: &str,
) -> Response {
    let template = match templates.read_template(template_root, STATIC_SITE_TEMPLATE) {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(
                root = %template_root.display(),
                "template {STATIC_SITE_TEMPLATE} unavailable, using built-in: {e}"
            );
            DEFAULT_STATIC_SITE.to_string()
        }
    };
    let body = template
        .replace(TITLE_PLACEHOLDER, &code.as_u16().to_string())
        .replace(CONTENT_PLACEHOLDER, &escape_html(message));
    Response::new(code, body.into_bytes()).with_content_type("text/html")
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// Used when the template directory has no static_site.html
static DEFAULT_STATIC_SITE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8" />
  <title>{{title}}</title>
</head>
<body>
  <h1>{{title}}</h1>
  <p>{{content}}</p>
</body>
</html>
"#;
