//! Static test page served at the root path.

use axum::body::Bytes;

const TEMPLATE: &str = include_str!("../../static/index.html");
const PATH_PLACEHOLDER: &str = "__UPGRADE_PATH__";

/// Render the page once, pointing its client at `upgrade_path`.
pub fn render(upgrade_path: &str) -> Bytes {
    Bytes::from(TEMPLATE.replace(PATH_PLACEHOLDER, &escape_js_string(upgrade_path)))
}

/// Escape text for a double-quoted JS string inside a `<script>` element.
fn escape_js_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}
