/// Escape text for interpolation into HTML content or quoted attributes
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            other => out.push(other),
        }
    }
    out
}

/// `<option>` list with a leading placeholder whose value is empty
pub fn options_html<'a>(placeholder: &str, options: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut html = format!(r#"<option value="">{}</option>"#, escape_html(placeholder));
    for (value, label) in options {
        html.push_str(&format!(
            r#"<option value="{}">{}</option>"#,
            escape_html(value),
            escape_html(label)
        ));
    }
    html
}
