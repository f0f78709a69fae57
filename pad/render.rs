/// Template renderer for the sketchpad page.
///
/// The page is a single HTML template (`pad/assets/pad.html`) with
/// placeholder tokens like `{{TOKEN}}`, embedded at compile time so the
/// binary works from any directory. Callers fill the tokens they know about
/// through a closure; leftovers are blanked.

const TEMPLATE: &str = include_str!("assets/pad.html");

/// Renders the page.
///
/// - `canvas_size`:  backing buffer side length, injected into the script
/// - `stroke_width`: stroke width in CSS pixels for the local preview
/// - `fill`:         closure that fills page-specific placeholders
pub fn render_page<F>(canvas_size: u32, stroke_width: f32, fill: F) -> String
where
    F: FnOnce(String) -> String,
{
    let mut html = TEMPLATE.to_owned();

    html = html.replace("{{CANVAS_SIZE}}",  &canvas_size.to_string());
    html = html.replace("{{STROKE_WIDTH}}", &stroke_width.to_string());

    html = fill(html);

    blank_remaining(html)
}

/// Replaces any `{{TOKEN}}` that wasn't already substituted with an empty
/// string.
fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        if let Some(end) = html[start..].find("}}") {
            let abs_end = start + end + 2;
            html.replace_range(start..abs_end, "");
        } else {
            break;
        }
    }
    html
}

/// Escapes the five HTML-significant characters.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&'  => out.push_str("&amp;"),
            '<'  => out.push_str("&lt;"),
            '>'  => out.push_str("&gt;"),
            '"'  => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c    => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfilled_tokens_are_blanked() {
        assert_eq!(blank_remaining("a{{X}}b{{Y_Z}}c".into()), "abc");
        assert_eq!(blank_remaining("open {{ never closed".into()), "open {{ never closed");
    }

    #[test]
    fn page_has_no_raw_tokens() {
        let html = render_page(280, 12.0, |t| t);
        assert!(!html.contains("{{"));
        assert!(html.contains("280"));
    }

    #[test]
    fn escape_covers_markup() {
        assert_eq!(html_escape(r#"<b a="1">&'"#), "&lt;b a=&quot;1&quot;&gt;&amp;&#39;");
    }
}
