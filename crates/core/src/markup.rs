//! Escaping and the light markdown-to-HTML pass applied to narrative text.

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Removes a Markdown fence wrapping the whole text (```` ```markdown ... ``` ````).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let mut inner = trimmed;
    if let Some(after_first) = inner.split_once('\n').map(|(_, rest)| rest) {
        inner = after_first;
    } else {
        return "";
    }
    if let Some(end) = inner.rfind("```") {
        inner = &inner[..end];
    }
    inner.trim()
}

/// Converts model output to a small HTML fragment: escaped text, `**bold**`, bullet
/// lists from `* ` / `- ` lines, paragraphs split on blank lines and `<br>` elsewhere.
pub fn narrative_to_html(text: &str) -> String {
    let body = strip_code_fence(text);
    let mut out = String::new();

    for block in split_paragraphs(body) {
        let lines: Vec<&str> = block.lines().map(str::trim_end).collect();
        let mut i = 0;
        let mut paragraph: Vec<String> = Vec::new();

        while i < lines.len() {
            if let Some(item) = bullet(lines[i]) {
                flush_paragraph(&mut out, &mut paragraph);
                out.push_str("<ul>");
                let mut current = Some(item);
                while let Some(item) = current {
                    out.push_str("<li>");
                    out.push_str(&inline(item));
                    out.push_str("</li>");
                    i += 1;
                    current = lines.get(i).copied().and_then(bullet);
                }
                out.push_str("</ul>");
            } else {
                paragraph.push(inline(lines[i].trim()));
                i += 1;
            }
        }
        flush_paragraph(&mut out, &mut paragraph);
    }

    out
}

fn split_paragraphs(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn flush_paragraph(out: &mut String, paragraph: &mut Vec<String>) {
    if paragraph.is_empty() {
        return;
    }
    out.push_str("<p>");
    out.push_str(&paragraph.join("<br>"));
    out.push_str("</p>");
    paragraph.clear();
}

fn bullet(line: &str) -> Option<&str> {
    let t = line.trim_start();
    t.strip_prefix("* ")
        .or_else(|| t.strip_prefix("- "))
        .map(str::trim)
}

fn inline(text: &str) -> String {
    let escaped = escape_html(text);
    let mut out = String::with_capacity(escaped.len());
    let mut rest = escaped.as_str();
    loop {
        let Some(start) = rest.find("**") else {
            out.push_str(rest);
            break;
        };
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str("<strong>");
        out.push_str(&after[..end]);
        out.push_str("</strong>");
        rest = &after[end + 2..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_before_transforming() {
        assert_eq!(
            narrative_to_html("<script>alert('x')</script>"),
            "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn bold_lists_and_paragraphs() {
        let text = "**Resumo**: boa geração de valor.\nSegunda linha.\n\n* EVA positivo\n- upside de **20%**\n\nFim.";
        assert_eq!(
            narrative_to_html(text),
            "<p><strong>Resumo</strong>: boa geração de valor.<br>Segunda linha.</p>\
             <ul><li>EVA positivo</li><li>upside de <strong>20%</strong></li></ul>\
             <p>Fim.</p>"
        );
    }

    #[test]
    fn unmatched_bold_marker_is_left_alone() {
        assert_eq!(narrative_to_html("a ** b"), "<p>a ** b</p>");
    }

    #[test]
    fn strips_wrapping_fence() {
        assert_eq!(strip_code_fence("```markdown\nhello\n```"), "hello");
        assert_eq!(strip_code_fence("  plain  "), "plain");
        assert_eq!(narrative_to_html("```\nhi\n```"), "<p>hi</p>");
    }

    #[test]
    fn empty_text_renders_nothing() {
        assert_eq!(narrative_to_html("   \n\n"), "");
    }
}
