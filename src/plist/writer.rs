//! XML rendering for plist documents.
//!
//! Produces the fixed serialized form launchd and `plutil` accept: XML
//! declaration, Apple plist 1.0 DOCTYPE, one top-level dict, two-space
//! indentation, one element per line.

use super::value::Value;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const DOCTYPE: &str = r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#;

/// Render a full plist document from ordered entries.
pub(crate) fn render_document(entries: &[(String, Value)]) -> String {
    let mut out = String::new();
    out.push_str(XML_DECLARATION);
    out.push('\n');
    out.push_str(DOCTYPE);
    out.push('\n');
    out.push_str("<plist version=\"1.0\">\n");
    if entries.is_empty() {
        out.push_str("<dict/>\n");
    } else {
        out.push_str("<dict>\n");
        for (key, value) in entries {
            render_entry(&mut out, 1, key, value);
        }
        out.push_str("</dict>\n");
    }
    out.push_str("</plist>\n");
    out
}

/// Append one `<key>` plus its value's markup at the given depth.
fn render_entry(out: &mut String, depth: usize, key: &str, value: &Value) {
    push_line(out, depth, &format!("<key>{}</key>", escape_xml(key)));
    render_value(out, depth, value);
}

/// Append a value's markup at the given depth, dispatching on its shape.
fn render_value(out: &mut String, depth: usize, value: &Value) {
    match value {
        Value::String(s) => {
            push_line(out, depth, &format!("<string>{}</string>", escape_xml(s)));
        }
        Value::Integer(n) => {
            push_line(out, depth, &format!("<integer>{}</integer>", n));
        }
        Value::StringArray(items) => {
            if items.is_empty() {
                push_line(out, depth, "<array/>");
                return;
            }
            push_line(out, depth, "<array>");
            for item in items {
                push_line(
                    out,
                    depth + 1,
                    &format!("<string>{}</string>", escape_xml(item)),
                );
            }
            push_line(out, depth, "</array>");
        }
        Value::StringMap(entries) => {
            if entries.is_empty() {
                push_line(out, depth, "<dict/>");
                return;
            }
            push_line(out, depth, "<dict>");
            for (key, item) in entries {
                push_line(out, depth + 1, &format!("<key>{}</key>", escape_xml(key)));
                push_line(
                    out,
                    depth + 1,
                    &format!("<string>{}</string>", escape_xml(item)),
                );
            }
            push_line(out, depth, "</dict>");
        }
        Value::IntegerMapArray(maps) => {
            if maps.is_empty() {
                push_line(out, depth, "<array/>");
                return;
            }
            push_line(out, depth, "<array>");
            for map in maps {
                if map.is_empty() {
                    // a schedule with no constrained fields fires every minute
                    push_line(out, depth + 1, "<dict/>");
                    continue;
                }
                push_line(out, depth + 1, "<dict>");
                for (key, n) in map {
                    push_line(out, depth + 2, &format!("<key>{}</key>", escape_xml(key)));
                    push_line(out, depth + 2, &format!("<integer>{}</integer>", n));
                }
                push_line(out, depth + 1, "</dict>");
            }
            push_line(out, depth, "</array>");
        }
    }
}

/// Escape a string for inclusion in plist XML text.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn push_line(out: &mut String, depth: usize, line: &str) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(line);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(depth: usize, value: &Value) -> String {
        let mut out = String::new();
        render_value(&mut out, depth, value);
        out
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a<b>&\"c'"), "a&lt;b&gt;&amp;&quot;c&apos;");
        assert_eq!(escape_xml("plain"), "plain");
    }

    #[test]
    fn test_escape_xml_ampersand_first() {
        // escaping must not double-escape the ampersands it introduces
        assert_eq!(escape_xml("<&>"), "&lt;&amp;&gt;");
    }

    #[test]
    fn test_render_string() {
        let out = render(0, &Value::String("hello".to_string()));
        assert_eq!(out, "<string>hello</string>\n");
    }

    #[test]
    fn test_render_string_escapes() {
        let out = render(0, &Value::String("a & b".to_string()));
        assert_eq!(out, "<string>a &amp; b</string>\n");
    }

    #[test]
    fn test_render_integer() {
        let out = render(0, &Value::Integer(120));
        assert_eq!(out, "<integer>120</integer>\n");
    }

    #[test]
    fn test_render_string_array() {
        let value = Value::StringArray(vec!["/bin/sh".to_string(), "-c".to_string()]);
        let out = render(1, &value);
        assert_eq!(
            out,
            "  <array>\n    <string>/bin/sh</string>\n    <string>-c</string>\n  </array>\n"
        );
    }

    #[test]
    fn test_render_empty_string_array() {
        let out = render(1, &Value::StringArray(Vec::new()));
        assert_eq!(out, "  <array/>\n");
    }

    #[test]
    fn test_render_string_map() {
        let value = Value::StringMap(vec![("PATH".to_string(), "/usr/bin".to_string())]);
        let out = render(1, &value);
        assert_eq!(
            out,
            "  <dict>\n    <key>PATH</key>\n    <string>/usr/bin</string>\n  </dict>\n"
        );
    }

    #[test]
    fn test_render_empty_string_map() {
        let out = render(1, &Value::StringMap(Vec::new()));
        assert_eq!(out, "  <dict/>\n");
    }

    #[test]
    fn test_render_integer_map_array() {
        let value = Value::IntegerMapArray(vec![vec![
            ("Minute".to_string(), 5),
            ("Hour".to_string(), 0),
        ]]);
        let out = render(1, &value);
        let expected = "  <array>\n    <dict>\n      <key>Minute</key>\n      \
                        <integer>5</integer>\n      <key>Hour</key>\n      \
                        <integer>0</integer>\n    </dict>\n  </array>\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_render_integer_map_array_with_empty_map() {
        let value = Value::IntegerMapArray(vec![Vec::new()]);
        let out = render(1, &value);
        assert_eq!(out, "  <array>\n    <dict/>\n  </array>\n");
    }

    #[test]
    fn test_render_document_frame() {
        let entries = vec![("Label".to_string(), Value::String("x.agent".to_string()))];
        let out = render_document(&entries);
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                        <!DOCTYPE plist PUBLIC \"-//Apple//DTD PLIST 1.0//EN\" \"http://www.apple.com/DTDs/PropertyList-1.0.dtd\">\n\
                        <plist version=\"1.0\">\n\
                        <dict>\n  <key>Label</key>\n  <string>x.agent</string>\n</dict>\n\
                        </plist>\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_render_empty_document() {
        let out = render_document(&[]);
        assert!(out.contains("<dict/>\n"));
        assert!(out.ends_with("</plist>\n"));
    }
}
