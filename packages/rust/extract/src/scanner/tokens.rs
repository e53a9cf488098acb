//! Minimal HTML tokenizer for the listing scanner.
//!
//! Deliberately not a DOM: emits a flat stream of start/end/text events
//! over the raw markup, surfacing only the two attributes the scanner
//! consults (`class` and `href`). Tolerates the malformed markup the
//! archive serves (unterminated tags, stray `<`, unquoted attributes)
//! and never panics on any input.

/// One markup event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An opening tag. Names are lowercased; `class`/`href` are empty
    /// strings when absent.
    Start {
        name: String,
        class: String,
        href: String,
        self_closing: bool,
    },
    /// A closing tag (lowercased name).
    End { name: String },
    /// Character data with entities decoded.
    Text(String),
}

/// Elements that never have content and never grow the tag stack.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// True for HTML void elements (`<br>`, `<img>`, …).
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Streaming tokenizer over a markup string.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    /// When inside `<script>`/`<style>`, the element name whose closing
    /// tag ends the opaque raw-text span.
    raw_text_element: Option<String>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            raw_text_element: None,
        }
    }

    /// Skip an opaque raw-text body (`<script>`/`<style>`) and emit the
    /// closing event. The body itself is dropped; captures must never
    /// accumulate script text.
    fn skip_raw_text(&mut self, name: String) -> Event {
        let rest = &self.input[self.pos..];
        let rest_lower = rest.to_lowercase();
        let close_pat = format!("</{name}");

        // Lowercasing can change byte length for exotic code points, so
        // re-check the boundary before slicing the original input.
        let close = rest_lower
            .find(&close_pat)
            .map(|idx| self.pos + idx)
            .filter(|&after| self.input.is_char_boundary(after));
        match close.and_then(|after| self.input[after..].find('>').map(|gt| after + gt + 1)) {
            Some(end) => self.pos = end,
            None => self.pos = self.input.len(),
        }
        Event::End { name }
    }

    /// Parse a start tag beginning at `self.pos` (which points at `<`).
    fn parse_start_tag(&mut self) -> Event {
        let bytes = self.input.as_bytes();
        let mut i = self.pos + 1;

        let name_start = i;
        while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
            i += 1;
        }
        let name = self.input[name_start..i].to_ascii_lowercase();

        let mut class = String::new();
        let mut href = String::new();
        let mut self_closing = false;

        while i < bytes.len() {
            match bytes[i] {
                b'>' => {
                    i += 1;
                    break;
                }
                b'/' => {
                    // Self-closing only when the slash directly precedes '>'.
                    let mut j = i + 1;
                    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                        j += 1;
                    }
                    if j < bytes.len() && bytes[j] == b'>' {
                        self_closing = true;
                        i = j + 1;
                        break;
                    }
                    i += 1;
                }
                c if c.is_ascii_whitespace() => i += 1,
                _ => {
                    let attr_start = i;
                    while i < bytes.len()
                        && !bytes[i].is_ascii_whitespace()
                        && bytes[i] != b'='
                        && bytes[i] != b'>'
                        && bytes[i] != b'/'
                    {
                        i += 1;
                    }
                    let attr_name = self.input[attr_start..i].to_ascii_lowercase();

                    let mut value = String::new();
                    if i < bytes.len() && bytes[i] == b'=' {
                        i += 1;
                        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                            i += 1;
                        }
                        if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                            let quote = bytes[i];
                            i += 1;
                            let value_start = i;
                            while i < bytes.len() && bytes[i] != quote {
                                i += 1;
                            }
                            value = decode_entities(&self.input[value_start..i]);
                            if i < bytes.len() {
                                i += 1; // past the closing quote
                            }
                        } else {
                            let value_start = i;
                            while i < bytes.len()
                                && !bytes[i].is_ascii_whitespace()
                                && bytes[i] != b'>'
                            {
                                i += 1;
                            }
                            value = decode_entities(&self.input[value_start..i]);
                        }
                    }

                    match attr_name.as_str() {
                        "class" => class = value,
                        "href" => href = value,
                        _ => {}
                    }
                }
            }
        }

        self.pos = i;

        if !self_closing && (name == "script" || name == "style") {
            self.raw_text_element = Some(name.clone());
        }

        Event::Start {
            name,
            class,
            href,
            self_closing,
        }
    }

    /// Parse a closing tag beginning at `self.pos` (which points at `</`).
    fn parse_end_tag(&mut self) -> Option<Event> {
        let bytes = self.input.as_bytes();
        let mut i = self.pos + 2;

        let name_start = i;
        while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
            i += 1;
        }
        let name = self.input[name_start..i].to_ascii_lowercase();

        match self.input[i..].find('>') {
            Some(gt) => self.pos = i + gt + 1,
            None => self.pos = self.input.len(),
        }

        if name.is_empty() {
            None
        } else {
            Some(Event::End { name })
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            if let Some(name) = self.raw_text_element.take() {
                return Some(self.skip_raw_text(name));
            }

            if self.pos >= self.input.len() {
                return None;
            }

            let rest = &self.input[self.pos..];

            if !rest.starts_with('<') {
                let end = rest.find('<').unwrap_or(rest.len());
                let text = &rest[..end];
                self.pos += end;
                return Some(Event::Text(decode_entities(text)));
            }

            if rest.starts_with("<!--") {
                match rest.find("-->") {
                    Some(idx) => self.pos += idx + 3,
                    None => self.pos = self.input.len(),
                }
                continue;
            }

            if rest.starts_with("<!") || rest.starts_with("<?") {
                match rest.find('>') {
                    Some(idx) => self.pos += idx + 1,
                    None => self.pos = self.input.len(),
                }
                continue;
            }

            if rest.starts_with("</") {
                match self.parse_end_tag() {
                    Some(event) => return Some(event),
                    None => continue,
                }
            }

            if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
                return Some(self.parse_start_tag());
            }

            // A lone '<' that opens nothing: treat it and everything up to
            // the next tag as character data.
            let end = rest[1..].find('<').map(|i| i + 1).unwrap_or(rest.len());
            let text = &rest[..end];
            self.pos += end;
            return Some(Event::Text(decode_entities(text)));
        }
    }
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Decode the common named entities plus numeric character references.
/// Unknown entities pass through unchanged.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest[1..]
            .find(';')
            .filter(|&semi| semi > 0 && semi <= 10)
            .and_then(|semi| {
                let entity = &rest[1..semi + 1];
                decode_entity(entity).map(|ch| (ch, semi + 2))
            });

        match decoded {
            Some((ch, advance)) => {
                out.push(ch);
                rest = &rest[advance..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse::<u32>().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Collapse whitespace runs into single spaces and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space && !out.is_empty() {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(html: &str) -> Vec<Event> {
        Tokenizer::new(html).collect()
    }

    #[test]
    fn tokenizes_simple_markup() {
        let got = events(r#"<div class="job-card"><a href="/x">Coach</a></div>"#);
        assert_eq!(
            got,
            vec![
                Event::Start {
                    name: "div".into(),
                    class: "job-card".into(),
                    href: String::new(),
                    self_closing: false,
                },
                Event::Start {
                    name: "a".into(),
                    class: String::new(),
                    href: "/x".into(),
                    self_closing: false,
                },
                Event::Text("Coach".into()),
                Event::End { name: "a".into() },
                Event::End { name: "div".into() },
            ]
        );
    }

    #[test]
    fn lowercases_names_and_handles_unquoted_attrs() {
        let got = events("<DIV CLASS=JobCard HREF=/y>");
        assert_eq!(
            got,
            vec![Event::Start {
                name: "div".into(),
                class: "JobCard".into(),
                href: "/y".into(),
                self_closing: false,
            }]
        );
    }

    #[test]
    fn self_closing_and_void_detection() {
        let got = events("<br/><img src=x.png>");
        assert!(matches!(
            &got[0],
            Event::Start { name, self_closing: true, .. } if name == "br"
        ));
        assert!(matches!(
            &got[1],
            Event::Start { name, self_closing: false, .. } if name == "img"
        ));
        assert!(is_void_element("img"));
        assert!(!is_void_element("a"));
    }

    #[test]
    fn script_body_is_opaque() {
        let got = events("<script>var x = '<div>not a tag</div>';</script><p>after</p>");
        assert_eq!(
            got,
            vec![
                Event::Start {
                    name: "script".into(),
                    class: String::new(),
                    href: String::new(),
                    self_closing: false,
                },
                Event::End {
                    name: "script".into()
                },
                Event::Start {
                    name: "p".into(),
                    class: String::new(),
                    href: String::new(),
                    self_closing: false,
                },
                Event::Text("after".into()),
                Event::End { name: "p".into() },
            ]
        );
    }

    #[test]
    fn comments_and_doctype_are_skipped() {
        let got = events("<!DOCTYPE html><!-- nav starts here --><span>x</span>");
        assert_eq!(got.len(), 3);
        assert!(matches!(&got[0], Event::Start { name, .. } if name == "span"));
    }

    #[test]
    fn entities_decode_in_text_and_href() {
        let got = events(r#"<a href="/jobs?a=1&amp;b=2">Sales &amp; Marketing&#33;</a>"#);
        assert!(matches!(
            &got[0],
            Event::Start { href, .. } if href == "/jobs?a=1&b=2"
        ));
        assert_eq!(got[1], Event::Text("Sales & Marketing!".into()));
    }

    #[test]
    fn unknown_entities_pass_through() {
        let got = events("A &bogus; B &copy C");
        assert_eq!(got, vec![Event::Text("A &bogus; B &copy C".into())]);
    }

    #[test]
    fn stray_angle_bracket_is_text() {
        let got = events("1 < 2 <b>bold</b>");
        assert_eq!(got[0], Event::Text("1 ".into()));
        assert_eq!(got[1], Event::Text("< 2 ".into()));
        assert!(matches!(&got[2], Event::Start { name, .. } if name == "b"));
    }

    #[test]
    fn unterminated_tag_does_not_panic() {
        let got = events("<div class=\"job");
        assert_eq!(got.len(), 1);
        assert!(matches!(&got[0], Event::Start { name, .. } if name == "div"));
    }

    #[test]
    fn normalize_ws_collapses_runs() {
        assert_eq!(normalize_ws("  Ticket \n\t Sales  Rep "), "Ticket Sales Rep");
        assert_eq!(normalize_ws("   "), "");
    }
}
