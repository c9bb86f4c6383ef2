//! Target-path templates.
//!
//! A pattern like `{creation:%Y}/{creation:%m}/{creation:%Y-%m-%d_%H:%M:%S}{suffix}` is
//! compiled once into segments. Placeholders:
//!
//! | name | alias | renders |
//! |---|---|---|
//! | `creation[:fmt]` | | creation time through strftime `fmt` |
//! | `prefix` | `file_prefix` | text before the date in the stem |
//! | `suffix` | `file_suffix` | text after the date, without conflict marker |
//! | `type` | `file_content` | `IMG` or `MOV` |
//! | `hash` | | 16 hex digest characters |
//!
//! `{{` and `}}` produce literal braces.
//!
//! The file name part (after the last `/`) must render something for a stem with
//! no prefix and no suffix. `prefix` and `suffix` are empty for most files, so a
//! file part built only from them, such as `{creation:%Y}/{suffix}`, is rejected.

use chrono::NaiveDateTime;
use chrono::format::{Item, StrftimeItems};

use crate::errors::SortError;
use crate::hash::{ContentDigest, digest_bytes};
use crate::media::ContentType;

const DEFAULT_CREATION_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Creation(String),
    Prefix,
    Suffix,
    ContentType,
    Hash,
}

/// Per-file values substituted into a template.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub creation: NaiveDateTime,
    pub prefix: &'a str,
    pub suffix: &'a str,
    pub content_type: ContentType,
    pub digest: Option<ContentDigest>,
    /// Replaces ':' inside rendered creation values
    pub time_separator: Option<char>,
}

/// Compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl NameTemplate {
    pub fn parse(pattern: &str) -> Result<Self, SortError> {
        let invalid = |reason: String| SortError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(invalid("unmatched '}'".into())),
                '{' => {
                    let mut body = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') => return Err(invalid("nested '{' in placeholder".into())),
                            Some(ch) => body.push(ch),
                            None => return Err(invalid("unterminated placeholder".into())),
                        }
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(placeholder(&body).map_err(invalid)?);
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        let template = NameTemplate {
            source: pattern.to_string(),
            segments,
        };
        let (dir, file) = template.sample_split(None);
        if dir.is_none() {
            return Err(invalid("pattern needs a '/' between directory and file name".into()));
        }
        if file.is_empty() {
            return Err(invalid("file name part of the pattern renders empty".into()));
        }
        Ok(template)
    }

    /// The pattern text this template was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True when rendering needs the file's content digest.
    pub fn needs_digest(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Hash))
    }

    pub fn render(&self, ctx: &RenderContext<'_>) -> String {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Literal(text) => out.push_str(text),
                Segment::Creation(fmt) => {
                    let rendered = ctx.creation.format(fmt).to_string();
                    match ctx.time_separator {
                        Some(sep) if sep != ':' => out.push_str(&rendered.replace(':', &sep.to_string())),
                        _ => out.push_str(&rendered),
                    }
                }
                Segment::Prefix => out.push_str(ctx.prefix),
                Segment::Suffix => out.push_str(ctx.suffix),
                Segment::ContentType => out.push_str(ctx.content_type.token()),
                Segment::Hash => {
                    if let Some(d) = ctx.digest {
                        out.push_str(&d.to_hex());
                    }
                }
            }
        }
        out
    }

    /// File-name part rendered for a representative file; used for startup checks.
    pub fn sample_file_name(&self, time_separator: Option<char>) -> String {
        self.sample_split(time_separator).1
    }

    fn sample_split(&self, time_separator: Option<char>) -> (Option<String>, String) {
        let creation = NaiveDateTime::default();
        let rendered = self.render(&RenderContext {
            creation,
            prefix: "",
            suffix: "",
            content_type: ContentType::Image,
            digest: Some(digest_bytes(b"")),
            time_separator,
        });
        match rendered.rsplit_once('/') {
            Some((dir, file)) => (Some(dir.to_string()), file.to_string()),
            None => (None, rendered),
        }
    }
}

fn placeholder(body: &str) -> Result<Segment, String> {
    let (name, format) = match body.split_once(':') {
        Some((n, f)) => (n.trim(), Some(f)),
        None => (body.trim(), None),
    };
    let segment = match name {
        "creation" => {
            let fmt = format.unwrap_or(DEFAULT_CREATION_FORMAT);
            if fmt.is_empty() {
                return Err("empty format for {creation}".into());
            }
            if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
                return Err(format!("invalid strftime format '{fmt}'"));
            }
            return Ok(Segment::Creation(fmt.to_string()));
        }
        "prefix" | "file_prefix" => Segment::Prefix,
        "suffix" | "file_suffix" => Segment::Suffix,
        "type" | "file_content" => Segment::ContentType,
        "hash" => Segment::Hash,
        "" => return Err("empty placeholder '{}'".into()),
        other => return Err(format!("unknown placeholder '{{{other}}}'")),
    };
    if format.is_some() {
        return Err(format!("placeholder '{{{name}}}' does not take a format"));
    }
    Ok(segment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PATTERN;
    use chrono::NaiveDate;

    fn ctx(prefix: &'static str, suffix: &'static str) -> RenderContext<'static> {
        RenderContext {
            creation: NaiveDate::from_ymd_opt(2020, 5, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            prefix,
            suffix,
            content_type: ContentType::Video,
            digest: None,
            time_separator: None,
        }
    }

    #[test]
    fn default_pattern_renders_dated_tree() {
        let t = NameTemplate::parse(DEFAULT_PATTERN).unwrap();
        assert_eq!(t.render(&ctx("", "_x")), "2020/05/2020-05-01_10:00:00_x");
        assert!(!t.needs_digest());
    }

    #[test]
    fn aliases_and_escapes() {
        let t = NameTemplate::parse("{{{file_content}}}/{file_prefix}{creation:%d}{file_suffix}").unwrap();
        assert_eq!(t.render(&ctx("a", "b")), "{MOV}/a01b");
    }

    #[test]
    fn bare_creation_uses_default_format() {
        let t = NameTemplate::parse("x/{creation}").unwrap();
        assert_eq!(t.render(&ctx("", "")), "x/2020-05-01 10:00:00");
    }

    #[test]
    fn time_separator_only_touches_creation() {
        let t = NameTemplate::parse("a:b/{creation:%H:%M}").unwrap();
        let mut c = ctx("", "");
        c.time_separator = Some('-');
        assert_eq!(t.render(&c), "a:b/10-00");
        assert_eq!(t.sample_file_name(Some('.')), "00.00");
        assert!(t.sample_file_name(None).contains(':'));
    }

    #[test]
    fn rejects_bad_patterns() {
        for bad in [
            "{creation:%Y}/{camera}",
            "{creation:%Y}/{creation:%Q}",
            "{creation:%Y}/{type:upper}",
            "{creation:%Y}{suffix}",
            "{creation:%Y}/",
            "{creation:%Y}/{oops",
            "{creation:%Y}/x}",
        ] {
            assert!(NameTemplate::parse(bad).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn file_part_of_only_prefix_or_suffix_is_rejected() {
        for pattern in ["{creation:%Y}/{suffix}", "{creation:%Y}/{file_prefix}{file_suffix}"] {
            let err = NameTemplate::parse(pattern).unwrap_err();
            assert!(err.to_string().contains("renders empty"), "{pattern}: {err}");
        }
        assert!(NameTemplate::parse("{creation:%Y}/x{suffix}").is_ok());
    }

    #[test]
    fn hash_placeholder_needs_digest() {
        let t = NameTemplate::parse("{type}/{hash}").unwrap();
        assert!(t.needs_digest());
    }
}
