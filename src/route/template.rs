use std::collections::BTreeSet;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::form_urlencoded;

use super::RouteError;
use crate::history::Location;
use crate::stack::Params;

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// Param name the `*` wildcard captures into
pub const WILDCARD_PARAM: &str = "_";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard,
}

/// A compiled route pattern such as `/articles/:articleId`.
///
/// `:name` captures one path segment, `*` captures the remainder of the
/// path. A trailing slash is optional when matching and always present when
/// filling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    pattern: String,
    segments: Vec<Segment>,
}

impl RouteTemplate {
    pub fn new(pattern: &str) -> Self {
        let segments = split_segments(pattern)
            .map(|segment| {
                if segment == "*" {
                    Segment::Wildcard
                } else if let Some(name) = segment.strip_prefix(':') {
                    Segment::Param(name.to_string())
                } else {
                    Segment::Literal(segment.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Build a path from params. Params not consumed by the pattern are
    /// appended as a query string.
    pub fn fill(&self, params: &Params) -> Result<String, RouteError> {
        let mut pathname = String::new();
        let mut consumed = BTreeSet::new();

        for segment in &self.segments {
            pathname.push('/');
            match segment {
                Segment::Literal(literal) => pathname.push_str(literal),
                Segment::Param(name) => {
                    let value = params.get(name).ok_or_else(|| RouteError::MissingParam {
                        pattern: self.pattern.clone(),
                        param: name.clone(),
                    })?;
                    pathname.extend(utf8_percent_encode(value, SEGMENT));
                    consumed.insert(name.as_str());
                }
                Segment::Wildcard => {
                    if let Some(rest) = params.get(WILDCARD_PARAM) {
                        pathname.push_str(rest.trim_matches('/'));
                    }
                    consumed.insert(WILDCARD_PARAM);
                }
            }
        }

        if !pathname.ends_with('/') {
            pathname.push('/');
        }

        let mut query = form_urlencoded::Serializer::new(String::new());
        let mut has_query = false;
        for (key, value) in params {
            if !consumed.contains(key.as_str()) {
                query.append_pair(key, value);
                has_query = true;
            }
        }

        if has_query {
            Ok(format!("{}?{}", pathname, query.finish()))
        } else {
            Ok(pathname)
        }
    }

    /// Match a path against the pattern. Path captures take precedence over
    /// query params of the same name.
    pub fn parse(&self, path: &str) -> Option<Params> {
        let location = Location::parse(path);
        let parts: Vec<&str> = split_segments(&location.pathname).collect();

        let mut captured = Params::new();
        let mut idx = 0;
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => {
                    if parts.get(idx) != Some(&literal.as_str()) {
                        return None;
                    }
                    idx += 1;
                }
                Segment::Param(name) => {
                    let part = parts.get(idx)?;
                    let value = percent_decode_str(part).decode_utf8_lossy();
                    captured.insert(name.clone(), value.into_owned());
                    idx += 1;
                }
                Segment::Wildcard => {
                    let rest = parts.get(idx..).unwrap_or_default().join("/");
                    captured.insert(WILDCARD_PARAM.to_string(), rest);
                    idx = parts.len();
                }
            }
        }
        if idx != parts.len() {
            return None;
        }

        let query = location.search.trim_start_matches('?');
        let mut params: Params = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        params.extend(captured);
        Some(params)
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}
