//! `Accept` header negotiation.
//!
//! # Responsibilities
//! - Resolve a candidate type (`json`, `text`, `text/html`) to a media type
//! - Decide whether the request's `Accept` header admits it
//!
//! # Design Decisions
//! - Extensions are resolved through `mime_guess`; unknown ones never match
//! - The most specific matching range decides, then the highest `q`, then
//!   the earliest range
//! - A missing `Accept` header admits everything

/// A parsed media type or media range.
#[derive(Debug, Clone, PartialEq)]
struct MediaRange {
    kind: String,
    subtype: String,
    params: Vec<(String, String)>,
    q: f32,
}

impl MediaRange {
    fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split(';');
        let essence = parts.next()?.trim();
        let (kind, subtype) = essence.split_once('/')?;
        let (kind, subtype) = (kind.trim(), subtype.trim());
        if kind.is_empty() || subtype.is_empty() {
            return None;
        }

        let mut q = 1.0;
        let mut params = Vec::new();
        for param in parts {
            let Some((key, val)) = param.split_once('=') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let val = val.trim().trim_matches('"');
            if key == "q" {
                q = val.parse().unwrap_or(1.0);
            } else {
                params.push((key, val.to_string()));
            }
        }

        Some(Self {
            kind: kind.to_string(),
            subtype: subtype.to_string(),
            params,
            q,
        })
    }

    fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Specificity of this range against `candidate`, `None` if it does not apply.
    fn specificity(&self, candidate: &MediaRange) -> Option<u8> {
        let mut s = 0;

        if self.kind.eq_ignore_ascii_case(&candidate.kind) {
            s |= 4;
        } else if self.kind != "*" {
            return None;
        }

        if self.subtype.eq_ignore_ascii_case(&candidate.subtype) {
            s |= 2;
        } else if self.subtype != "*" {
            return None;
        }

        if !self.params.is_empty() {
            let all_match = self.params.iter().all(|(key, val)| {
                val == "*"
                    || candidate
                        .param(key)
                        .is_some_and(|c| c.eq_ignore_ascii_case(val))
            });
            if !all_match {
                return None;
            }
            s |= 1;
        }

        Some(s)
    }
}

/// Resolve a candidate to a full media type.
///
/// Anything containing `/` is taken as is, otherwise it is looked up as a
/// file extension.
pub fn normalize_type(candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.contains('/') {
        return MediaRange::parse(candidate).map(|_| candidate.to_string());
    }
    mime_guess::from_ext(candidate.trim_start_matches('.'))
        .first()
        .map(|m| m.essence_str().to_string())
}

/// Test `candidate` against an `Accept` header value.
///
/// Returns the resolved media type when acceptable. Without an `Accept`
/// header every candidate is acceptable, even one that does not resolve; it
/// is then returned as given.
pub fn accepts(accept_header: Option<&str>, candidate: &str) -> Option<String> {
    let header = match accept_header.map(str::trim) {
        None | Some("") => {
            return Some(normalize_type(candidate).unwrap_or_else(|| candidate.trim().to_string()))
        }
        Some(h) => h,
    };

    let resolved = normalize_type(candidate)?;

    let target = MediaRange::parse(&resolved)?;

    // (specificity, q, position); higher specificity, then higher q, then earlier wins.
    let mut best: Option<(u8, f32, usize)> = None;
    for (index, range) in header.split(',').filter_map(MediaRange::parse).enumerate() {
        let Some(s) = range.specificity(&target) else {
            continue;
        };
        let better = match best {
            None => true,
            Some((bs, bq, _)) => s > bs || (s == bs && range.q > bq),
        };
        if better {
            best = Some((s, range.q, index));
        }
    }

    match best {
        Some((_, q, _)) if q > 0.0 => Some(resolved),
        _ => None,
    }
}
