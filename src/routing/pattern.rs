//! Route templates compiled to path matchers.
//!
//! # Responsibilities
//! - Parse templates such as `/users/:id`, `/files/*` or `/v:major(\d+)`
//! - Compile them once into an anchored, case-insensitive regex
//! - Test concrete paths and extract captured segments in template order
//!
//! # Design Decisions
//! - A `/` or `.` right before a parameter belongs to the parameter, so an
//!   optional parameter takes its separator with it
//! - A trailing slash on the request path is always tolerated
//! - Custom parameter patterns may not contain capture groups of their own;
//!   capture positions must line up with parameter positions

use regex::Regex;
use thiserror::Error;

/// Default pattern for a segment: anything up to the next delimiter.
const DEFAULT_DELIMITER: char = '/';

/// Errors raised while compiling a route template.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("missing parameter name at offset {0}")]
    MissingName(usize),
    #[error("unbalanced group starting at offset {0}")]
    UnbalancedGroup(usize),
    #[error("empty group at offset {0}")]
    EmptyGroup(usize),
    #[error("custom pattern for '{0}' must not contain capture groups")]
    NestedCapture(String),
    #[error("invalid route regex: {0}")]
    Regex(#[from] regex::Error),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Literal(String),
    Param(ParamToken),
}

#[derive(Debug, Clone, PartialEq)]
struct ParamToken {
    name: String,
    prefix: Option<char>,
    pattern: String,
    optional: bool,
    repeat: bool,
}

/// A compiled route template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    keys: Vec<String>,
    regex: Regex,
}

impl PathPattern {
    /// Compile a route template.
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        let tokens = tokenize(template)?;
        let keys: Vec<String> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Param(p) => Some(p.name.clone()),
                Token::Literal(_) => None,
            })
            .collect();

        let regex = Regex::new(&build_regex(&tokens))?;

        // Every parameter must own exactly one capture slot.
        if regex.captures_len() - 1 != keys.len() {
            let offender = tokens
                .iter()
                .find_map(|t| match t {
                    Token::Param(p) if Regex::new(&p.pattern).map(|r| r.captures_len() > 1).unwrap_or(false) => {
                        Some(p.name.clone())
                    }
                    _ => None,
                })
                .unwrap_or_default();
            return Err(PatternError::NestedCapture(offender));
        }

        Ok(Self {
            template: template.to_string(),
            keys,
            regex,
        })
    }

    /// The template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parameter names in template order. Unnamed parameters are numbered.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// The generated regex source.
    pub fn as_regex(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns true if `path` satisfies the template.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Captured segments for `path`, or `None` when the path does not match.
    ///
    /// The whole-match group is dropped. An optional segment that did not
    /// participate in the match is reported as `None`.
    pub fn captures(&self, path: &str) -> Option<PathParams> {
        let caps = self.regex.captures(path)?;
        let params = self
            .keys
            .iter()
            .enumerate()
            .map(|(i, name)| PathParam {
                name: name.clone(),
                value: caps.get(i + 1).map(|m| m.as_str().to_string()),
            })
            .collect();
        Some(PathParams(params))
    }
}

/// One captured path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParam {
    pub name: String,
    pub value: Option<String>,
}

/// Captured path segments in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<PathParam>);

impl PathParams {
    /// Value at position `index`, if captured.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|p| p.value.as_deref())
    }

    /// Value of the parameter called `name`, if captured.
    pub fn by_name(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| p.value.as_deref())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathParam> {
        self.0.iter()
    }

    /// Positional values, in capture order.
    pub fn values(&self) -> Vec<Option<&str>> {
        self.0.iter().map(|p| p.value.as_deref()).collect()
    }
}

impl IntoIterator for PathParams {
    type Item = PathParam;
    type IntoIter = std::vec::IntoIter<PathParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn tokenize(template: &str) -> Result<Vec<Token>, PatternError> {
    let chars: Vec<char> = template.chars().collect();
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut unnamed = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                if let Some(&escaped) = chars.get(i + 1) {
                    literal.push(escaped);
                }
                i += 2;
            }
            ':' | '(' | '*' => {
                let start = i;
                let mut name = String::new();
                let mut pattern = None;

                if c == ':' {
                    i += 1;
                    while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                        name.push(chars[i]);
                        i += 1;
                    }
                    if name.is_empty() {
                        return Err(PatternError::MissingName(start));
                    }
                    if chars.get(i) == Some(&'(') {
                        let (group, end) = read_group(&chars, i)?;
                        pattern = Some(group);
                        i = end;
                    }
                } else if c == '(' {
                    let (group, end) = read_group(&chars, i)?;
                    pattern = Some(group);
                    i = end;
                } else {
                    pattern = Some(".*".to_string());
                    i += 1;
                }

                if name.is_empty() {
                    name = unnamed.to_string();
                    unnamed += 1;
                }

                // The bare asterisk takes no modifier.
                let (optional, repeat) = if c == '*' {
                    (false, false)
                } else {
                    match chars.get(i) {
                        Some('?') => {
                            i += 1;
                            (true, false)
                        }
                        Some('*') => {
                            i += 1;
                            (true, true)
                        }
                        Some('+') => {
                            i += 1;
                            (false, true)
                        }
                        _ => (false, false),
                    }
                };

                let prefix = match literal.chars().last() {
                    Some(p @ ('/' | '.')) => {
                        literal.pop();
                        Some(p)
                    }
                    _ => None,
                };
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }

                let delimiter = prefix.unwrap_or(DEFAULT_DELIMITER);
                let pattern = pattern
                    .unwrap_or_else(|| format!("[^{}]+?", regex::escape(&delimiter.to_string())));

                tokens.push(Token::Param(ParamToken {
                    name,
                    prefix,
                    pattern,
                    optional,
                    repeat,
                }));
            }
            _ => {
                literal.push(c);
                i += 1;
            }
        }
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}

/// Reads a parenthesised group starting at `open`. Returns the inner text and
/// the index just past the closing paren.
fn read_group(chars: &[char], open: usize) -> Result<(String, usize), PatternError> {
    let mut depth = 0usize;
    let mut inner = String::new();
    let mut i = open;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                inner.push(c);
                if let Some(&next) = chars.get(i + 1) {
                    inner.push(next);
                }
                i += 2;
                continue;
            }
            '(' => {
                depth += 1;
                if depth > 1 {
                    inner.push(c);
                }
            }
            ')' => {
                depth -= 1;
                if depth == 0 {
                    if inner.is_empty() {
                        return Err(PatternError::EmptyGroup(open));
                    }
                    return Ok((inner, i + 1));
                }
                inner.push(c);
            }
            _ => inner.push(c),
        }
        i += 1;
    }

    Err(PatternError::UnbalancedGroup(open))
}

fn build_regex(tokens: &[Token]) -> String {
    let mut route = String::new();

    for token in tokens {
        match token {
            Token::Literal(text) => route.push_str(&regex::escape(text)),
            Token::Param(param) => {
                let prefix = param
                    .prefix
                    .map(|p| regex::escape(&p.to_string()))
                    .unwrap_or_default();
                let mut capture = format!("(?:{})", param.pattern);
                if param.repeat {
                    capture = format!("{capture}(?:{prefix}{capture})*");
                }
                let segment = if param.optional {
                    format!("(?:{prefix}({capture}))?")
                } else {
                    format!("{prefix}({capture})")
                };
                route.push_str(&segment);
            }
        }
    }

    // Non-strict: tolerate one trailing slash.
    if route.ends_with('/') {
        route.pop();
    }
    format!("(?i)^{route}/?$")
}
