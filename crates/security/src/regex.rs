// Path: crates/security/src/regex.rs
//! The NDN name regular-expression engine.
//!
//! Patterns operate over name components, not characters:
//!
//! - `<ndn>` matches one component whose text matches the inner
//!   expression (a character-level regular expression, full-match).
//! - `<>` matches any single component.
//! - `(...)` groups pieces and captures the matched component span.
//! - `*`, `+`, `?`, `{n}`, `{n,}`, `{n,m}` repeat the preceding atom.
//! - `^` and `$` are accepted for compatibility; matching is always
//!   against the whole name.
//!
//! A successful match can be expanded: `\1`-style references splice the
//! captured component span, and `<comp>` literals contribute fixed
//! components — the mechanism behind the hyper-relation checker.

use ndn_types::error::ConfigError;
use ndn_types::{Component, Name};

enum Atom {
    Any,
    Pattern(::regex::Regex),
    Group { index: usize, pieces: Vec<Piece> },
}

struct Piece {
    atom: Atom,
    min: usize,
    max: Option<usize>,
}

/// A compiled NDN name regular expression.
pub struct NdnRegex {
    pattern: String,
    pieces: Vec<Piece>,
    group_count: usize,
}

impl std::fmt::Debug for NdnRegex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NdnRegex")
            .field("pattern", &self.pattern)
            .finish()
    }
}

/// A successful match, holding the captured component spans.
pub struct NdnRegexMatch<'a> {
    name: &'a Name,
    captures: Vec<Option<(usize, usize)>>,
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    pattern: &'a str,
    group_count: usize,
}

impl Parser<'_> {
    fn error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::Regex {
            pattern: self.pattern.to_string(),
            message: message.into(),
        }
    }

    fn parse_pieces(&mut self, in_group: bool) -> Result<Vec<Piece>, ConfigError> {
        let mut pieces = Vec::new();
        loop {
            match self.chars.peek().copied() {
                None => {
                    if in_group {
                        return Err(self.error("unterminated group"));
                    }
                    return Ok(pieces);
                }
                Some(')') => {
                    if in_group {
                        self.chars.next();
                        return Ok(pieces);
                    }
                    return Err(self.error("unmatched `)`"));
                }
                Some('^') | Some('$') => {
                    // Accepted anchors; matching is whole-name regardless.
                    self.chars.next();
                }
                Some('<') => {
                    self.chars.next();
                    let mut inner = String::new();
                    loop {
                        match self.chars.next() {
                            Some('>') => break,
                            Some(c) => inner.push(c),
                            None => return Err(self.error("unterminated `<`")),
                        }
                    }
                    let atom = if inner.is_empty() {
                        Atom::Any
                    } else {
                        let compiled = ::regex::Regex::new(&format!("^(?:{inner})$"))
                            .map_err(|e| self.error(format!("component expression: {e}")))?;
                        Atom::Pattern(compiled)
                    };
                    let (min, max) = self.parse_repeat()?;
                    pieces.push(Piece { atom, min, max });
                }
                Some('(') => {
                    self.chars.next();
                    self.group_count += 1;
                    let index = self.group_count;
                    let inner = self.parse_pieces(true)?;
                    let (min, max) = self.parse_repeat()?;
                    pieces.push(Piece {
                        atom: Atom::Group {
                            index,
                            pieces: inner,
                        },
                        min,
                        max,
                    });
                }
                Some(other) => {
                    return Err(self.error(format!("unexpected character `{other}`")));
                }
            }
        }
    }

    fn parse_repeat(&mut self) -> Result<(usize, Option<usize>), ConfigError> {
        match self.chars.peek().copied() {
            Some('*') => {
                self.chars.next();
                Ok((0, None))
            }
            Some('+') => {
                self.chars.next();
                Ok((1, None))
            }
            Some('?') => {
                self.chars.next();
                Ok((0, Some(1)))
            }
            Some('{') => {
                self.chars.next();
                let mut spec = String::new();
                loop {
                    match self.chars.next() {
                        Some('}') => break,
                        Some(c) => spec.push(c),
                        None => return Err(self.error("unterminated `{`")),
                    }
                }
                let parse_bound = |s: &str| -> Result<usize, ConfigError> {
                    s.trim()
                        .parse::<usize>()
                        .map_err(|_| self.error(format!("invalid repetition `{{{spec}}}`")))
                };
                if let Some((lo, hi)) = spec.split_once(',') {
                    let min = parse_bound(lo)?;
                    let max = if hi.trim().is_empty() {
                        None
                    } else {
                        Some(parse_bound(hi)?)
                    };
                    if let Some(max) = max {
                        if max < min {
                            return Err(self.error(format!("invalid repetition `{{{spec}}}`")));
                        }
                    }
                    Ok((min, max))
                } else {
                    let n = parse_bound(&spec)?;
                    Ok((n, Some(n)))
                }
            }
            _ => Ok((1, Some(1))),
        }
    }
}

fn component_text(component: &Component) -> String {
    String::from_utf8_lossy(component.value()).into_owned()
}

type Captures = Vec<Option<(usize, usize)>>;

fn seq_match(
    pieces: &[Piece],
    comps: &[Component],
    pos: usize,
    caps: &mut Captures,
    cont: &mut dyn FnMut(usize, &mut Captures) -> bool,
) -> bool {
    match pieces.split_first() {
        None => cont(pos, caps),
        Some((piece, rest)) => repeat_match(piece, comps, pos, 0, caps, &mut |end, caps| {
            seq_match(rest, comps, end, caps, cont)
        }),
    }
}

fn repeat_match(
    piece: &Piece,
    comps: &[Component],
    pos: usize,
    count: usize,
    caps: &mut Captures,
    cont: &mut dyn FnMut(usize, &mut Captures) -> bool,
) -> bool {
    // Greedy: attempt one more iteration before yielding to the rest.
    if piece.max.map_or(true, |max| count < max)
        && atom_match(&piece.atom, comps, pos, caps, &mut |end, caps| {
            if end > pos {
                repeat_match(piece, comps, end, count + 1, caps, cont)
            } else {
                // Zero-width match: counts once, cannot make progress.
                count + 1 >= piece.min && cont(end, caps)
            }
        })
    {
        return true;
    }
    count >= piece.min && cont(pos, caps)
}

fn atom_match(
    atom: &Atom,
    comps: &[Component],
    pos: usize,
    caps: &mut Captures,
    cont: &mut dyn FnMut(usize, &mut Captures) -> bool,
) -> bool {
    match atom {
        Atom::Any => match comps.get(pos) {
            Some(_) => cont(pos + 1, caps),
            None => false,
        },
        Atom::Pattern(pattern) => match comps.get(pos) {
            Some(component) if pattern.is_match(&component_text(component)) => {
                cont(pos + 1, caps)
            }
            _ => false,
        },
        Atom::Group { index, pieces } => seq_match(pieces, comps, pos, caps, &mut |end, caps| {
            let saved = caps.get(*index).copied().flatten();
            if let Some(slot) = caps.get_mut(*index) {
                *slot = Some((pos, end));
            }
            if cont(end, caps) {
                true
            } else {
                if let Some(slot) = caps.get_mut(*index) {
                    *slot = saved;
                }
                false
            }
        }),
    }
}

impl NdnRegex {
    /// Compiles a pattern.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let mut parser = Parser {
            chars: pattern.chars().peekable(),
            pattern,
            group_count: 0,
        };
        let pieces = parser.parse_pieces(false)?;
        Ok(Self {
            pattern: pattern.to_string(),
            pieces,
            group_count: parser.group_count,
        })
    }

    /// The source pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// True when the whole of `name` matches.
    pub fn matches(&self, name: &Name) -> bool {
        self.match_name(name).is_some()
    }

    /// Matches the whole of `name`, returning captures on success.
    pub fn match_name<'a>(&self, name: &'a Name) -> Option<NdnRegexMatch<'a>> {
        let comps = name.components();
        let mut caps: Captures = vec![None; self.group_count + 1];
        let matched = seq_match(&self.pieces, comps, 0, &mut caps, &mut |end, _| {
            end == comps.len()
        });
        matched.then_some(NdnRegexMatch {
            name,
            captures: caps,
        })
    }
}

impl NdnRegexMatch<'_> {
    /// The captured span of group `index` (1-based), as a name.
    pub fn group(&self, index: usize) -> Option<Name> {
        let (start, end) = (*self.captures.get(index)?)?;
        Some(self.name.slice(start, end))
    }

    /// Expands an expansion string: `\N` references splice the group's
    /// components, `<comp>` literals contribute fixed components.
    pub fn expand(&self, expansion: &str) -> Result<Name, ConfigError> {
        let error = |message: String| ConfigError::Regex {
            pattern: expansion.to_string(),
            message,
        };
        let mut out = Name::new();
        let mut chars = expansion.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let mut digits = String::new();
                    while chars.peek().is_some_and(|d| d.is_ascii_digit()) {
                        if let Some(d) = chars.next() {
                            digits.push(d);
                        }
                    }
                    let index: usize = digits
                        .parse()
                        .map_err(|_| error("expected group number after `\\`".into()))?;
                    let group = self
                        .group(index)
                        .ok_or_else(|| error(format!("group {index} did not participate")))?;
                    out = out.append_name(&group);
                }
                '<' => {
                    let mut literal = String::new();
                    loop {
                        match chars.next() {
                            Some('>') => break,
                            Some(ch) => literal.push(ch),
                            None => return Err(error("unterminated `<` in expansion".into())),
                        }
                    }
                    out = out.append_str(&literal);
                }
                other if other.is_whitespace() => {}
                other => {
                    return Err(error(format!("unexpected `{other}` in expansion")));
                }
            }
        }
        Ok(out)
    }
}
