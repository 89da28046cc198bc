// Path: crates/security/src/policy/config/parser.rs
//! Parser for the declarative validator configuration.
//!
//! The document is a simplified info-style tree: `key value` pairs and
//! `key { ... }` sections, with `;` or `#` starting a comment that runs
//! to the end of the line. Values may be double-quoted to include
//! whitespace.

use ndn_types::error::ConfigError;

/// One node of the parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigNode {
    /// The key.
    pub key: String,
    /// The scalar value, when present.
    pub value: Option<String>,
    /// Child nodes, when the key opens a section.
    pub children: Vec<ConfigNode>,
}

impl ConfigNode {
    /// First child with the given key.
    pub fn child(&self, key: &str) -> Option<&ConfigNode> {
        self.children.iter().find(|node| node.key == key)
    }

    /// All children with the given key.
    pub fn children_named<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a ConfigNode> {
        self.children.iter().filter(move |node| node.key == key)
    }

    /// The scalar value of the first child with the given key.
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.child(key).and_then(|node| node.value.as_deref())
    }

    /// The scalar value of a required child.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.value_of(key).ok_or_else(|| {
            ConfigError::Invalid(format!("section `{}` lacks required `{key}`", self.key))
        })
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    OpenBrace,
    CloseBrace,
}

fn tokenize(text: &str) -> Result<Vec<(usize, Token)>, ConfigError> {
    let mut tokens = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        let line_no = line_idx + 1;
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                ';' | '#' => break,
                '{' => tokens.push((line_no, Token::OpenBrace)),
                '}' => tokens.push((line_no, Token::CloseBrace)),
                '"' => {
                    let mut word = String::new();
                    loop {
                        match chars.next() {
                            Some('"') => break,
                            Some(ch) => word.push(ch),
                            None => {
                                return Err(ConfigError::Syntax {
                                    line: line_no,
                                    message: "unterminated string".into(),
                                })
                            }
                        }
                    }
                    tokens.push((line_no, Token::Word(word)));
                }
                c if c.is_whitespace() => {}
                c => {
                    let mut word = String::from(c);
                    while chars
                        .peek()
                        .is_some_and(|ch| !ch.is_whitespace() && !matches!(ch, '{' | '}' | ';' | '#'))
                    {
                        if let Some(ch) = chars.next() {
                            word.push(ch);
                        }
                    }
                    tokens.push((line_no, Token::Word(word)));
                }
            }
        }
    }
    Ok(tokens)
}

fn parse_children(
    tokens: &[(usize, Token)],
    mut index: usize,
    nested: bool,
) -> Result<(Vec<ConfigNode>, usize), ConfigError> {
    let mut nodes = Vec::new();
    while index < tokens.len() {
        match &tokens[index] {
            (_, Token::CloseBrace) => {
                if nested {
                    return Ok((nodes, index + 1));
                }
                return Err(ConfigError::Syntax {
                    line: tokens[index].0,
                    message: "unmatched `}`".into(),
                });
            }
            (line, Token::OpenBrace) => {
                return Err(ConfigError::Syntax {
                    line: *line,
                    message: "`{` without a key".into(),
                });
            }
            (line, Token::Word(key)) => {
                let key = key.clone();
                index += 1;
                let mut value = None;
                if let Some((_, Token::Word(word))) = tokens.get(index) {
                    value = Some(word.clone());
                    index += 1;
                }
                let mut children = Vec::new();
                if let Some((_, Token::OpenBrace)) = tokens.get(index) {
                    let (parsed, next) = parse_children(tokens, index + 1, true)?;
                    children = parsed;
                    index = next;
                }
                if value.is_none() && children.is_empty() {
                    return Err(ConfigError::Syntax {
                        line: *line,
                        message: format!("key `{key}` has neither value nor section"),
                    });
                }
                nodes.push(ConfigNode {
                    key,
                    value,
                    children,
                });
            }
        }
    }
    if nested {
        return Err(ConfigError::Syntax {
            line: tokens.last().map(|t| t.0).unwrap_or(0),
            message: "unterminated section".into(),
        });
    }
    Ok((nodes, index))
}

/// Parses a configuration document into its top-level nodes.
pub fn parse_document(text: &str) -> Result<Vec<ConfigNode>, ConfigError> {
    let tokens = tokenize(text)?;
    let (nodes, _) = parse_children(&tokens, 0, false)?;
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rules_and_anchors() {
        let text = r#"
            rule
            {
              id "hierarchical rule"
              for data
              checker
              {
                type hierarchical
                sig-type ecdsa-sha256
              }
            }
            trust-anchor
            {
              type file
              file-name anchor.ndncert  ; inline comment
            }
        "#;
        let nodes = parse_document(text).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].key, "rule");
        assert_eq!(nodes[0].value_of("id"), Some("hierarchical rule"));
        assert_eq!(nodes[0].value_of("for"), Some("data"));
        let checker = nodes[0].child("checker").unwrap();
        assert_eq!(checker.value_of("type"), Some("hierarchical"));
        assert_eq!(nodes[1].value_of("file-name"), Some("anchor.ndncert"));
    }

    #[test]
    fn comments_and_hash_comments() {
        let nodes = parse_document("# full line\nkey value ; tail\n").unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].value.as_deref(), Some("value"));
    }

    #[test]
    fn unbalanced_braces_fail() {
        assert!(parse_document("rule {").is_err());
        assert!(parse_document("}").is_err());
        assert!(parse_document("dangling").is_err());
    }
}
