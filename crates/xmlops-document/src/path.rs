//! A small subset of XPath 1.0 used to address nodes.
//!
//! Supported forms:
//!
//! - `Name`, `A/B` (relative, child axis)
//! - `/A/B` (absolute, child axis)
//! - `//A`, `/A//B`, `A//B` (descendant axis)
//! - `*` as a name test
//! - `Name[Child='value']` or `Name[Child="value"]` (child text equality)
//!
//! Absolute paths are evaluated from the document node; relative paths from
//! the context node they are applied to. Results are in document order and
//! contain each node once.

use std::fmt;
use std::str::FromStr;

use crate::error::PathError;
use crate::tree::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    Name(String),
    Any,
}

impl NameTest {
    fn matches(&self, document: &Document, id: NodeId) -> bool {
        match (self, document.name(id)) {
            (NameTest::Any, Some(_)) => true,
            (NameTest::Name(expected), Some(name)) => expected == name,
            (_, None) => false,
        }
    }
}

/// `[Child='value']`: some child element called `child` has exactly this text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub child: String,
    pub value: String,
}

impl Predicate {
    fn matches(&self, document: &Document, id: NodeId) -> bool {
        document.children(id).iter().any(|child| {
            document.name(*child) == Some(self.child.as_str())
                && document.inner_text(*child) == self.value
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    pub test: NameTest,
    pub predicate: Option<Predicate>,
}

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

impl PathExpr {
    pub fn parse(expr: &str) -> Result<Self, PathError> {
        Parser::new(expr).parse()
    }

    /// Evaluates the expression against `context`.
    pub fn evaluate(&self, document: &Document, context: NodeId) -> Vec<NodeId> {
        let mut current = vec![if self.absolute {
            document.document_node()
        } else {
            context
        }];

        for step in &self.steps {
            let mut next: Vec<NodeId> = Vec::new();
            for node in &current {
                let candidates: Vec<NodeId> = match step.axis {
                    Axis::Child => document.children(*node).to_vec(),
                    Axis::Descendant => document.descendants(*node),
                };
                for candidate in candidates {
                    if step.test.matches(document, candidate)
                        && step
                            .predicate
                            .as_ref()
                            .is_none_or(|p| p.matches(document, candidate))
                        && !next.contains(&candidate)
                    {
                        next.push(candidate);
                    }
                }
            }
            if next.len() > 1 {
                sort_document_order(document, &mut next);
            }
            current = next;
        }
        current
    }
}

fn sort_document_order(document: &Document, nodes: &mut [NodeId]) {
    let order: Vec<NodeId> = document.descendants(document.document_node());
    nodes.sort_by_key(|id| order.iter().position(|n| n == id).unwrap_or(usize::MAX));
}

impl FromStr for PathExpr {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, step) in self.steps.iter().enumerate() {
            match step.axis {
                Axis::Descendant => f.write_str("//")?,
                Axis::Child if index > 0 || self.absolute => f.write_str("/")?,
                Axis::Child => {}
            }
            match &step.test {
                NameTest::Name(name) => f.write_str(name)?,
                NameTest::Any => f.write_str("*")?,
            }
            if let Some(predicate) = &step.predicate {
                write!(f, "[{}='{}']", predicate.child, predicate.value)?;
            }
        }
        Ok(())
    }
}

struct Parser<'a> {
    expr: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(expr: &'a str) -> Self {
        Self {
            expr,
            chars: expr.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<PathExpr, PathError> {
        if self.expr.trim().is_empty() {
            return Err(PathError::Empty);
        }
        self.skip_whitespace();

        let absolute = self.peek() == Some('/');
        let mut steps = Vec::new();
        let mut first = true;

        loop {
            let axis = if self.eat_str("//") {
                Axis::Descendant
            } else if self.eat('/') {
                Axis::Child
            } else if first {
                Axis::Child
            } else {
                break;
            };
            first = false;

            let test = self.name_test()?;
            let predicate = if self.eat('[') {
                Some(self.predicate()?)
            } else {
                None
            };
            steps.push(Step {
                axis,
                test,
                predicate,
            });
            self.skip_whitespace();
        }

        if let Some(found) = self.peek() {
            return Err(self.unexpected(found));
        }
        Ok(PathExpr { absolute, steps })
    }

    fn name_test(&mut self) -> Result<NameTest, PathError> {
        if self.eat('*') {
            return Ok(NameTest::Any);
        }
        self.name().map(NameTest::Name)
    }

    fn name(&mut self) -> Result<String, PathError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let valid = if self.pos == start {
                c.is_alphabetic() || c == '_'
            } else {
                c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
            };
            if !valid {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(PathError::ExpectedName {
                expr: self.expr.to_string(),
                position: self.pos,
            });
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn predicate(&mut self) -> Result<Predicate, PathError> {
        self.skip_whitespace();
        let child = self.name()?;
        self.skip_whitespace();
        if !self.eat('=') {
            return Err(match self.peek() {
                Some(found) => self.unexpected(found),
                None => self.unterminated(),
            });
        }
        self.skip_whitespace();
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            Some(found) => return Err(self.unexpected(found)),
            None => return Err(self.unterminated()),
        };
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(|c| c != quote) {
            self.pos += 1;
        }
        if self.peek().is_none() {
            return Err(self.unterminated());
        }
        let value: String = self.chars[start..self.pos].iter().collect();
        self.pos += 1;
        self.skip_whitespace();
        if !self.eat(']') {
            return Err(match self.peek() {
                Some(found) => self.unexpected(found),
                None => self.unterminated(),
            });
        }
        Ok(Predicate { child, value })
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        let len = s.chars().count();
        let matches = self.chars.len() >= self.pos + len
            && self.chars[self.pos..self.pos + len].iter().copied().eq(s.chars());
        if matches {
            self.pos += len;
        }
        matches
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn unexpected(&self, found: char) -> PathError {
        PathError::Unexpected {
            expr: self.expr.to_string(),
            position: self.pos,
            found,
        }
    }

    fn unterminated(&self) -> PathError {
        PathError::UnterminatedPredicate {
            expr: self.expr.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;

    const USERS: &str = "<Users>\
        <User><Id>1</Id><Name>Ann</Name></User>\
        <User><Id>2</Id><Name>Bob</Name></User>\
        <Group><User><Id>3</Id><Name>Cid</Name></User></Group>\
        </Users>";

    #[test]
    fn test_parse_descendant_with_predicate() -> Result<(), PathError> {
        let path = PathExpr::parse("//Users//User[Id='1']")?;
        assert!(path.absolute);
        assert_eq!(path.steps.len(), 2);
        assert_eq!(path.steps[1].axis, Axis::Descendant);
        assert_eq!(
            path.steps[1].predicate,
            Some(Predicate {
                child: "Id".to_string(),
                value: "1".to_string()
            })
        );
        assert_eq!(path.to_string(), "//Users//User[Id='1']");
        Ok(())
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(PathExpr::parse("  "), Err(PathError::Empty));
        assert!(matches!(
            PathExpr::parse("/A/"),
            Err(PathError::ExpectedName { .. })
        ));
        assert!(matches!(
            PathExpr::parse("A[Id='1'"),
            Err(PathError::UnterminatedPredicate { .. })
        ));
        assert!(matches!(
            PathExpr::parse("A B"),
            Err(PathError::Unexpected { found: 'B', .. })
        ));
    }

    #[test]
    fn test_evaluate_child_and_descendant_axes() -> Result<(), ParseError> {
        let document = Document::parse(USERS)?;
        assert_eq!(document.select("/Users/User").map(|n| n.len()), Ok(2));
        assert_eq!(document.select("//User").map(|n| n.len()), Ok(3));
        assert_eq!(document.select("//Users//User").map(|n| n.len()), Ok(3));
        assert_eq!(document.select("Users").map(|n| n.len()), Ok(1));
        assert_eq!(document.select("/Users/*").map(|n| n.len()), Ok(3));
        Ok(())
    }

    #[test]
    fn test_evaluate_predicate_by_child_text() -> Result<(), ParseError> {
        let document = Document::parse(USERS)?;
        let found = document
            .select_single("//Users//User[Name=\"Cid\"]")
            .ok()
            .flatten()
            .map(|n| n.inner_text());
        assert_eq!(found.as_deref(), Some("3Cid"));
        let missing = document.select("//User[Id='9']").map(|n| n.len());
        assert_eq!(missing, Ok(0));
        Ok(())
    }

    #[test]
    fn test_relative_path_from_context() -> Result<(), ParseError> {
        let document = Document::parse(USERS)?;
        let root = document.root().ok_or(ParseError::NoRoot)?;
        let names: Vec<String> = root
            .select("User/Name")
            .unwrap_or_default()
            .into_iter()
            .map(|n| n.inner_text())
            .collect();
        assert_eq!(names, vec!["Ann", "Bob"]);
        Ok(())
    }
}
