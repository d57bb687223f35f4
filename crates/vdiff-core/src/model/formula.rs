use serde::{Deserialize, Serialize};
use std::fmt;

/// A propositional formula over named features
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formula {
    True,
    False,
    Literal(String),
    Not(Box<Formula>),
    And(Vec<Formula>),
    Or(Vec<Formula>),
}

impl Formula {
    pub fn literal(name: impl Into<String>) -> Self {
        Formula::Literal(name.into())
    }

    /// Negation that folds constants and double negation
    pub fn negate(&self) -> Formula {
        match self {
            Formula::True => Formula::False,
            Formula::False => Formula::True,
            Formula::Not(inner) => (**inner).clone(),
            other => Formula::Not(Box::new(other.clone())),
        }
    }

    /// Conjunction; empty is `True`, a single clause is returned as is
    pub fn and_all(mut clauses: Vec<Formula>) -> Formula {
        match clauses.len() {
            0 => Formula::True,
            1 => clauses.remove(0),
            _ => Formula::And(clauses),
        }
    }

    /// Disjunction; empty is `False`, a single clause is returned as is
    pub fn or_all(mut clauses: Vec<Formula>) -> Formula {
        match clauses.len() {
            0 => Formula::False,
            1 => clauses.remove(0),
            _ => Formula::Or(clauses),
        }
    }

    /// Names of all literals, in order of first occurrence
    pub fn literals(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_literals(&mut out);
        out
    }

    fn collect_literals<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Formula::True | Formula::False => {}
            Formula::Literal(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Formula::Not(inner) => inner.collect_literals(out),
            Formula::And(cs) | Formula::Or(cs) => {
                for c in cs {
                    c.collect_literals(out);
                }
            }
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, Formula::And(_) | Formula::Or(_))
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_compound() {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }

    fn fmt_joined(f: &mut fmt::Formatter<'_>, clauses: &[Formula], op: &str) -> fmt::Result {
        for (i, c) in clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", op)?;
            }
            c.fmt_operand(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::True => write!(f, "True"),
            Formula::False => write!(f, "False"),
            Formula::Literal(name) => write!(f, "{}", name),
            Formula::Not(inner) => {
                write!(f, "!")?;
                inner.fmt_operand(f)
            }
            Formula::And(cs) => Formula::fmt_joined(f, cs, "&"),
            Formula::Or(cs) => Formula::fmt_joined(f, cs, "|"),
        }
    }
}
