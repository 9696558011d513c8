//! Filter conditions of the form `attr OP literal`, as found between the brackets of a query path
//! segment such as `users[@name='Alice']` or `products[price>1000]`.
//!
//! Equality operators always compare textual representations, so `[n=1.0]` does not match a
//! number which renders as `1`. Ordering operators compare numerically when both sides read as
//! numbers, and fall back to comparing text otherwise.
use std::cmp::Ordering;
use std::fmt::Display;

use crate::errors::ParserResult;
use crate::{path_error, JsonValue};

/// Characters which may make up an operator
const OPERATOR_CHARS: &str = "=!<>";

/// The comparison operators understood within a predicate
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Operator {
    /// Look up an operator from its symbol
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Operator::Eq),
            "!=" => Some(Operator::Ne),
            ">" => Some(Operator::Gt),
            ">=" => Some(Operator::Ge),
            "<" => Some(Operator::Lt),
            "<=" => Some(Operator::Le),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
        }
    }

    /// Check whether an ordering between the left and right hand sides satisfies the operator
    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ne => ordering != Ordering::Equal,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Ge => ordering != Ordering::Less,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Le => ordering != Ordering::Greater,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The left hand side of a predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// The entry being filtered, written as `.` or left out altogether
    SelfValue,
    /// A field of the entry being filtered, written as `@name` or just `name`
    Field(String),
}

impl Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::SelfValue => write!(f, "."),
            Operand::Field(name) => write!(f, "@{}", name),
        }
    }
}

/// A single parsed filter condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub operand: Operand,
    pub operator: Operator,
    /// The literal with any surrounding quotes removed
    pub literal: String,
}

impl Predicate {
    /// Parse the text found between a pair of brackets. Failures are reported as
    /// [crate::Error::InvalidPath] against the condition text
    pub fn parse(condition: &str) -> ParserResult<Predicate> {
        let text = condition.trim();

        let (operand, rest) = if let Some(rest) = text.strip_prefix('@') {
            let (name, rest) = split_word(rest);
            if name.is_empty() {
                return path_error!(condition, "missing attribute name after '@'");
            }
            (Operand::Field(name.to_string()), rest)
        } else if let Some(rest) = text.strip_prefix('.') {
            (Operand::SelfValue, rest)
        } else {
            match split_word(text) {
                ("", rest) => (Operand::SelfValue, rest),
                (name, rest) => (Operand::Field(name.to_string()), rest),
            }
        };

        let rest = rest.trim_start();
        let symbol_length = rest
            .find(|c: char| !OPERATOR_CHARS.contains(c))
            .unwrap_or(rest.len());
        let (symbol, rest) = rest.split_at(symbol_length);
        if symbol.is_empty() {
            return path_error!(condition, "expected one of = != > >= < <=");
        }
        let Some(operator) = Operator::from_symbol(symbol) else {
            return path_error!(condition, format!("unknown operator '{}'", symbol));
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return path_error!(condition, "missing value after operator");
        }
        let literal = rest.trim_matches(|c: char| c == '\'' || c == '"');

        Ok(Predicate {
            operand,
            operator,
            literal: literal.to_string(),
        })
    }

    /// Test an entry against the predicate. An entry which doesn't carry the named field never
    /// matches, whatever the operator
    pub fn matches(&self, entry: &JsonValue) -> bool {
        let subject = match &self.operand {
            Operand::SelfValue => entry,
            Operand::Field(name) => match entry.get(name) {
                Some(value) => value,
                None => return false,
            },
        };
        let text = subject.text();
        match self.operator {
            Operator::Eq => text == self.literal.as_str(),
            Operator::Ne => text != self.literal.as_str(),
            ordered => ordered.accepts(compare(&text, &self.literal)),
        }
    }
}

/// Numeric comparison when both sides read as numbers, text comparison otherwise
fn compare(lhs: &str, rhs: &str) -> Ordering {
    let numeric = match (lhs.parse::<f64>(), rhs.parse::<f64>()) {
        (Ok(l), Ok(r)) => l.partial_cmp(&r),
        _ => None,
    };
    numeric.unwrap_or_else(|| lhs.cmp(rhs))
}

/// Split off a leading run of word characters
fn split_word(text: &str) -> (&str, &str) {
    let end = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    text.split_at(end)
}

impl Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.literal.parse::<f64>().is_ok() {
            write!(f, "{}{}{}", self.operand, self.operator, self.literal)
        } else {
            write!(f, "{}{}'{}'", self.operand, self.operator, self.literal)
        }
    }
}
