//! Built-in equation evaluator
//!
//! Equation text is parsed once with nom into an [`Expression`]: the original
//! text, a [`Node`] tree and the set of free identifiers. Function names are
//! resolved and their argument counts checked at parse time, so a parsed
//! expression can only fail to evaluate on an unbound identifier or a
//! division by zero.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary ('^' unary)?
//! primary := call | identifier | number | '(' sum ')'
//! ```

use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{char, multispace0, satisfy},
    combinator::{map, recognize, value},
    error::{Error as NomError, ErrorKind},
    multi::{many0, separated_list0},
    number::complete::double,
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

/// Failure to parse or evaluate an expression
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Syntax error at column {column}: {message}")]
    Syntax { column: usize, message: String },

    #[error("Unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("{function}() takes {expected} argument(s), {found} given")]
    ArgumentCount {
        function: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("No value bound to '{name}'")]
    UnboundIdentifier { name: String },

    #[error("Division by zero")]
    DivisionByZero,
}

type ExprResult<T> = Result<T, ExpressionError>;

/// Binary operators, in no particular order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operator {
    fn apply(self, lhs: f64, rhs: f64) -> ExprResult<f64> {
        match self {
            Operator::Add => Ok(lhs + rhs),
            Operator::Subtract => Ok(lhs - rhs),
            Operator::Multiply => Ok(lhs * rhs),
            Operator::Divide if rhs == 0.0 => Err(ExpressionError::DivisionByZero),
            Operator::Divide => Ok(lhs / rhs),
            Operator::Power => Ok(lhs.powf(rhs)),
        }
    }
}

/// Built-in functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log10,
    Sqrt,
    Abs,
    Min,
    Max,
}

impl Function {
    /// Function with the given name, `log` being the natural logarithm
    pub fn lookup(name: &str) -> Option<Self> {
        let function = match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "sinh" => Function::Sinh,
            "cosh" => Function::Cosh,
            "tanh" => Function::Tanh,
            "exp" => Function::Exp,
            "ln" | "log" => Function::Ln,
            "log10" => Function::Log10,
            "sqrt" => Function::Sqrt,
            "abs" => Function::Abs,
            "min" => Function::Min,
            "max" => Function::Max,
            _ => return None,
        };
        Some(function)
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Sinh => "sinh",
            Function::Cosh => "cosh",
            Function::Tanh => "tanh",
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Log10 => "log10",
            Function::Sqrt => "sqrt",
            Function::Abs => "abs",
            Function::Min => "min",
            Function::Max => "max",
        }
    }

    fn is_variadic(self) -> bool {
        matches!(self, Function::Min | Function::Max)
    }

    fn check_arity(self, found: usize) -> ExprResult<()> {
        let (valid, expected) = if self.is_variadic() {
            (found >= 2, "at least 2")
        } else {
            (found == 1, "1")
        };
        if valid {
            Ok(())
        } else {
            Err(ExpressionError::ArgumentCount {
                function: self.name(),
                expected,
                found,
            })
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        let unary: fn(f64) -> f64 = match self {
            Function::Min => return args.iter().copied().fold(f64::INFINITY, f64::min),
            Function::Max => return args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Function::Sin => f64::sin,
            Function::Cos => f64::cos,
            Function::Tan => f64::tan,
            Function::Asin => f64::asin,
            Function::Acos => f64::acos,
            Function::Atan => f64::atan,
            Function::Sinh => f64::sinh,
            Function::Cosh => f64::cosh,
            Function::Tanh => f64::tanh,
            Function::Exp => f64::exp,
            Function::Ln => f64::ln,
            Function::Log10 => f64::log10,
            Function::Sqrt => f64::sqrt,
            Function::Abs => f64::abs,
        };
        unary(args[0])
    }
}

/// Node of a parsed expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(f64),
    Identifier(String),
    Negate(Box<Node>),
    Operation(Operator, Box<Node>, Box<Node>),
    Call(Function, Vec<Node>),
}

impl Node {
    fn operation(op: Operator, lhs: Node, rhs: Node) -> Self {
        Node::Operation(op, Box::new(lhs), Box::new(rhs))
    }

    fn evaluate<B: Bindings + ?Sized>(&self, bindings: &B) -> ExprResult<f64> {
        match self {
            Node::Constant(value) => Ok(*value),
            Node::Identifier(name) => {
                bindings
                    .value(name)
                    .ok_or_else(|| ExpressionError::UnboundIdentifier { name: name.clone() })
            }
            Node::Negate(inner) => Ok(-inner.evaluate(bindings)?),
            Node::Operation(op, lhs, rhs) => op.apply(lhs.evaluate(bindings)?, rhs.evaluate(bindings)?),
            Node::Call(function, args) => {
                let values = args
                    .iter()
                    .map(|arg| arg.evaluate(bindings))
                    .collect::<ExprResult<Vec<f64>>>()?;
                Ok(function.apply(&values))
            }
        }
    }

    /// Visit every node depth first, stopping at the first error
    fn visit<F>(&self, f: &mut F) -> ExprResult<()>
    where
        F: FnMut(&Node) -> ExprResult<()>,
    {
        f(self)?;
        match self {
            Node::Constant(_) | Node::Identifier(_) => Ok(()),
            Node::Negate(inner) => inner.visit(f),
            Node::Operation(_, lhs, rhs) => {
                lhs.visit(f)?;
                rhs.visit(f)
            }
            Node::Call(_, args) => args.iter().try_for_each(|arg| arg.visit(f)),
        }
    }
}

/// Source of identifier values during evaluation
pub trait Bindings {
    /// Value bound to `name`, if any
    fn value(&self, name: &str) -> Option<f64>;
}

impl Bindings for HashMap<String, f64> {
    fn value(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl Bindings for BTreeMap<String, f64> {
    fn value(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

/// A parsed equation.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use datafit::equation::Expression;
///
/// let expr = Expression::parse("A*exp(-x/tau) + c").unwrap();
/// let names: Vec<&str> = expr.identifiers().iter().map(String::as_str).collect();
/// assert_eq!(names, vec!["A", "c", "tau", "x"]);
///
/// let bindings: HashMap<String, f64> =
///     [("A", 2.0), ("tau", 1.0), ("c", 0.5), ("x", 0.0)]
///         .iter()
///         .map(|(k, v)| (k.to_string(), *v))
///         .collect();
/// assert_eq!(expr.evaluate(&bindings).unwrap(), 2.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    text: String,
    root: Node,
    identifiers: BTreeSet<String>,
}

impl Expression {
    /// Parse equation text
    pub fn parse(text: &str) -> ExprResult<Self> {
        if text.trim().is_empty() {
            return Err(ExpressionError::Syntax {
                column: 1,
                message: "empty expression".to_string(),
            });
        }

        let root = match sum(text) {
            Ok((rest, root)) if rest.trim().is_empty() => root,
            Ok((rest, _)) => {
                return Err(ExpressionError::Syntax {
                    column: column(text, rest),
                    message: format!("unexpected '{}'", rest.trim()),
                })
            }
            Err(nom::Err::Failure(err)) if err.code == ErrorKind::Verify => {
                return Err(ExpressionError::UnknownFunction {
                    name: leading_identifier(err.input).to_string(),
                })
            }
            Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => {
                return Err(ExpressionError::Syntax {
                    column: column(text, err.input),
                    message: "incomplete expression".to_string(),
                })
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(ExpressionError::Syntax {
                    column: text.len() + 1,
                    message: "incomplete expression".to_string(),
                })
            }
        };

        let mut identifiers = BTreeSet::new();
        root.visit(&mut |node: &Node| -> ExprResult<()> {
            match node {
                Node::Identifier(name) => {
                    identifiers.insert(name.clone());
                }
                Node::Call(function, args) => function.check_arity(args.len())?,
                _ => {}
            }
            Ok(())
        })?;

        Ok(Self {
            text: text.trim().to_string(),
            root,
            identifiers,
        })
    }

    /// Evaluate with every identifier taken from `bindings`
    pub fn evaluate<B: Bindings + ?Sized>(&self, bindings: &B) -> ExprResult<f64> {
        self.root.evaluate(bindings)
    }

    /// Free identifiers, sorted
    pub fn identifiers(&self) -> &BTreeSet<String> {
        &self.identifiers
    }

    /// Equation text as given, trimmed
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Root of the expression tree
    pub fn root(&self) -> &Node {
        &self.root
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// One-based column of `rest` within `text`
fn column(text: &str, rest: &str) -> usize {
    text.len() - rest.len() + 1
}

fn leading_identifier(input: &str) -> &str {
    let end = input
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(input.len());
    &input[..end]
}

/*
 * Grammar
 */

fn symbol<'a>(c: char) -> impl Parser<&'a str, Output = char, Error = NomError<&'a str>> {
    delimited(multispace0, char(c), multispace0)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

/// A function call; unknown names fail with `ErrorKind::Verify` at the name
fn call(input: &str) -> IResult<&str, Node> {
    let (rest, (name, args)) = pair(
        identifier,
        delimited(symbol('('), separated_list0(symbol(','), sum), symbol(')')),
    )
    .parse(input)?;

    match Function::lookup(name) {
        Some(function) => Ok((rest, Node::Call(function, args))),
        None => Err(nom::Err::Failure(NomError::new(input, ErrorKind::Verify))),
    }
}

fn primary(input: &str) -> IResult<&str, Node> {
    preceded(
        multispace0,
        alt((
            call,
            map(identifier, |name: &str| Node::Identifier(name.to_string())),
            map(double, Node::Constant),
            delimited(symbol('('), sum, symbol(')')),
        )),
    )
    .parse(input)
}

/// Exponentiation binds tighter than negation on its left and is right-associative
fn power(input: &str) -> IResult<&str, Node> {
    let (input, base) = primary(input)?;
    match preceded(symbol('^'), unary).parse(input) {
        Ok((rest, exponent)) => Ok((rest, Node::operation(Operator::Power, base, exponent))),
        Err(nom::Err::Error(_)) => Ok((input, base)),
        Err(err) => Err(err),
    }
}

fn unary(input: &str) -> IResult<&str, Node> {
    alt((
        map(preceded(symbol('-'), unary), |node: Node| Node::Negate(Box::new(node))),
        preceded(symbol('+'), unary),
        power,
    ))
    .parse(input)
}

fn fold_left(first: Node, rest: Vec<(Operator, Node)>) -> Node {
    rest.into_iter()
        .fold(first, |lhs, (op, rhs)| Node::operation(op, lhs, rhs))
}

fn product(input: &str) -> IResult<&str, Node> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(pair(
        alt((
            value(Operator::Multiply, symbol('*')),
            value(Operator::Divide, symbol('/')),
        )),
        unary,
    ))
    .parse(input)?;
    Ok((input, fold_left(first, rest)))
}

fn sum(input: &str) -> IResult<&str, Node> {
    let (input, first) = product(input)?;
    let (input, rest) = many0(pair(
        alt((
            value(Operator::Add, symbol('+')),
            value(Operator::Subtract, symbol('-')),
        )),
        product,
    ))
    .parse(input)?;
    Ok((input, fold_left(first, rest)))
}
