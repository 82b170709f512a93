use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::content::Content;
use super::message::Message;
use super::node::Node;
use crate::coerce::{compare, BinOp, Scalar};
use crate::errors::AstResult;

/// Opaque handle to a host-native function backing a tool call.
///
/// The tree records it for diagnostics; invocation belongs to the caller
/// that executes tools. It is transparent to equality and skipped by
/// serialization.
#[derive(Clone)]
pub struct NativeFn(Arc<dyn Fn(&[Scalar]) -> AstResult<Scalar> + Send + Sync>);

impl NativeFn {
    pub fn new(f: impl Fn(&[Scalar]) -> AstResult<Scalar> + Send + Sync + 'static) -> Self {
        NativeFn(Arc::new(f))
    }

    pub fn as_fn(&self) -> &(dyn Fn(&[Scalar]) -> AstResult<Scalar> + Send + Sync) {
        self.0.as_ref()
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NativeFn(..)")
    }
}

/// A bare statement: optional memoized result plus the source text it was
/// parsed from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlainStatement {
    result: Option<Scalar>,
    pub ast_text: Option<String>,
}

impl PlainStatement {
    pub fn new(ast_text: Option<String>) -> Self {
        PlainStatement {
            result: None,
            ast_text,
        }
    }

    pub fn result(&self) -> Option<&Scalar> {
        self.result.as_ref()
    }

    /// Memoize the evaluated result. The first write wins.
    pub fn set_result(&mut self, value: Scalar) {
        if self.result.is_none() {
            self.result = Some(value);
        }
    }
}

impl fmt::Display for PlainStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Some(value) => value.fmt(f),
            None => f.write_str("Statement"),
        }
    }
}

/// An unevaluated call description: the name, ordered named arguments, their
/// declared types, and the content gathered as calling context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Ordered `(arg name, value)` pairs.
    pub args: Vec<(String, Scalar)>,
    /// Ordered `(arg name, type name)` pairs, parallel to `args`.
    pub types: Vec<(String, String)>,
    pub context: Content,
    #[serde(skip)]
    pub func: Option<NativeFn>,
    pub ast_text: Option<String>,
    result: Option<Content>,
}

impl FunctionCall {
    pub fn new(
        name: impl Into<String>,
        args: Vec<(String, Scalar)>,
        types: Vec<(String, String)>,
        context: Content,
    ) -> Self {
        FunctionCall {
            name: name.into(),
            args,
            types,
            context,
            func: None,
            ast_text: None,
            result: None,
        }
    }

    pub fn with_func(mut self, func: NativeFn) -> Self {
        self.func = Some(func);
        self
    }

    pub fn with_ast_text(mut self, ast_text: impl Into<String>) -> Self {
        self.ast_text = Some(ast_text.into());
        self
    }

    pub fn result(&self) -> Option<&Content> {
        self.result.as_ref()
    }

    pub fn set_result(&mut self, content: Content) {
        if self.result.is_none() {
            self.result = Some(content);
        }
    }

    /// Render as a call site, e.g. `lookup(ticker, 10)`.
    pub fn to_code_call(&self) -> String {
        let args: Vec<String> = self.args.iter().map(|(_, v)| v.to_string()).collect();
        format!("{}({})", self.name, args.join(", "))
    }

    /// Render as a typed signature, e.g. `lookup(symbol: str, days: int)`.
    pub fn to_definition(&self) -> String {
        let params: Vec<String> = self
            .types
            .iter()
            .map(|(name, ty)| format!("{name}: {ty}"))
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

impl PartialEq for FunctionCall {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.args == other.args
            && self.types == other.types
            && self.context == other.context
            && self.ast_text == other.ast_text
            && self.result == other.result
    }
}

/// An evaluated call result wrapped for arithmetic: the result proxy.
///
/// Operators coerce the wrapped result against the other operand through
/// [`crate::coerce::coerce`] and then apply natively, so a tool that returned
/// `"5"` still adds like a number. Callers needing anything beyond the
/// operator set unwrap with [`FunctionCallMeta::result`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCallMeta {
    pub callsite: String,
    #[serde(skip)]
    pub func: Option<NativeFn>,
    result: Scalar,
    pub lineno: Option<u32>,
}

impl FunctionCallMeta {
    pub fn new(callsite: impl Into<String>, result: impl Into<Scalar>, lineno: Option<u32>) -> Self {
        FunctionCallMeta {
            callsite: callsite.into(),
            func: None,
            result: result.into(),
            lineno,
        }
    }

    pub fn with_func(mut self, func: NativeFn) -> Self {
        self.func = Some(func);
        self
    }

    pub fn result(&self) -> &Scalar {
        &self.result
    }

    pub fn into_result(self) -> Scalar {
        self.result
    }

    fn apply(&self, op: BinOp, other: Scalar) -> AstResult<Scalar> {
        op.apply(self.result.clone(), other)
    }

    fn apply_reflected(&self, op: BinOp, other: Scalar) -> AstResult<Scalar> {
        op.apply(other, self.result.clone())
    }
}

// Callsite, callable, and line number are diagnostics; only the wrapped
// result takes part in equality.
impl PartialEq for FunctionCallMeta {
    fn eq(&self, other: &Self) -> bool {
        self.result == other.result
    }
}

impl<R: Into<Scalar>> Add<R> for &FunctionCallMeta {
    type Output = AstResult<Scalar>;

    fn add(self, rhs: R) -> AstResult<Scalar> {
        self.apply(BinOp::Add, rhs.into())
    }
}

impl<R: Into<Scalar>> Sub<R> for &FunctionCallMeta {
    type Output = AstResult<Scalar>;

    fn sub(self, rhs: R) -> AstResult<Scalar> {
        self.apply(BinOp::Sub, rhs.into())
    }
}

impl<R: Into<Scalar>> Mul<R> for &FunctionCallMeta {
    type Output = AstResult<Scalar>;

    fn mul(self, rhs: R) -> AstResult<Scalar> {
        self.apply(BinOp::Mul, rhs.into())
    }
}

impl<R: Into<Scalar>> Div<R> for &FunctionCallMeta {
    type Output = AstResult<Scalar>;

    fn div(self, rhs: R) -> AstResult<Scalar> {
        self.apply(BinOp::Div, rhs.into())
    }
}

// Reflected arithmetic keeps the reversed operand order through coercion.
impl Add<&FunctionCallMeta> for Scalar {
    type Output = AstResult<Scalar>;

    fn add(self, rhs: &FunctionCallMeta) -> AstResult<Scalar> {
        rhs.apply_reflected(BinOp::Add, self)
    }
}

impl Sub<&FunctionCallMeta> for Scalar {
    type Output = AstResult<Scalar>;

    fn sub(self, rhs: &FunctionCallMeta) -> AstResult<Scalar> {
        rhs.apply_reflected(BinOp::Sub, self)
    }
}

impl Mul<&FunctionCallMeta> for Scalar {
    type Output = AstResult<Scalar>;

    fn mul(self, rhs: &FunctionCallMeta) -> AstResult<Scalar> {
        rhs.apply_reflected(BinOp::Mul, self)
    }
}

impl Div<&FunctionCallMeta> for Scalar {
    type Output = AstResult<Scalar>;

    fn div(self, rhs: &FunctionCallMeta) -> AstResult<Scalar> {
        rhs.apply_reflected(BinOp::Div, self)
    }
}

impl PartialEq<Scalar> for FunctionCallMeta {
    fn eq(&self, other: &Scalar) -> bool {
        matches!(
            compare(self.result.clone(), other.clone()),
            Ok(Some(Ordering::Equal))
        )
    }
}

impl PartialOrd<Scalar> for FunctionCallMeta {
    fn partial_cmp(&self, other: &Scalar) -> Option<Ordering> {
        compare(self.result.clone(), other.clone()).ok().flatten()
    }
}

impl PartialEq<FunctionCallMeta> for Scalar {
    fn eq(&self, other: &FunctionCallMeta) -> bool {
        matches!(
            compare(self.clone(), other.result.clone()),
            Ok(Some(Ordering::Equal))
        )
    }
}

impl PartialOrd<FunctionCallMeta> for Scalar {
    fn partial_cmp(&self, other: &FunctionCallMeta) -> Option<Ordering> {
        compare(self.clone(), other.result.clone()).ok().flatten()
    }
}

impl fmt::Display for FunctionCallMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.result.fmt(f)
    }
}

/// A finished exchange: the conversation that produced a result, and the
/// result itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Answer {
    pub conversation: Vec<Message>,
    pub result: Option<Scalar>,
    pub error: Option<String>,
    pub ast_text: Option<String>,
}

impl Answer {
    pub fn new(conversation: Vec<Message>, result: Option<Scalar>, error: Option<String>) -> Self {
        Answer {
            conversation,
            result,
            error,
            ast_text: None,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Answer({})", display_or_none(&self.result))?;
        writeln!(f, "Error: {}", self.error.as_deref().unwrap_or("None"))?;
        writeln!(f, "  Conversation:")?;
        let lines: Vec<String> = self.conversation.iter().map(|m| m.to_string()).collect();
        f.write_str(&lines.join("\n  "))
    }
}

/// The model could not answer, or answered with an error; carries whatever
/// supporting material was gathered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertainOrError {
    pub error_message: Content,
    pub supporting_conversation: Vec<Node>,
    pub supporting_result: Option<Scalar>,
    pub supporting_error: Option<String>,
}

impl UncertainOrError {
    pub fn new(error_message: Content) -> Self {
        UncertainOrError {
            error_message,
            supporting_conversation: Vec::new(),
            supporting_result: None,
            supporting_error: None,
        }
    }
}

impl fmt::Display for UncertainOrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "UncertainOrError({} {}, {})",
            self.error_message,
            self.supporting_error.as_deref().unwrap_or("None"),
            display_or_none(&self.supporting_result),
        )?;
        writeln!(f, "  Conversation:")?;
        let lines: Vec<String> = self
            .supporting_conversation
            .iter()
            .map(|n| n.to_string())
            .collect();
        f.write_str(&lines.join("\n  "))
    }
}

fn display_or_none(value: &Option<Scalar>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    }
}

/// A non-message computation node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "token", rename_all = "snake_case")]
pub enum Statement {
    #[serde(rename = "statement")]
    Plain(PlainStatement),
    FunctionCall(FunctionCall),
    #[serde(rename = "functioncallmeta")]
    FunctionCallMeta(FunctionCallMeta),
    Answer(Answer),
    UncertainOrError(UncertainOrError),
}

impl Statement {
    /// Stable discriminator string, used in traces and persisted forms.
    pub fn token(&self) -> &'static str {
        match self {
            Statement::Plain(_) => "statement",
            Statement::FunctionCall(_) => "function_call",
            Statement::FunctionCallMeta(_) => "functioncallmeta",
            Statement::Answer(_) => "answer",
            Statement::UncertainOrError(_) => "uncertain_or_error",
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Plain(s) => s.fmt(f),
            Statement::FunctionCall(s) => f.write_str(&s.to_code_call()),
            Statement::FunctionCallMeta(s) => s.fmt(f),
            Statement::Answer(s) => s.fmt(f),
            Statement::UncertainOrError(s) => s.fmt(f),
        }
    }
}
