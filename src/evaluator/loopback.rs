//! Loopback evaluator
//!
//! A deliberately tiny integer-arithmetic session standing in for a real
//! embedded interpreter. It exists so the CLI demo and the test suite can
//! exercise every verdict and failure kind the driver has to handle:
//! continuations (trailing backslash), syntax errors (unbalanced
//! parentheses, stray tokens), asynchronous results (`sleep`),
//! interpreter-level failures (`raise`, division by zero, undefined names),
//! an injected internal failure (`glitch`), and fatal failures (`exit`,
//! `crash`). It is not a language implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::anyhow;

use super::{
    EvalFailure, EvalOutcome, Evaluator, FatalError, FatalKind, FatalSink, OutputSink,
    PendingResult, ReleaseGuard, Value, Verdict,
};

/// Statement keywords recognized alongside arithmetic expressions.
const KEYWORDS: [&str; 6] = ["crash", "exit", "print", "raise", "sleep", "warn"];

/// Built-in demo evaluator: integer arithmetic with named bindings.
pub struct LoopbackEvaluator {
    vars: HashMap<String, i64>,
    buffer: Vec<String>,
    stdout: Option<OutputSink>,
    stderr: Option<OutputSink>,
    fatal: Option<FatalSink>,
    live_handles: Arc<AtomicUsize>,
}

impl LoopbackEvaluator {
    /// Create an evaluator with an empty namespace.
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
            buffer: Vec::new(),
            stdout: None,
            stderr: None,
            fatal: None,
            live_handles: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of result handles handed out and not yet released.
    pub fn live_handles(&self) -> usize {
        self.live_handles.load(Ordering::SeqCst)
    }

    /// Wrap a future in a counted result handle.
    fn handle<F>(&self, future: F) -> PendingResult
    where
        F: std::future::Future<Output = EvalOutcome> + Send + 'static,
    {
        let live = Arc::clone(&self.live_handles);
        live.fetch_add(1, Ordering::SeqCst);
        let guard = ReleaseGuard::new(move || {
            live.fetch_sub(1, Ordering::SeqCst);
        });
        PendingResult::new(Box::pin(future), guard)
    }

    fn immediate(&self, outcome: EvalOutcome) -> Verdict {
        Verdict::Complete(self.handle(async move { outcome }))
    }

    fn send_fatal(&self, kind: FatalKind, message: &str) {
        if let Some(sink) = &self.fatal {
            let _ = sink.send(FatalError {
                kind,
                message: message.to_string(),
            });
        }
    }

    fn evaluate_statement(&mut self, statement: &str) -> Verdict {
        if statement.is_empty() {
            return self.immediate(Ok(Value::None));
        }

        if let Some(rest) = strip_keyword(statement, "raise") {
            let message = if rest.is_empty() { "error" } else { rest };
            return self.immediate(Err(EvalFailure::Interpreter {
                diagnostic: format!("Error: {message}\n"),
            }));
        }

        if statement == "exit" {
            self.send_fatal(FatalKind::Exit, "interpreter exited");
            return self.immediate(Ok(Value::None));
        }

        if statement == "crash" {
            self.send_fatal(FatalKind::Crash, "simulated interpreter crash");
            return self.immediate(Ok(Value::None));
        }

        if statement == "glitch" {
            // Fault injection for the driver's rethrow path.
            return self.immediate(Err(EvalFailure::Internal(anyhow!(
                "simulated collaborator defect"
            ))));
        }

        if let Some(rest) = strip_keyword(statement, "sleep") {
            let Ok(millis) = rest.parse::<u64>() else {
                return Verdict::SyntaxError(
                    "SyntaxError: sleep expects a millisecond count".to_string(),
                );
            };
            return Verdict::Complete(self.handle(async move {
                tokio::time::sleep(Duration::from_millis(millis)).await;
                Ok(Value::None)
            }));
        }

        if let Some(rest) = strip_keyword(statement, "print") {
            let sink = self.stdout.clone();
            return match self.eval_expr(rest) {
                Ok(value) => Verdict::Complete(self.handle(async move {
                    if let Some(sink) = sink {
                        sink(&format!("{value}\n"));
                    }
                    Ok(Value::None)
                })),
                Err(error) => self.verdict_for_error(error),
            };
        }

        if let Some(rest) = strip_keyword(statement, "warn") {
            let sink = self.stderr.clone();
            let text = rest.to_string();
            return Verdict::Complete(self.handle(async move {
                if let Some(sink) = sink {
                    sink(&format!("{text}\n"));
                }
                Ok(Value::None)
            }));
        }

        if let Some((name, rhs)) = split_assignment(statement) {
            return match self.eval_expr(rhs) {
                Ok(value) => {
                    self.vars.insert(name.to_string(), value);
                    self.immediate(Ok(Value::None))
                }
                Err(error) => self.verdict_for_error(error),
            };
        }

        match self.eval_expr(statement) {
            Ok(value) => self.immediate(Ok(Value::Plain(value.to_string()))),
            Err(error) => self.verdict_for_error(error),
        }
    }

    fn verdict_for_error(&self, error: ExprError) -> Verdict {
        match error {
            ExprError::Syntax(message) => Verdict::SyntaxError(format!("SyntaxError: {message}")),
            ExprError::Runtime(message) => self.immediate(Err(EvalFailure::Interpreter {
                diagnostic: format!("Error: {message}\n"),
            })),
        }
    }

    fn eval_expr(&self, text: &str) -> Result<i64, ExprError> {
        let tokens = tokenize(text)?;
        let mut parser = ExprParser {
            tokens: &tokens,
            pos: 0,
            vars: &self.vars,
        };
        let value = parser.expr()?;
        if parser.pos != tokens.len() {
            return Err(ExprError::Syntax("unexpected trailing input".to_string()));
        }
        Ok(value)
    }
}

impl Default for LoopbackEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for LoopbackEvaluator {
    fn push(&mut self, line: &str) -> Verdict {
        if let Some(stripped) = line.trim_end().strip_suffix('\\') {
            self.buffer.push(stripped.to_string());
            return Verdict::Incomplete;
        }

        self.buffer.push(line.to_string());
        let statement = self.buffer.join(" ").trim().to_string();
        self.buffer.clear();
        self.evaluate_statement(&statement)
    }

    fn complete(&self, partial: &str) -> Vec<String> {
        let prefix = partial
            .rsplit(|c: char| !c.is_alphanumeric() && c != '_')
            .next()
            .unwrap_or("");
        let mut names: Vec<String> = self
            .vars
            .keys()
            .cloned()
            .chain(KEYWORDS.iter().map(|k| k.to_string()))
            .filter(|name| !prefix.is_empty() && name.starts_with(prefix))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    fn set_stdout(&mut self, sink: OutputSink) {
        self.stdout = Some(sink);
    }

    fn set_stderr(&mut self, sink: OutputSink) {
        self.stderr = Some(sink);
    }

    fn set_fatal_sink(&mut self, sink: FatalSink) {
        self.fatal = Some(sink);
    }
}

/// Match `keyword` or `keyword <rest>`; returns the trimmed rest.
fn strip_keyword<'a>(statement: &'a str, keyword: &str) -> Option<&'a str> {
    if statement == keyword {
        return Some("");
    }
    statement
        .strip_prefix(keyword)
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(str::trim)
}

/// Split `name = expr` when the left-hand side is a bare identifier.
fn split_assignment(statement: &str) -> Option<(&str, &str)> {
    let (lhs, rhs) = statement.split_once('=')?;
    let name = lhs.trim();
    if !name.is_empty()
        && name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
    {
        Some((name, rhs.trim()))
    } else {
        None
    }
}

enum ExprError {
    Syntax(String),
    Runtime(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Num(i64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(text: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '0'..='9' => {
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = digits
                    .parse()
                    .map_err(|_| ExprError::Syntax(format!("number out of range: {digits}")))?;
                tokens.push(Token::Num(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' {
                        name.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(name));
            }
            other => {
                return Err(ExprError::Syntax(format!(
                    "unexpected character '{other}'"
                )));
            }
        }
    }
    Ok(tokens)
}

struct ExprParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    vars: &'a HashMap<String, i64>,
}

impl ExprParser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn expr(&mut self) -> Result<i64, ExprError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value = value.wrapping_add(self.term()?);
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value = value.wrapping_sub(self.term()?);
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<i64, ExprError> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value = value.wrapping_mul(self.unary()?);
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    let divisor = self.unary()?;
                    if divisor == 0 {
                        return Err(ExprError::Runtime("division by zero".to_string()));
                    }
                    value = value.wrapping_div(divisor);
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<i64, ExprError> {
        if matches!(self.peek(), Some(Token::Minus)) {
            self.pos += 1;
            return Ok(self.unary()?.wrapping_neg());
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<i64, ExprError> {
        match self.peek().cloned() {
            Some(Token::Num(value)) => {
                self.pos += 1;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                self.pos += 1;
                self.vars
                    .get(&name)
                    .copied()
                    .ok_or_else(|| ExprError::Runtime(format!("undefined name '{name}'")))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let value = self.expr()?;
                if !matches!(self.peek(), Some(Token::RParen)) {
                    return Err(ExprError::Syntax("unmatched '('".to_string()));
                }
                self.pos += 1;
                Ok(value)
            }
            Some(Token::RParen) => Err(ExprError::Syntax("unmatched ')'".to_string())),
            _ => Err(ExprError::Syntax("unexpected end of input".to_string())),
        }
    }
}
