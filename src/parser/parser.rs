//! Recursive-descent statement parser for both dialects.
//!
//! Parsing happens in two passes. Tokens are first turned into a small
//! statement list, with nothing committed until a statement parses cleanly;
//! a statement that does not is re-read as an opaque one. The statement
//! list is then lowered into a [`DslTree`], which binds each statement to
//! its semantics as it is attached.

use smol_str::SmolStr;
use tracing::{debug, trace};

use super::diagnostics::{Diagnostic, DiagnosticCollector};
use super::lexer::{Token, TokenKind, tokenize};
use crate::base::{TextRange, range_of};
use crate::semantics::{BlockKind, Dialect};
use crate::tree::{BlockSyntax, Declaration, DslElement, DslTree, DslValue, ElementId, ElementKind, ExternalSyntax};

/// A parsed build file and what was found along the way.
#[derive(Debug)]
pub struct ParseResult {
    pub tree: DslTree,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses a build script. Never fails; unparseable statements are kept
/// verbatim and reported.
pub fn parse(text: &str, dialect: Dialect) -> ParseResult {
    let mut diagnostics = DiagnosticCollector::new(text);
    let tokens = tokenize(text, &mut diagnostics);

    let mut parser = Parser {
        source: text,
        tokens,
        pos: 0,
        dialect,
        infix_chain: false,
        diagnostics,
    };
    let statements = parser.statements(false);

    let mut lowering = Lowering {
        tree: DslTree::new(dialect),
        diagnostics: parser.diagnostics,
    };
    let root = lowering.tree.root();
    let count = statements.len();
    lowering.lower(root, statements);
    lowering.tree.commit();

    let diagnostics = lowering.diagnostics.finish();
    debug!(?dialect, statements = count, diagnostics = diagnostics.len(), "parsed build script");
    ParseResult {
        tree: lowering.tree,
        diagnostics,
    }
}

// ============================================================================
// STATEMENTS
// ============================================================================

#[derive(Debug)]
enum Statement {
    Block {
        path: Vec<SmolStr>,
        body: Vec<Statement>,
        range: TextRange,
    },
    Property {
        path: Vec<SmolStr>,
        declaration: Option<Declaration>,
        syntax: ExternalSyntax,
        value: Node,
        range: TextRange,
    },
    Opaque {
        text: String,
        range: TextRange,
    },
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    range: TextRange,
}

#[derive(Debug)]
enum NodeKind {
    Scalar { value: DslValue, raw: String },
    List { items: Vec<Node>, literal: bool },
    Map { entries: Vec<(SmolStr, Node)>, literal: bool },
}

const KOTLIN_LIST_BUILDERS: &[&str] = &["listOf", "mutableListOf", "arrayListOf", "setOf", "mutableSetOf", "hashSetOf"];
const KOTLIN_MAP_BUILDERS: &[&str] = &["mapOf", "mutableMapOf", "hashMapOf", "linkedMapOf"];

/// Statements that may continue with infix calls, and the calls allowed.
const INFIX_HEADS: &[&str] = &["id"];
const INFIX_CALLS: &[&str] = &["version", "apply"];

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
    dialect: Dialect,
    /// Set while reading a statement that may continue with infix calls.
    infix_chain: bool,
    diagnostics: DiagnosticCollector,
}

impl<'s> Parser<'s> {
    fn peek(&self) -> Option<TokenKind> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + offset).map(|token| token.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        let matched = self.at(kind);
        if matched {
            self.pos += 1;
        }
        matched
    }

    fn bump(&mut self) -> Option<&'s str> {
        let text = self.text_at(0)?;
        self.pos += 1;
        Some(text)
    }

    fn text_at(&self, offset: usize) -> Option<&'s str> {
        let source = self.source;
        self.tokens.get(self.pos + offset).map(|token| &source[token.span.clone()])
    }

    /// Byte offset of the next token, or the end of input.
    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.source.len(), |token| token.span.start)
    }

    /// Byte offset just past the last consumed token.
    fn prev_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map_or(0, |token| token.span.end)
    }

    fn range_from(&self, start: usize) -> TextRange {
        range_of(start..self.prev_end().max(start))
    }

    fn skip_newlines(&mut self) {
        while self.eat(TokenKind::Newline) {}
    }

    fn at_statement_end(&self) -> bool {
        match self.peek() {
            None => true,
            Some(kind) => kind.is_separator() || kind == TokenKind::RBrace,
        }
    }

    fn at_value_end(&self) -> bool {
        match self.peek() {
            None => true,
            Some(kind) => {
                kind.is_separator()
                    || kind.closes()
                    || matches!(kind, TokenKind::Comma | TokenKind::Colon)
                    || (self.infix_chain && self.at_infix_call())
            }
        }
    }

    fn at_infix_call(&self) -> bool {
        self.at(TokenKind::Ident) && self.text_at(0).is_some_and(|name| INFIX_CALLS.contains(&name))
    }

    /// Parses statements until `}` (when nested) or end of input.
    fn statements(&mut self, nested: bool) -> Vec<Statement> {
        let mut statements = Vec::new();
        loop {
            while self.peek().is_some_and(TokenKind::is_separator) {
                self.pos += 1;
            }
            match self.peek() {
                None => break,
                Some(TokenKind::RBrace) if nested => break,
                Some(TokenKind::RBrace) => {
                    let start = self.offset();
                    self.pos += 1;
                    let range = self.range_from(start);
                    self.diagnostics.unbalanced(range);
                    continue;
                }
                Some(_) => {}
            }

            let start = self.pos;
            let mark = self.diagnostics.mark();
            match self.statement() {
                Some(statement) if self.at_statement_end() => statements.push(statement),
                _ => {
                    self.pos = start;
                    self.diagnostics.rollback(mark);
                    statements.push(self.opaque_statement());
                }
            }
        }
        statements
    }

    fn statement(&mut self) -> Option<Statement> {
        let start = self.offset();
        let declaration = match self.peek()? {
            TokenKind::Def => Some(Declaration::Def),
            TokenKind::Val => Some(Declaration::Val),
            TokenKind::Var => Some(Declaration::Var),
            _ => None,
        };
        if declaration.is_some() {
            self.pos += 1;
        }
        let path = self.target_path()?;
        self.infix_chain = declaration.is_none() && matches!(path.as_slice(), [head] if INFIX_HEADS.contains(&head.as_str()));

        let (mut syntax, mut value) = match self.peek() {
            Some(TokenKind::Eq) => {
                self.pos += 1;
                (ExternalSyntax::Assignment, self.value()?)
            }
            Some(TokenKind::LBrace) if declaration.is_none() => {
                self.pos += 1;
                let body = self.statements(true);
                if !self.eat(TokenKind::RBrace) {
                    let range = self.range_from(start);
                    self.diagnostics.unbalanced(range);
                }
                return Some(Statement::Block {
                    path,
                    body,
                    range: self.range_from(start),
                });
            }
            Some(TokenKind::LParen) if declaration.is_none() => {
                let arguments = self.call_arguments()?;
                (ExternalSyntax::Method, arguments)
            }
            Some(_)
                if self.dialect == Dialect::Groovy && declaration.is_none() && !self.at_statement_end() =>
            {
                (ExternalSyntax::Command, self.command_arguments()?)
            }
            _ => return None,
        };
        if self.infix_chain && self.at_infix_call() {
            (syntax, value) = self.infix_calls(&path[0], value)?;
        }
        self.infix_chain = false;

        Some(Statement::Property {
            path,
            declaration,
            syntax,
            value,
            range: self.range_from(start),
        })
    }

    /// `version '1.0' apply false` after a leading call; the leading call's
    /// argument becomes the first entry.
    fn infix_calls(&mut self, head: &SmolStr, first: Node) -> Option<(ExternalSyntax, Node)> {
        let start = usize::from(first.range.start());
        let mut entries = vec![(head.clone(), first)];
        while self.at_infix_call() {
            let name = SmolStr::new(self.bump()?);
            entries.push((name, self.value()?));
        }
        let node = Node {
            kind: NodeKind::Map { entries, literal: false },
            range: self.range_from(start),
        };
        Some((ExternalSyntax::Infix, node))
    }

    /// `name`, `a.b.c`, `extra["key"]`.
    fn target_path(&mut self) -> Option<Vec<SmolStr>> {
        if !self.at(TokenKind::Ident) {
            return None;
        }
        let first = self.bump()?;
        let mut path = vec![SmolStr::new(self.dialect.internal_name(first))];
        loop {
            match (self.peek(), self.peek_at(1), self.peek_at(2)) {
                (Some(TokenKind::Dot), Some(TokenKind::Ident), _) => {
                    self.pos += 1;
                    let name = self.bump()?;
                    path.push(SmolStr::new(self.dialect.internal_name(name)));
                }
                (
                    Some(TokenKind::LBracket),
                    Some(TokenKind::DoubleString | TokenKind::SingleString),
                    Some(TokenKind::RBracket),
                ) => {
                    let key = unquote(self.text_at(1)?);
                    self.pos += 3;
                    path.push(SmolStr::new(key));
                }
                _ => break,
            }
        }
        Some(path)
    }

    /// `(a, b)` or `(key: value)`; the opening parenthesis is next.
    fn call_arguments(&mut self) -> Option<Node> {
        let start = self.offset();
        self.pos += 1;
        let mut positional = Vec::new();
        let mut named = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(TokenKind::RParen) {
                break;
            }
            self.argument(&mut positional, &mut named)?;
            self.skip_newlines();
            if self.eat(TokenKind::Comma) {
                continue;
            }
            if self.eat(TokenKind::RParen) {
                break;
            }
            return None;
        }
        arguments_node(positional, named, self.range_from(start))
    }

    /// Groovy paren-less arguments: `a, b` or `key: value, other: value`.
    fn command_arguments(&mut self) -> Option<Node> {
        let start = self.offset();
        let mut positional = Vec::new();
        let mut named = Vec::new();
        loop {
            self.argument(&mut positional, &mut named)?;
            if !self.eat(TokenKind::Comma) {
                break;
            }
            self.skip_newlines();
        }
        arguments_node(positional, named, self.range_from(start))
    }

    fn argument(&mut self, positional: &mut Vec<Node>, named: &mut Vec<(SmolStr, Node)>) -> Option<()> {
        match self.named_key().or_else(|| self.argument_name()) {
            Some(key) => named.push((key, self.value()?)),
            None => positional.push(self.value()?),
        }
        Some(())
    }

    /// `key:` in Groovy named arguments and map literals.
    fn named_key(&mut self) -> Option<SmolStr> {
        let kind = self.peek()?;
        if self.peek_at(1) != Some(TokenKind::Colon) {
            return None;
        }
        let key = match kind {
            TokenKind::Ident => SmolStr::new(self.text_at(0)?),
            TokenKind::DoubleString | TokenKind::SingleString => SmolStr::new(unquote(self.text_at(0)?)),
            _ => return None,
        };
        self.pos += 2;
        Some(key)
    }

    /// `key =` in Kotlin named arguments.
    fn argument_name(&mut self) -> Option<SmolStr> {
        if self.dialect != Dialect::Kotlin || !self.at(TokenKind::Ident) || self.peek_at(1) != Some(TokenKind::Eq) {
            return None;
        }
        let key = SmolStr::new(self.text_at(0)?);
        self.pos += 2;
        Some(key)
    }

    /// A value; anything beyond a simple literal, reference or collection is
    /// kept as a raw expression.
    fn value(&mut self) -> Option<Node> {
        let start = self.offset();
        let primary = self.primary()?;
        if self.at_value_end() {
            return Some(primary);
        }

        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            if depth == 0 && self.at_value_end() {
                break;
            }
            if kind.opens() {
                depth += 1;
            } else if kind.closes() {
                depth -= 1;
            }
            self.pos += 1;
        }
        let range = self.range_from(start);
        let raw = self.source[range_to_usize(range)].to_owned();
        Some(Node {
            kind: NodeKind::Scalar {
                value: DslValue::Expression(raw.clone()),
                raw,
            },
            range,
        })
    }

    fn primary(&mut self) -> Option<Node> {
        let start = self.offset();
        let value = match self.peek()? {
            TokenKind::DoubleString | TokenKind::SingleString => DslValue::String(unquote(self.bump()?)),
            TokenKind::Integer | TokenKind::Decimal => number(self.bump()?, false)?,
            TokenKind::Operator
                if self.text_at(0) == Some("-")
                    && matches!(self.peek_at(1), Some(TokenKind::Integer | TokenKind::Decimal)) =>
            {
                self.pos += 1;
                number(self.bump()?, true)?
            }
            TokenKind::True => {
                self.pos += 1;
                DslValue::Boolean(true)
            }
            TokenKind::False => {
                self.pos += 1;
                DslValue::Boolean(false)
            }
            TokenKind::LBracket => return self.bracket_literal(),
            TokenKind::Ident => return self.reference_or_call(),
            _ => return None,
        };
        let range = self.range_from(start);
        Some(scalar(value, &self.source[range_to_usize(range)], range))
    }

    /// `[a, b]`, `[k: v]` or `[:]`; the bracket is next.
    fn bracket_literal(&mut self) -> Option<Node> {
        let start = self.offset();
        self.pos += 1;
        self.skip_newlines();

        if self.at(TokenKind::Colon) && self.peek_at(1) == Some(TokenKind::RBracket) {
            self.pos += 2;
            return Some(Node {
                kind: NodeKind::Map { entries: Vec::new(), literal: true },
                range: self.range_from(start),
            });
        }
        if self.peek_at(1) != Some(TokenKind::Colon) {
            let items = self.delimited_values(TokenKind::RBracket)?;
            return Some(Node {
                kind: NodeKind::List { items, literal: true },
                range: self.range_from(start),
            });
        }

        let mut entries = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(TokenKind::RBracket) {
                break;
            }
            let key = self.named_key()?;
            entries.push((key, self.value()?));
            self.skip_newlines();
            if self.eat(TokenKind::Comma) {
                continue;
            }
            if self.eat(TokenKind::RBracket) {
                break;
            }
            return None;
        }
        Some(Node {
            kind: NodeKind::Map { entries, literal: true },
            range: self.range_from(start),
        })
    }

    /// Comma separated values up to `close`; the opener is already consumed.
    fn delimited_values(&mut self, close: TokenKind) -> Option<Vec<Node>> {
        let mut items = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(close) {
                break;
            }
            items.push(self.value()?);
            self.skip_newlines();
            if self.eat(TokenKind::Comma) {
                continue;
            }
            if self.eat(close) {
                break;
            }
            return None;
        }
        Some(items)
    }

    /// A dotted/indexed reference, a Kotlin collection builder, or a call
    /// kept as an expression.
    fn reference_or_call(&mut self) -> Option<Node> {
        let start = self.offset();
        let head = self.bump()?;
        let mut simple = true;
        loop {
            match (self.peek(), self.peek_at(1), self.peek_at(2)) {
                (Some(TokenKind::Dot), Some(TokenKind::Ident), _) => {
                    self.pos += 2;
                    simple = false;
                }
                (
                    Some(TokenKind::LBracket),
                    Some(TokenKind::DoubleString | TokenKind::SingleString | TokenKind::Integer),
                    Some(TokenKind::RBracket),
                ) => {
                    self.pos += 3;
                    simple = false;
                }
                _ => break,
            }
        }

        if !self.at(TokenKind::LParen) {
            let range = self.range_from(start);
            let raw = &self.source[range_to_usize(range)];
            return Some(scalar(DslValue::Reference(raw.to_owned()), raw, range));
        }

        let kotlin_builder = simple && self.dialect == Dialect::Kotlin;
        if kotlin_builder && KOTLIN_LIST_BUILDERS.contains(&head) {
            self.pos += 1;
            let items = self.delimited_values(TokenKind::RParen)?;
            return Some(Node {
                kind: NodeKind::List { items, literal: true },
                range: self.range_from(start),
            });
        }
        if kotlin_builder && KOTLIN_MAP_BUILDERS.contains(&head) {
            self.pos += 1;
            let entries = self.kotlin_pairs()?;
            return Some(Node {
                kind: NodeKind::Map { entries, literal: true },
                range: self.range_from(start),
            });
        }

        self.skip_balanced()?;
        let range = self.range_from(start);
        let raw = &self.source[range_to_usize(range)];
        Some(scalar(DslValue::Expression(raw.to_owned()), raw, range))
    }

    /// `"k" to v, ...)`; the opening parenthesis is already consumed.
    fn kotlin_pairs(&mut self) -> Option<Vec<(SmolStr, Node)>> {
        let mut entries = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(TokenKind::RParen) {
                break;
            }
            let key = self.primary()?;
            let NodeKind::Scalar { value, .. } = key.kind else {
                return None;
            };
            let key = value.to_key()?;
            if self.text_at(0) != Some("to") {
                return None;
            }
            self.pos += 1;
            entries.push((SmolStr::new(key), self.value()?));
            self.skip_newlines();
            if self.eat(TokenKind::Comma) {
                continue;
            }
            if self.eat(TokenKind::RParen) {
                break;
            }
            return None;
        }
        Some(entries)
    }

    /// Skips a parenthesised group, including nested groups.
    fn skip_balanced(&mut self) -> Option<()> {
        let mut depth = 0usize;
        loop {
            let kind = self.peek()?;
            self.pos += 1;
            if kind.opens() {
                depth += 1;
            } else if kind.closes() {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(());
                }
            }
        }
    }

    /// Consumes one statement verbatim.
    fn opaque_statement(&mut self) -> Statement {
        let start = self.offset();
        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            if depth == 0 && (kind.is_separator() || kind == TokenKind::RBrace) {
                break;
            }
            if kind.opens() {
                depth += 1;
            } else if kind.closes() {
                depth = depth.saturating_sub(1);
            }
            self.pos += 1;
        }
        let text = self.source[start..self.offset()].trim_end();
        let range = range_of(start..start + text.len());
        trace!(text, "statement kept opaque");
        self.diagnostics.unparsed_statement(range);
        Statement::Opaque {
            text: text.to_owned(),
            range,
        }
    }
}

fn arguments_node(mut positional: Vec<Node>, named: Vec<(SmolStr, Node)>, range: TextRange) -> Option<Node> {
    let kind = match (positional.len(), named.is_empty()) {
        (0, false) => NodeKind::Map { entries: named, literal: false },
        (_, false) => return None,
        (1, true) => return positional.pop(),
        _ => NodeKind::List { items: positional, literal: false },
    };
    Some(Node { kind, range })
}

fn scalar(value: DslValue, raw: &str, range: TextRange) -> Node {
    Node {
        kind: NodeKind::Scalar {
            value,
            raw: raw.to_owned(),
        },
        range,
    }
}

fn range_to_usize(range: TextRange) -> std::ops::Range<usize> {
    range.start().into()..range.end().into()
}

fn number(text: &str, negative: bool) -> Option<DslValue> {
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    let sign = if negative { -1 } else { 1 };
    if digits.contains('.') {
        let digits = digits.trim_end_matches(['f', 'F', 'd', 'D']);
        digits.parse::<f64>().ok().map(|d| DslValue::Decimal(d * f64::from(sign)))
    } else {
        let digits = digits.trim_end_matches(['l', 'L']);
        digits.parse::<i64>().ok().map(|i| DslValue::Integer(i * i64::from(sign)))
    }
}

/// Contents of a quoted string literal with escapes applied.
fn unquote(raw: &str) -> String {
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

// ============================================================================
// LOWERING
// ============================================================================

struct Lowering {
    tree: DslTree,
    diagnostics: DiagnosticCollector,
}

impl Lowering {
    fn lower(&mut self, block: ElementId, statements: Vec<Statement>) {
        for statement in statements {
            match statement {
                Statement::Block { path, body, range } => {
                    let Some((name, prefix)) = path.split_last() else { continue };
                    let parent = self.dotted_parent(block, prefix, range);
                    let id = self.child_block(parent, name, BlockSyntax::Braces, range);
                    self.lower(id, body);
                }
                Statement::Property {
                    path,
                    declaration,
                    syntax,
                    value,
                    range,
                } => {
                    let Some((name, prefix)) = path.split_last() else { continue };
                    let parent = self.dotted_parent(block, prefix, range);
                    let id = self.build_node(name, value, syntax);
                    if let Some(element) = self.tree.get_mut(id) {
                        element.declaration = declaration;
                        element.range = Some(range);
                    }
                    self.tree.attach(parent, id);
                }
                Statement::Opaque { text, range } => {
                    let mut element = DslElement::new("", ElementKind::Opaque(text), ExternalSyntax::Command);
                    element.range = Some(range);
                    let id = self.tree.alloc(element);
                    self.tree.attach(block, id);
                }
            }
        }
    }

    /// Blocks named by the leading segments of a dotted statement.
    fn dotted_parent(&mut self, block: ElementId, prefix: &[SmolStr], range: TextRange) -> ElementId {
        prefix
            .iter()
            .fold(block, |parent, name| self.child_block(parent, name, BlockSyntax::Dotted, range))
    }

    /// Finds or creates the child block `name`. A braced occurrence turns an
    /// earlier dotted-only block into a braced one.
    fn child_block(&mut self, parent: ElementId, name: &str, syntax: BlockSyntax, range: TextRange) -> ElementId {
        if let Some(existing) = self.tree.find_block_named(parent, name) {
            if syntax == BlockSyntax::Braces {
                if let Some(element) = self.tree.get_mut(existing) {
                    if let ElementKind::Block { syntax: current, .. } = &mut element.kind {
                        *current = BlockSyntax::Braces;
                    }
                }
            }
            return existing;
        }

        let parent_kind = self.tree.block_kind(parent).unwrap_or(BlockKind::Generic);
        let kind = parent_kind.child_block(name).unwrap_or(BlockKind::Generic);
        if kind == BlockKind::Generic && parent_kind != BlockKind::Generic && parent_kind != BlockKind::Root {
            self.diagnostics.unknown_block(range, name);
        }
        let mut element = DslElement::block(name, kind, syntax);
        element.range = Some(range);
        let id = self.tree.alloc(element);
        self.tree.attach(parent, id);
        id
    }

    fn build_node(&mut self, name: &str, node: Node, syntax: ExternalSyntax) -> ElementId {
        let Node { kind, range } = node;
        match kind {
            NodeKind::Scalar { value, raw } => {
                let mut element = DslElement::new(name, ElementKind::Literal(value), syntax);
                element.raw = Some(raw);
                element.range = Some(range);
                self.tree.alloc(element)
            }
            NodeKind::List { items, literal } => {
                let mut element = DslElement::new(name, ElementKind::List { literal }, syntax);
                element.range = Some(range);
                let id = self.tree.alloc(element);
                for item in items {
                    let child = self.build_node("", item, ExternalSyntax::Assignment);
                    self.tree.attach(id, child);
                }
                id
            }
            NodeKind::Map { entries, literal } => {
                let mut element = DslElement::new(name, ElementKind::Map { literal }, syntax);
                element.range = Some(range);
                let id = self.tree.alloc(element);
                for (key, item) in entries {
                    let child = self.build_node(&key, item, ExternalSyntax::Assignment);
                    self.tree.attach(id, child);
                }
                id
            }
        }
    }
}
