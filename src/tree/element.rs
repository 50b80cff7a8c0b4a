//! Elements stored in a [`DslTree`](super::DslTree).

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::TextRange;
use crate::semantics::{Arity, BlockKind, ModelEffectDescription};

use super::value::DslValue;

/// Index of an element in its tree's arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub(crate) u32);

impl ElementId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a block was opened in the source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockSyntax {
    /// `name { ... }`
    Braces,
    /// Only reached through dotted statements such as `android.namespace = "x"`.
    Dotted,
}

/// How a property statement was written.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExternalSyntax {
    /// `name = value`
    Assignment,
    /// `name(args)`
    Method,
    /// `name args` (Groovy only)
    Command,
    /// `id 'x' version '1.0' apply false`: a call followed by infix calls,
    /// held as a non-literal map from each call name to its argument.
    Infix,
}

impl ExternalSyntax {
    pub fn is_call(self) -> bool {
        !matches!(self, ExternalSyntax::Assignment)
    }
}

/// Variable declaration keyword in front of a statement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Declaration {
    Def,
    Val,
    Var,
}

impl Declaration {
    pub fn keyword(self) -> &'static str {
        match self {
            Declaration::Def => "def",
            Declaration::Val => "val",
            Declaration::Var => "var",
        }
    }
}

/// What an element holds.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    /// Named container of statements.
    Block { kind: BlockKind, syntax: BlockSyntax },
    /// Scalar value; composite values are stored as `List`/`Map` children.
    Literal(DslValue),
    /// Ordered children. `literal` distinguishes `[a, b]` from call arguments.
    List { literal: bool },
    /// Children keyed by element name. Non-literal maps are named arguments.
    Map { literal: bool },
    /// A statement the parser could not model, kept verbatim.
    Opaque(String),
}

/// One node of the tree.
#[derive(Clone, Debug)]
pub struct DslElement {
    pub(crate) name: SmolStr,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) kind: ElementKind,
    pub(crate) syntax: ExternalSyntax,
    pub(crate) effect: Option<ModelEffectDescription>,
    pub(crate) declaration: Option<Declaration>,
    pub(crate) raw: Option<String>,
    pub(crate) range: Option<TextRange>,
    pub(crate) modified: bool,
    /// A block whose last statement was removed.
    pub(crate) emptied: bool,
    pub(crate) detached: bool,
}

impl DslElement {
    pub(crate) fn new(name: impl Into<SmolStr>, kind: ElementKind, syntax: ExternalSyntax) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            kind,
            syntax,
            effect: None,
            declaration: None,
            raw: None,
            range: None,
            modified: false,
            emptied: false,
            detached: false,
        }
    }

    pub(crate) fn block(name: impl Into<SmolStr>, kind: BlockKind, syntax: BlockSyntax) -> Self {
        Self::new(name, ElementKind::Block { kind, syntax }, ExternalSyntax::Method)
    }

    /// Surface name, with Kotlin `extra` already mapped to `ext`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn syntax(&self) -> ExternalSyntax {
        self.syntax
    }

    /// The semantic effect bound when the element was attached to a block.
    pub fn effect(&self) -> Option<ModelEffectDescription> {
        self.effect
    }

    pub fn declaration(&self) -> Option<Declaration> {
        self.declaration
    }

    /// Source text of an unchanged literal.
    pub fn raw_text(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Source range, `None` for elements created in memory.
    pub fn range(&self) -> Option<TextRange> {
        self.range
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn block_kind(&self) -> Option<BlockKind> {
        match self.kind {
            ElementKind::Block { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self.kind, ElementKind::Block { .. })
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self.kind, ElementKind::Opaque(_))
    }

    /// A named statement that carries a value.
    pub fn is_property(&self) -> bool {
        !self.name.is_empty() && !self.is_block() && !self.is_opaque()
    }

    /// Number of call arguments this statement was written with.
    ///
    /// A multi-argument call is a non-literal list, Groovy named arguments
    /// form a single non-literal map, any other value is one argument.
    pub fn argument_count(&self) -> usize {
        match self.kind {
            ElementKind::List { literal: false } => self.children.len(),
            _ => 1,
        }
    }

    /// The arity this statement is looked up with in a semantics table.
    pub fn arity(&self) -> Arity {
        if self.syntax.is_call() {
            Arity::of_call(self.argument_count())
        } else {
            Arity::Property
        }
    }
}

/// A subtree to attach with [`DslTree::set_new_element`](super::DslTree::set_new_element).
#[derive(Clone, Debug, PartialEq)]
pub enum NewElement {
    /// `name = value`
    Value(DslValue),
    /// `name(args)` or, with `Command` syntax, `name args`.
    Call { args: Vec<DslValue>, syntax: ExternalSyntax },
    /// Named arguments (`name key: value` / `name(key = value)`), or an
    /// infix chain with [`ExternalSyntax::Infix`].
    Named {
        entries: IndexMap<String, DslValue>,
        syntax: ExternalSyntax,
    },
    /// `name { }`
    Block(BlockKind),
}
