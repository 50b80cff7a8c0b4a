//! Regenerating build-script text from a [`DslTree`].
//!
//! Output is canonical: one statement per line, indented by
//! [`FormatOptions::indent_size`]. What the tree remembers is kept. That
//! covers unchanged literal text, statement syntax, declaration keywords,
//! and dotted versus braced blocks. Comments and blank lines are not.

use tracing::trace;

use crate::base::name::is_identifier;
use crate::semantics::{BlockKind, Dialect};
use crate::tree::{BlockSyntax, DslTree, DslValue, ElementId, ElementKind, ExternalSyntax};

/// Layout settings for regenerated text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    /// Spaces per nesting level.
    pub indent_size: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { indent_size: 4 }
    }
}

/// Renders the whole tree in its dialect.
pub fn write_tree(tree: &DslTree, options: &FormatOptions) -> String {
    let mut writer = Writer {
        tree,
        options,
        dialect: tree.dialect(),
        out: String::new(),
    };
    writer.block_body(tree.root(), 0, "");
    trace!(bytes = writer.out.len(), "regenerated build script");
    writer.out
}

struct Writer<'a> {
    tree: &'a DslTree,
    options: &'a FormatOptions,
    dialect: Dialect,
    out: String,
}

impl Writer<'_> {
    fn line(&mut self, depth: usize, text: &str) {
        self.out.push_str(&" ".repeat(depth * self.options.indent_size));
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn block_body(&mut self, block: ElementId, depth: usize, prefix: &str) {
        let tree = self.tree;
        for &child in tree.children(block) {
            if !tree.is_insignificant_block(child) {
                self.statement(child, depth, prefix);
            }
        }
    }

    fn statement(&mut self, id: ElementId, depth: usize, prefix: &str) {
        let tree = self.tree;
        let Some(element) = tree.get(id) else { return };
        match element.kind() {
            ElementKind::Block { kind: BlockKind::Ext, .. } if self.dialect == Dialect::Kotlin => {
                // Kotlin has no `ext` block; each entry becomes `extra["name"] = value`.
                for &child in tree.children(id) {
                    let Some(entry) = tree.get(child) else { continue };
                    if entry.is_property() {
                        let target = format!("{prefix}extra[{}]", kotlin_string(entry.name()));
                        let text = format!("{target} = {}", self.value_text(child));
                        self.line(depth, &text);
                    } else {
                        self.statement(child, depth, prefix);
                    }
                }
            }
            ElementKind::Block { syntax: BlockSyntax::Dotted, .. } => {
                let nested = format!("{prefix}{}.", element.name());
                self.block_body(id, depth, &nested);
            }
            ElementKind::Block { .. } => {
                self.line(depth, &format!("{prefix}{} {{", element.name()));
                self.block_body(id, depth + 1, "");
                self.line(depth, "}");
            }
            ElementKind::Opaque(text) => self.line(depth, text),
            _ => {
                let mut text = String::new();
                if let Some(declaration) = element.declaration() {
                    text.push_str(declaration.keyword());
                    text.push(' ');
                }
                text.push_str(prefix);
                text.push_str(element.name());
                match element.syntax() {
                    ExternalSyntax::Assignment => {
                        text.push_str(" = ");
                        text.push_str(&self.value_text(id));
                    }
                    ExternalSyntax::Method => {
                        text.push('(');
                        text.push_str(&self.arguments_text(id));
                        text.push(')');
                    }
                    ExternalSyntax::Command => {
                        let arguments = self.arguments_text(id);
                        if arguments.is_empty() {
                            text.push_str("()");
                        } else {
                            text.push(' ');
                            text.push_str(&arguments);
                        }
                    }
                    ExternalSyntax::Infix => text.push_str(&self.infix_text(id)),
                }
                self.line(depth, &text);
            }
        }
    }

    fn arguments_text(&self, id: ElementId) -> String {
        let Some(element) = self.tree.get(id) else {
            return String::new();
        };
        match element.kind() {
            ElementKind::List { literal: false } => self.joined(element.children(), |w, child| w.value_text(child)),
            ElementKind::Map { literal: false } => self.joined(element.children(), |w, child| w.named_argument(child)),
            _ => self.value_text(id),
        }
    }

    /// The argument of the leading call, then ` name argument` for each
    /// infix call.
    fn infix_text(&self, id: ElementId) -> String {
        let Some((first, rest)) = self.tree.children(id).split_first() else {
            return "()".to_owned();
        };
        let mut text = match self.dialect {
            Dialect::Groovy => format!(" {}", self.value_text(*first)),
            Dialect::Kotlin => format!("({})", self.value_text(*first)),
        };
        for &call in rest {
            let name = self.tree.get(call).map(|element| element.name()).unwrap_or_default();
            text.push_str(&format!(" {name} {}", self.value_text(call)));
        }
        text
    }

    fn joined(&self, ids: &[ElementId], render: impl Fn(&Self, ElementId) -> String) -> String {
        ids.iter().map(|&id| render(self, id)).collect::<Vec<_>>().join(", ")
    }

    fn named_argument(&self, id: ElementId) -> String {
        let name = self.tree.get(id).map(|element| element.name()).unwrap_or_default();
        match self.dialect {
            Dialect::Groovy => format!("{}: {}", groovy_key(name), self.value_text(id)),
            Dialect::Kotlin => format!("{name} = {}", self.value_text(id)),
        }
    }

    fn value_text(&self, id: ElementId) -> String {
        let Some(element) = self.tree.get(id) else {
            return String::new();
        };
        if let Some(raw) = element.raw_text() {
            return raw.to_owned();
        }
        match element.kind() {
            ElementKind::Literal(value) => self.scalar_text(value),
            ElementKind::List { .. } => {
                let items = self.joined(element.children(), |w, child| w.value_text(child));
                match self.dialect {
                    Dialect::Groovy => format!("[{items}]"),
                    Dialect::Kotlin => format!("listOf({items})"),
                }
            }
            ElementKind::Map { .. } => match self.dialect {
                Dialect::Groovy if element.children().is_empty() => "[:]".to_owned(),
                Dialect::Groovy => format!("[{}]", self.joined(element.children(), |w, child| w.named_argument(child))),
                Dialect::Kotlin => {
                    let entries = self.joined(element.children(), |w, child| {
                        let key = w.tree.get(child).map(|entry| entry.name()).unwrap_or_default();
                        format!("{} to {}", kotlin_string(key), w.value_text(child))
                    });
                    format!("mapOf({entries})")
                }
            },
            ElementKind::Block { .. } | ElementKind::Opaque(_) => String::new(),
        }
    }

    fn scalar_text(&self, value: &DslValue) -> String {
        match value {
            DslValue::String(s) => match self.dialect {
                Dialect::Groovy => groovy_string(s),
                Dialect::Kotlin => kotlin_string(s),
            },
            DslValue::Integer(i) => i.to_string(),
            DslValue::Decimal(d) => format!("{d:?}"),
            DslValue::Boolean(b) => b.to_string(),
            DslValue::Reference(text) | DslValue::Expression(text) => text.clone(),
            DslValue::List(items) => {
                let items: Vec<String> = items.iter().map(|item| self.scalar_text(item)).collect();
                match self.dialect {
                    Dialect::Groovy => format!("[{}]", items.join(", ")),
                    Dialect::Kotlin => format!("listOf({})", items.join(", ")),
                }
            }
            DslValue::Map(entries) => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(key, item)| match self.dialect {
                        Dialect::Groovy => format!("{}: {}", groovy_key(key), self.scalar_text(item)),
                        Dialect::Kotlin => format!("{} to {}", kotlin_string(key), self.scalar_text(item)),
                    })
                    .collect();
                match (self.dialect, entries.is_empty()) {
                    (Dialect::Groovy, true) => "[:]".to_owned(),
                    (Dialect::Groovy, false) => format!("[{}]", entries.join(", ")),
                    (Dialect::Kotlin, _) => format!("mapOf({})", entries.join(", ")),
                }
            }
        }
    }
}

fn groovy_string(text: &str) -> String {
    format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn kotlin_string(text: &str) -> String {
    format!(
        "\"{}\"",
        text.replace('\\', "\\\\").replace('"', "\\\"").replace('$', "\\$")
    )
}

fn groovy_key(key: &str) -> String {
    if is_identifier(key) { key.to_owned() } else { groovy_string(key) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::NewElement;

    #[test]
    fn test_write_new_groovy_statements() {
        let mut tree = DslTree::new(Dialect::Groovy);
        let android = tree.ensure_block(tree.root(), BlockKind::Android).unwrap();
        let adb = tree.ensure_block(android, BlockKind::AdbOptions).unwrap();
        tree.ensure_block(android, BlockKind::DefaultConfig).unwrap();
        tree.set_new_literal(adb, "installOptions", vec!["-r"]).unwrap();
        tree.set_new_element(
            adb,
            "timeOutInMs",
            NewElement::Call { args: vec![DslValue::Integer(500)], syntax: ExternalSyntax::Command },
        )
        .unwrap();

        let text = write_tree(&tree, &FormatOptions::default());
        assert_eq!(
            text,
            "android {\n    adbOptions {\n        installOptions = ['-r']\n        timeOutInMs 500\n    }\n}\n"
        );
    }

    #[test]
    fn test_write_plugin_statements() {
        for (dialect, expected) in [
            (Dialect::Groovy, "plugins {\n    id 'a' version '1.0' apply false\n}\napply plugin: 'b'\n"),
            (Dialect::Kotlin, "plugins {\n    id(\"a\") version \"1.0\" apply false\n}\napply(plugin = \"b\")\n"),
        ] {
            let mut tree = DslTree::new(dialect);
            let root = tree.root();
            let plugins = tree.ensure_block(root, BlockKind::Plugins).unwrap();
            let mut chain = indexmap::IndexMap::new();
            chain.insert("id".to_owned(), DslValue::from("a"));
            chain.insert("version".to_owned(), DslValue::from("1.0"));
            chain.insert("apply".to_owned(), DslValue::Boolean(false));
            tree.set_new_element(plugins, "id", NewElement::Named { entries: chain, syntax: ExternalSyntax::Infix })
                .unwrap();
            let mut named = indexmap::IndexMap::new();
            named.insert("plugin".to_owned(), DslValue::from("b"));
            let syntax = match dialect {
                Dialect::Groovy => ExternalSyntax::Command,
                Dialect::Kotlin => ExternalSyntax::Method,
            };
            tree.set_new_element(root, "apply", NewElement::Named { entries: named, syntax }).unwrap();

            assert_eq!(write_tree(&tree, &FormatOptions::default()), expected);
        }
    }

    #[test]
    fn test_write_kotlin_collections_and_extra() {
        let mut tree = DslTree::new(Dialect::Kotlin);
        let ext = tree.ensure_block(tree.root(), BlockKind::Ext).unwrap();
        let mut args = indexmap::IndexMap::new();
        args.insert("k".to_owned(), "v$1");
        tree.set_new_literal(ext, "args", args).unwrap();
        tree.set_new_literal(ext, "items", vec![1, 2]).unwrap();

        let text = write_tree(&tree, &FormatOptions { indent_size: 2 });
        assert_eq!(
            text,
            "extra[\"args\"] = mapOf(\"k\" to \"v\\$1\")\nextra[\"items\"] = listOf(1, 2)\n"
        );
    }

    #[test]
    fn test_write_string_escapes() {
        assert_eq!(groovy_string("it's"), "'it\\'s'");
        assert_eq!(groovy_key("clear-text"), "'clear-text'");
        assert_eq!(groovy_key("plugin"), "plugin");
    }
}
