//! MDX to plain text conversion

use crate::config::NodeKind;
use markdown::mdast::Node;
use markdown::{Constructs, MdxSignal, ParseOptions};
use std::collections::BTreeSet;
use thiserror::Error;

/// Reasons a single document yields no prose
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// The source is not valid MDX
    #[error("Failed to parse MDX: {0}")]
    Parse(String),

    /// Nothing but whitespace remained after filtering
    #[error("No content extracted")]
    Empty,
}

/// Parse MDX, drop `non_prose` nodes and flatten what remains to text
///
/// # Examples
///
/// ```
/// use herald_extractor::{extract_text, NodeKind};
///
/// let kinds = NodeKind::MDX.into_iter().collect();
/// let text = extract_text("# Hi\n\n<Badge />\n\nPlain words.", &kinds).unwrap();
/// assert_eq!(text, "Hi\n\nPlain words.");
/// ```
pub fn extract_text(source: &str, non_prose: &BTreeSet<NodeKind>) -> Result<String, MarkupError> {
    let options = ParseOptions {
        constructs: Constructs {
            frontmatter: true,
            ..Constructs::mdx()
        },
        mdx_esm_parse: Some(Box::new(accept_esm)),
        ..ParseOptions::mdx()
    };

    let mut tree =
        markdown::to_mdast(source, &options).map_err(|e| MarkupError::Parse(e.to_string()))?;

    prune(&mut tree, non_prose);

    let text = flatten(&tree);
    let text = text.trim();
    if text.is_empty() {
        return Err(MarkupError::Empty);
    }
    Ok(text.to_string())
}

/// ESM is only recognized when a parser is supplied; its content is
/// discarded, so every block is accepted as-is.
fn accept_esm(_source: &str) -> MdxSignal {
    MdxSignal::Ok
}

fn kind_of(node: &Node) -> Option<NodeKind> {
    let kind = match node {
        Node::MdxjsEsm(_) => NodeKind::MdxjsEsm,
        Node::MdxJsxFlowElement(_) => NodeKind::MdxJsxFlowElement,
        Node::MdxJsxTextElement(_) => NodeKind::MdxJsxTextElement,
        Node::MdxFlowExpression(_) => NodeKind::MdxFlowExpression,
        Node::MdxTextExpression(_) => NodeKind::MdxTextExpression,
        Node::Yaml(_) => NodeKind::Yaml,
        Node::Toml(_) => NodeKind::Toml,
        Node::Html(_) => NodeKind::Html,
        Node::Code(_) => NodeKind::Code,
        Node::InlineCode(_) => NodeKind::InlineCode,
        Node::Math(_) => NodeKind::Math,
        Node::InlineMath(_) => NodeKind::InlineMath,
        Node::Image(_) => NodeKind::Image,
        Node::Definition(_) => NodeKind::Definition,
        Node::FootnoteDefinition(_) => NodeKind::FootnoteDefinition,
        _ => return None,
    };
    Some(kind)
}

fn is_removed(node: &Node, non_prose: &BTreeSet<NodeKind>) -> bool {
    kind_of(node).is_some_and(|kind| non_prose.contains(&kind))
}

/// Remove matching nodes (with their subtrees) everywhere below `node`
fn prune(node: &mut Node, non_prose: &BTreeSet<NodeKind>) {
    if let Some(children) = node.children_mut() {
        children.retain(|child| !is_removed(child, non_prose));
        for child in children.iter_mut() {
            prune(child, non_prose);
        }
    }
}

/// Separator placed between the flattened children of a parent
fn child_separator(node: &Node) -> &'static str {
    match node {
        Node::Root(_)
        | Node::Blockquote(_)
        | Node::FootnoteDefinition(_)
        | Node::MdxJsxFlowElement(_) => "\n\n",
        Node::List(_) | Node::ListItem(_) | Node::Table(_) => "\n",
        Node::TableRow(_) => " | ",
        _ => "",
    }
}

fn flatten(node: &Node) -> String {
    match node {
        Node::Text(x) => x.value.clone(),
        Node::InlineCode(x) => x.value.clone(),
        Node::Code(x) => x.value.clone(),
        Node::Html(x) => x.value.clone(),
        Node::Math(x) => x.value.clone(),
        Node::InlineMath(x) => x.value.clone(),
        Node::Yaml(x) => x.value.clone(),
        Node::Toml(x) => x.value.clone(),
        Node::MdxjsEsm(x) => x.value.clone(),
        Node::MdxFlowExpression(x) => x.value.clone(),
        Node::MdxTextExpression(x) => x.value.clone(),
        Node::Image(x) => x.alt.clone(),
        Node::ImageReference(x) => x.alt.clone(),
        Node::Break(_) => "\n".to_string(),
        _ => {
            let Some(children) = node.children() else {
                return String::new();
            };
            let separator = child_separator(node);
            if separator.is_empty() {
                children.iter().map(flatten).collect()
            } else {
                children
                    .iter()
                    .map(flatten)
                    .filter(|text| !text.trim().is_empty())
                    .collect::<Vec<_>>()
                    .join(separator)
            }
        }
    }
}
