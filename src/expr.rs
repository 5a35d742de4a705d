//! A tiny recursive-descent parser for the function-expression notation used
//! throughout the scenario tables this crate is tested against: `f(a,b)`,
//! `f(a,b(c))`, or a bare symbol `f`.
//!
//! Teacher analogue: `test_utils.rs`'s `ctx().parse(...)` helpers, here
//! parsing this notation instead of handing source text to `tree-sitter`.

use std::{iter::Peekable, str::Chars};

use crate::{
    error::MappingFilterError,
    relation::Relation,
    tree::{NodeId, Tree},
};

struct ParsedNode {
    name: String,
    children: Vec<Self>,
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while matches!(chars.peek(), Some(c) if c.is_whitespace()) {
        chars.next();
    }
}

fn parse_ident(chars: &mut Peekable<Chars<'_>>) -> Result<String, MappingFilterError> {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    if name.is_empty() {
        return Err(MappingFilterError::new("expected an identifier"));
    }
    Ok(name)
}

fn parse_node(chars: &mut Peekable<Chars<'_>>) -> Result<ParsedNode, MappingFilterError> {
    skip_whitespace(chars);
    let name = parse_ident(chars)?;
    let mut children = Vec::new();
    skip_whitespace(chars);
    if chars.peek() == Some(&'(') {
        chars.next();
        loop {
            children.push(parse_node(chars)?);
            skip_whitespace(chars);
            match chars.next() {
                Some(',') => continue,
                Some(')') => break,
                other => return Err(MappingFilterError::new(format!("expected ',' or ')', found {other:?}"))),
            }
        }
    }
    Ok(ParsedNode { name, children })
}

fn build_children(tree: &mut Tree<()>, parent: NodeId, children: Vec<ParsedNode>) {
    for child in children {
        let id = tree.create_child(parent, child.name, ());
        build_children(tree, id, child.children);
    }
}

/// Parses a full expression such as `f(a,b(c))` into a tree.
pub fn parse_tree(input: &str) -> Result<Tree<()>, MappingFilterError> {
    let mut chars = input.chars().peekable();
    let parsed = parse_node(&mut chars)?;
    skip_whitespace(&mut chars);
    if chars.peek().is_some() {
        let rest: String = chars.collect();
        return Err(MappingFilterError::new(format!("unexpected trailing input: {rest:?}")));
    }
    let mut tree = Tree::create_root(parsed.name, ());
    let root = tree.root();
    build_children(&mut tree, root, parsed.children);
    Ok(tree)
}

/// Parses one of `EQ`, `MG`, `LG`, `DJ`, `IDK`, case-insensitively.
pub fn parse_relation(input: &str) -> Result<Relation, MappingFilterError> {
    match input.trim().to_uppercase().as_str() {
        "EQ" => Ok(Relation::Eq),
        "MG" => Ok(Relation::Mg),
        "LG" => Ok(Relation::Lg),
        "DJ" => Ok(Relation::Dj),
        "IDK" => Ok(Relation::Idk),
        other => Err(MappingFilterError::new(format!("unknown relation {other:?}, expected one of EQ/MG/LG/DJ/IDK"))),
    }
}

/// Parses a `name=name:REL` triple such as `a=b:EQ`.
pub fn parse_candidate_triple(input: &str) -> Result<(String, String, Relation), MappingFilterError> {
    let (pair, relation) = input
        .split_once(':')
        .ok_or_else(|| MappingFilterError::new(format!("expected 'name=name:REL', found {input:?}")))?;
    let (source_name, target_name) = pair
        .split_once('=')
        .ok_or_else(|| MappingFilterError::new(format!("expected 'name=name:REL', found {input:?}")))?;
    Ok((source_name.trim().to_string(), target_name.trim().to_string(), parse_relation(relation)?))
}

/// Finds the first node (in arena order) with the given name, by exact match.
pub fn find_by_name<M>(tree: &Tree<M>, name: &str) -> Option<NodeId> {
    tree.iter_nodes().find(|&id| tree.name(id) == name)
}
