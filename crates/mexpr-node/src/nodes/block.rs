use mexpr_scope::ScopeTree;
use mexpr_types::{ExprResult, Value};

use crate::compile::{fragment, DefTable, Fragment};
use crate::filter::NodeKind;
use crate::Node;

/// One statement of a [`BlockNode`].
#[derive(Debug)]
pub struct BlockEntry {
    pub node: Box<dyn Node>,
    /// Whether the result is part of the block's value. A statement
    /// terminated with `;` is hidden.
    pub visible: bool,
}

impl BlockEntry {
    pub fn visible(node: Box<dyn Node>) -> Self {
        Self {
            node,
            visible: true,
        }
    }

    pub fn hidden(node: Box<dyn Node>) -> Self {
        Self {
            node,
            visible: false,
        }
    }
}

/// A sequence of statements evaluating to the list of its visible results.
#[derive(Debug, Default)]
pub struct BlockNode {
    pub entries: Vec<BlockEntry>,
}

impl BlockNode {
    pub fn new(entries: Vec<BlockEntry>) -> Self {
        Self { entries }
    }
}

impl Node for BlockNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Block
    }

    fn eval(&self, scopes: &mut ScopeTree) -> ExprResult<Value> {
        let mut results = Vec::new();
        for entry in &self.entries {
            let value = entry.node.eval(scopes)?;
            if entry.visible {
                results.push(value);
            }
        }
        Ok(Value::List(results))
    }

    fn emit(&self, defs: &mut DefTable) -> ExprResult<Fragment> {
        let entries = self
            .entries
            .iter()
            .map(|entry| -> ExprResult<(Fragment, bool)> {
                Ok((entry.node.emit(defs)?, entry.visible))
            })
            .collect::<ExprResult<Vec<_>>>()?;
        Ok(fragment(move |frame| {
            let mut results = Vec::new();
            for (entry, visible) in &entries {
                let value = entry(frame)?;
                if *visible {
                    results.push(value);
                }
            }
            Ok(Value::List(results))
        }))
    }

    fn children(&self) -> Vec<&dyn Node> {
        self.entries.iter().map(|entry| entry.node.as_ref()).collect()
    }

    fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                let text = entry.node.render();
                if entry.visible {
                    text
                } else {
                    format!("{text};")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
