use mexpr_scope::ScopeTree;
use mexpr_types::{ExprError, ExprResult, Value};

use super::{children_of, emit_all, eval_all};
use crate::compile::{fragment, DefTable, Fragment};
use crate::filter::{Attr, NodeKind};
use crate::Node;

/// A unary or binary operator, delegating to the builtin function `fn_name`.
#[derive(Debug)]
pub struct OperatorNode {
    /// Operator token, such as `+`.
    pub op: String,
    /// Builtin implementing it, such as `add`.
    pub fn_name: String,
    pub args: Vec<Box<dyn Node>>,
}

impl OperatorNode {
    pub fn new(op: &str, fn_name: &str, args: Vec<Box<dyn Node>>) -> Self {
        Self {
            op: op.to_string(),
            fn_name: fn_name.to_string(),
            args,
        }
    }

    pub fn binary(op: &str, fn_name: &str, lhs: Box<dyn Node>, rhs: Box<dyn Node>) -> Self {
        Self::new(op, fn_name, vec![lhs, rhs])
    }

    pub fn unary(op: &str, fn_name: &str, operand: Box<dyn Node>) -> Self {
        Self::new(op, fn_name, vec![operand])
    }

    fn render_arg(arg: &dyn Node) -> String {
        if arg.is_a(NodeKind::Operator) {
            format!("({})", arg.render())
        } else {
            arg.render()
        }
    }
}

impl Node for OperatorNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Operator
    }

    fn eval(&self, scopes: &mut ScopeTree) -> ExprResult<Value> {
        let func = scopes
            .builtins()
            .lookup(&self.fn_name)
            .ok_or_else(|| ExprError::UnresolvedSymbol(self.fn_name.clone()))?;
        let func = func.as_function().cloned().ok_or_else(|| {
            ExprError::TypeMismatch(format!("{} is not a function", self.fn_name))
        })?;
        let args = eval_all(&self.args, scopes)?;
        func.call(&args)
    }

    fn emit(&self, defs: &mut DefTable) -> ExprResult<Fragment> {
        let key = defs
            .define_builtin(&self.fn_name)
            .ok_or_else(|| ExprError::UnresolvedSymbol(self.fn_name.clone()))?;
        let args = emit_all(&self.args, defs)?;
        Ok(fragment(move |frame| {
            let values = args
                .iter()
                .map(|arg| arg(frame))
                .collect::<ExprResult<Vec<_>>>()?;
            frame.defs().call(key, &values)
        }))
    }

    fn children(&self) -> Vec<&dyn Node> {
        children_of(&self.args)
    }

    fn attr(&self, name: &str) -> Option<Attr> {
        match name {
            "op" => Some(Attr::from(self.op.as_str())),
            "fn" => Some(Attr::from(self.fn_name.as_str())),
            _ => None,
        }
    }

    fn render(&self) -> String {
        match self.args.as_slice() {
            [operand] => format!("{}{}", self.op, Self::render_arg(operand.as_ref())),
            args => args
                .iter()
                .map(|arg| Self::render_arg(arg.as_ref()))
                .collect::<Vec<_>>()
                .join(&format!(" {} ", self.op)),
        }
    }
}
