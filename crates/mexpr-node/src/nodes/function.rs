use mexpr_scope::{ScopeId, ScopeTree, SymbolId};
use mexpr_types::{ExprError, ExprResult, Value};

use super::{children_of, emit_all, eval_all};
use crate::compile::{fragment, DefTable, Fragment};
use crate::filter::{Attr, NodeKind};
use crate::Node;

/// `name(args...)`
#[derive(Debug)]
pub struct FunctionNode {
    pub name: String,
    pub args: Vec<Box<dyn Node>>,
    symbol: SymbolId,
}

impl FunctionNode {
    /// Register a link to the callee `name` in `scope`.
    pub fn new(scopes: &mut ScopeTree, scope: ScopeId, name: &str, args: Vec<Box<dyn Node>>) -> Self {
        Self {
            name: name.to_string(),
            args,
            symbol: scopes.create_link(scope, name),
        }
    }

    pub fn symbol(&self) -> SymbolId {
        self.symbol
    }
}

fn call(name: &str, callee: &Value, args: &[Value]) -> ExprResult<Value> {
    match callee {
        Value::Function(func) => func.call(args),
        Value::Undefined => Err(ExprError::UnresolvedSymbol(name.to_string())),
        other => Err(ExprError::TypeMismatch(format!(
            "{name} is a {}, not a function",
            other.type_name()
        ))),
    }
}

impl Node for FunctionNode {
    fn kind(&self) -> NodeKind {
        NodeKind::Function
    }

    fn eval(&self, scopes: &mut ScopeTree) -> ExprResult<Value> {
        let callee = scopes.get(self.symbol)?;
        let args = eval_all(&self.args, scopes)?;
        call(&self.name, &callee, &args)
    }

    fn emit(&self, defs: &mut DefTable) -> ExprResult<Fragment> {
        let name = self.name.clone();
        let fallback = defs.define_builtin(&name);
        let args = emit_all(&self.args, defs)?;
        Ok(fragment(move |frame| {
            let callee = frame.resolve(&name, fallback)?;
            let values = args
                .iter()
                .map(|arg| arg(frame))
                .collect::<ExprResult<Vec<_>>>()?;
            call(&name, &callee, &values)
        }))
    }

    fn children(&self) -> Vec<&dyn Node> {
        children_of(&self.args)
    }

    fn attr(&self, name: &str) -> Option<Attr> {
        match name {
            "name" => Some(Attr::from(self.name.as_str())),
            _ => None,
        }
    }

    fn render(&self) -> String {
        let args: Vec<String> = self.args.iter().map(|arg| arg.render()).collect();
        format!("{}({})", self.name, args.join(", "))
    }
}
