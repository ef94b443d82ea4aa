//! Symbol metadata that resolved `Sym` nodes link to.
//!
//! The table is owned by the resolution pass. Tree nodes only carry the
//! [`SymbolId`]; everything else about a symbol lives here.

use std::collections::HashMap;

use bough_core::Symbol;
use cranelift_entity::PrimaryMap;

use crate::kind::NodeKind;
use crate::refs::{NodeRef, ScopeId, SymbolId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Module,
    Var,
    Let,
    Const,
    Param,
    GenericParam,
    Type,
    Field,
    EnumField,
    Label,
    Proc,
    Func,
    Method,
    Iterator,
    Converter,
    Template,
    Macro,
}

impl SymbolKind {
    /// Symbol kind declared by a named routine definition.
    pub fn of_routine(kind: NodeKind) -> Option<Self> {
        Some(match kind {
            NodeKind::ProcDef => SymbolKind::Proc,
            NodeKind::FuncDef => SymbolKind::Func,
            NodeKind::MethodDef => SymbolKind::Method,
            NodeKind::IteratorDef => SymbolKind::Iterator,
            NodeKind::ConverterDef => SymbolKind::Converter,
            NodeKind::TemplateDef => SymbolKind::Template,
            NodeKind::MacroDef => SymbolKind::Macro,
            _ => return None,
        })
    }
}

#[derive(Clone, Debug)]
pub struct SymbolInfo {
    pub name: Symbol,
    pub kind: SymbolKind,
    pub scope: ScopeId,
    /// Type expression node, once known.
    pub declared_type: Option<NodeRef>,
    /// Declaring node, when the symbol comes from source.
    pub decl: Option<NodeRef>,
}

#[derive(Debug, Default)]
struct ScopeData {
    parent: Option<ScopeId>,
    names: HashMap<Symbol, SymbolId>,
}

/// Symbols and the lexical scopes they are declared in.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: PrimaryMap<SymbolId, SymbolInfo>,
    scopes: PrimaryMap<ScopeId, ScopeData>,
    root: ScopeId,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut scopes = PrimaryMap::new();
        let root = scopes.push(ScopeData::default());
        Self {
            symbols: PrimaryMap::new(),
            scopes,
            root,
        }
    }

    pub fn root_scope(&self) -> ScopeId {
        self.root
    }

    pub fn push_scope(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(ScopeData {
            parent: Some(parent),
            names: HashMap::new(),
        })
    }

    pub fn parent_scope(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope].parent
    }

    /// Register a symbol in `info.scope`. A later declaration of the same
    /// name in the same scope shadows the earlier one for lookups.
    pub fn declare(&mut self, info: SymbolInfo) -> SymbolId {
        let (name, scope) = (info.name, info.scope);
        let id = self.symbols.push(info);
        self.scopes[scope].names.insert(name, id);
        tracing::trace!(%name, %id, %scope, "declared symbol");
        id
    }

    /// Innermost symbol named `name` visible from `scope`.
    pub fn lookup(&self, scope: ScopeId, name: Symbol) -> Option<SymbolId> {
        let mut cursor = Some(scope);
        while let Some(s) = cursor {
            let data = &self.scopes[s];
            if let Some(&id) = data.names.get(&name) {
                return Some(id);
            }
            cursor = data.parent;
        }
        None
    }

    pub fn get(&self, id: SymbolId) -> &SymbolInfo {
        &self.symbols[id]
    }

    /// Record the type of a symbol once inferred.
    pub fn set_declared_type(&mut self, id: SymbolId, ty: NodeRef) {
        self.symbols[id].declared_type = Some(ty);
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &SymbolInfo)> {
        self.symbols.iter()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AstContext;

    fn info(name: &str, kind: SymbolKind, scope: ScopeId) -> SymbolInfo {
        SymbolInfo {
            name: Symbol::from_dynamic(name),
            kind,
            scope,
            declared_type: None,
            decl: None,
        }
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let mut table = SymbolTable::new();
        let root = table.root_scope();
        let outer = table.declare(info("x", SymbolKind::Var, root));
        let inner_scope = table.push_scope(root);
        let inner = table.declare(info("x", SymbolKind::Param, inner_scope));

        let x = Symbol::from_dynamic("x");
        assert_eq!(table.lookup(inner_scope, x), Some(inner));
        assert_eq!(table.lookup(root, x), Some(outer));
        assert_eq!(table.lookup(root, Symbol::from_dynamic("y")), None);
        assert_eq!(table.parent_scope(inner_scope), Some(root));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn routine_kinds_map_to_symbol_kinds() {
        assert_eq!(SymbolKind::of_routine(NodeKind::MacroDef), Some(SymbolKind::Macro));
        assert_eq!(SymbolKind::of_routine(NodeKind::LambdaExpr), None);
        assert_eq!(SymbolKind::of_routine(NodeKind::Call), None);
    }

    #[test]
    fn resolution_links_nodes_to_table() {
        let mut ctx = AstContext::new();
        let mut table = SymbolTable::new();
        let root = table.root_scope();

        let int_ty = ctx.ident("int");
        let counter = table.declare(SymbolInfo {
            declared_type: Some(int_ty),
            ..info("counter", SymbolKind::Var, root)
        });

        let (target, one) = (ctx.ident("counter"), ctx.int_lit(1));
        let stmt = ctx.asgn(target, one).unwrap();
        let rewritten = ctx
            .rewrite_idents(stmt, |_, name| table.lookup(root, name))
            .unwrap();
        assert_eq!(rewritten, 1);

        let id = ctx.binding(target).unwrap();
        assert_eq!(id, counter);
        assert_eq!(table.get(id).declared_type, Some(int_ty));
        assert_eq!(table.get(id).kind, SymbolKind::Var);
    }
}
