//! The shape table: required arity and slot contents per compound kind.
//!
//! Producers must emit exactly these shapes and consumers may rely on them.
//! [`check_shape`] is run by every checked constructor and by
//! [`crate::validation`] for trees assembled incrementally.

use std::fmt;

use crate::context::AstContext;
use crate::error::{AstError, AstResult};
use crate::kind::NodeKind;
use crate::refs::NodeRef;

/// Number of children a compound kind admits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Between(usize, usize),
}

impl Arity {
    pub const ANY: Arity = Arity::AtLeast(0);

    pub fn admits(self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == k,
            Arity::AtLeast(k) => n >= k,
            Arity::Between(lo, hi) => (lo..=hi).contains(&n),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(k) => write!(f, "exactly {k}"),
            Arity::AtLeast(k) => write!(f, "at least {k}"),
            Arity::Between(lo, hi) => write!(f, "{lo} to {hi}"),
        }
    }
}

impl NodeKind {
    /// Child arity of a compound kind; `None` for scalar kinds.
    pub const fn arity(self) -> Option<Arity> {
        use NodeKind::*;
        let arity = match self {
            Empty | Ident | Sym | CharLit | IntLit | Int8Lit | Int16Lit | Int32Lit | Int64Lit
            | UIntLit | UInt8Lit | UInt16Lit | UInt32Lit | UInt64Lit | FloatLit | Float32Lit
            | Float64Lit | StrLit | RStrLit | TripleStrLit | NilLit | CommentStmt => return None,

            Call | Command => Arity::AtLeast(1),
            CallStrLit => Arity::Exact(2),
            Infix => Arity::Exact(3),
            Prefix | Postfix => Arity::Exact(2),

            ExprEqExpr | ExprColonExpr | DotExpr | Cast | PragmaExpr | Range => Arity::Exact(2),
            BracketExpr => Arity::AtLeast(2),
            Par | DerefExpr | Addr | ElseExpr => Arity::Exact(1),
            TupleConstr | Bracket | Curly | TableConstr => Arity::ANY,
            ObjConstr | AccQuoted | StmtListExpr => Arity::AtLeast(1),
            IfExpr => Arity::AtLeast(1),
            ElifExpr => Arity::Exact(2),
            LambdaExpr | DoExpr => Arity::Exact(7),
            BlockExpr => Arity::Exact(2),

            StmtList => Arity::ANY,
            Asgn | WhileStmt | BlockStmt | AsmStmt | PragmaBlock | ElifBranch => Arity::Exact(2),
            IfStmt | WhenStmt => Arity::AtLeast(1),
            Else | Finally | DeferStmt | StaticStmt => Arity::Exact(1),
            CaseStmt | OfBranch | TryStmt => Arity::AtLeast(2),
            ForStmt => Arity::AtLeast(3),
            ExceptBranch => Arity::AtLeast(1),
            ReturnStmt | YieldStmt | DiscardStmt | RaiseStmt | BreakStmt | ContinueStmt => {
                Arity::Exact(1)
            }
            ImportStmt | ExportStmt | IncludeStmt | MixinStmt | BindStmt | UsingStmt => {
                Arity::AtLeast(1)
            }
            ImportExceptStmt | ExportExceptStmt | FromStmt => Arity::AtLeast(2),

            VarSection | LetSection | ConstSection | TypeSection => Arity::AtLeast(1),
            IdentDefs | VarTuple => Arity::AtLeast(3),
            ConstDef | TypeDef => Arity::Exact(3),
            GenericParams | FormalParams | Pragma => Arity::AtLeast(1),
            ProcDef | FuncDef | MethodDef | IteratorDef | ConverterDef | TemplateDef
            | MacroDef => Arity::Exact(7),
            EnumFieldDef => Arity::Exact(2),

            ObjectTy => Arity::Exact(3),
            OfInherit | DistinctTy => Arity::Exact(1),
            RecList | TupleTy => Arity::ANY,
            RecCase => Arity::AtLeast(2),
            RecWhen | EnumTy | TypeOfExpr => Arity::AtLeast(1),
            ProcTy | IteratorTy => Arity::Exact(2),
            RefTy | PtrTy | VarTy => Arity::Between(0, 1),
        };
        Some(arity)
    }
}

const NAMES: &[NodeKind] = &[NodeKind::Ident, NodeKind::Sym, NodeKind::AccQuoted];
const DECL_NAMES: &[NodeKind] = &[
    NodeKind::Ident,
    NodeKind::Sym,
    NodeKind::AccQuoted,
    NodeKind::Postfix,
    NodeKind::PragmaExpr,
];
const LABELS: &[NodeKind] = &[NodeKind::Empty, NodeKind::Ident, NodeKind::Sym];
const PRAGMA_OR_EMPTY: &[NodeKind] = &[NodeKind::Empty, NodeKind::Pragma];
const RAW_TEXT: &[NodeKind] = &[NodeKind::RStrLit, NodeKind::TripleStrLit];
const STRINGS: &[NodeKind] = &[NodeKind::StrLit, NodeKind::RStrLit, NodeKind::TripleStrLit];
const PRAGMA_ENTRIES: &[NodeKind] = &[
    NodeKind::Ident,
    NodeKind::Sym,
    NodeKind::AccQuoted,
    NodeKind::ExprColonExpr,
    NodeKind::Call,
];
const LOOP_VARS: &[NodeKind] = &[
    NodeKind::Ident,
    NodeKind::Sym,
    NodeKind::AccQuoted,
    NodeKind::VarTuple,
];
const FIELDS: &[NodeKind] = &[
    NodeKind::IdentDefs,
    NodeKind::RecCase,
    NodeKind::RecWhen,
    NodeKind::NilLit,
    NodeKind::CommentStmt,
];
const ENUM_FIELDS: &[NodeKind] = &[
    NodeKind::Ident,
    NodeKind::Sym,
    NodeKind::AccQuoted,
    NodeKind::EnumFieldDef,
];
const VAR_ENTRIES: &[NodeKind] = &[
    NodeKind::IdentDefs,
    NodeKind::VarTuple,
    NodeKind::CommentStmt,
];

/// Check that `children` form a valid `kind` node.
pub(crate) fn check_shape(
    ctx: &AstContext,
    kind: NodeKind,
    children: &[NodeRef],
) -> AstResult<()> {
    let Some(arity) = kind.arity() else {
        return Err(AstError::malformed(kind, "not a compound kind"));
    };
    if !arity.admits(children.len()) {
        return Err(AstError::malformed(
            kind,
            format_args!("expected {arity} children, found {}", children.len()),
        ));
    }
    let slots = Slots {
        ctx,
        kind,
        children,
    };
    slots.check_ranges()?;
    slots.check_rules()
}

struct Slots<'a> {
    ctx: &'a AstContext,
    kind: NodeKind,
    children: &'a [NodeRef],
}

impl Slots<'_> {
    fn len(&self) -> usize {
        self.children.len()
    }

    fn all(&self) -> std::ops::Range<usize> {
        0..self.len()
    }

    fn at(&self, i: usize) -> NodeKind {
        self.ctx.kind(self.children[i])
    }

    fn fail(&self, reason: impl fmt::Display) -> AstError {
        AstError::malformed(self.kind, reason)
    }

    fn present(&self, i: usize, what: &str) -> AstResult<()> {
        if self.at(i) == NodeKind::Empty {
            return Err(self.fail(format_args!("{what} (child {i}) may not be absent")));
        }
        Ok(())
    }

    fn all_present(&self, range: std::ops::Range<usize>, what: &str) -> AstResult<()> {
        range.into_iter().try_for_each(|i| self.present(i, what))
    }

    fn one_of(&self, i: usize, allowed: &[NodeKind], what: &str) -> AstResult<()> {
        let found = self.at(i);
        if allowed.contains(&found) {
            return Ok(());
        }
        let expected = allowed
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(" or ");
        Err(self.fail(format_args!(
            "{what} (child {i}) must be {expected}, found {found}"
        )))
    }

    fn all_one_of(
        &self,
        range: std::ops::Range<usize>,
        allowed: &[NodeKind],
        what: &str,
    ) -> AstResult<()> {
        range.into_iter().try_for_each(|i| self.one_of(i, allowed, what))
    }

    /// `Range` is reserved for case-branch values.
    fn check_ranges(&self) -> AstResult<()> {
        for i in self.all() {
            let is_branch_value = self.kind == NodeKind::OfBranch && i + 1 < self.len();
            if self.at(i) == NodeKind::Range && !is_branch_value {
                return Err(self.fail(format_args!(
                    "Range (child {i}) is only valid as a case branch value; \
                     use an infix `..` elsewhere"
                )));
            }
        }
        Ok(())
    }

    /// `branch...` optionally followed by one trailing `otherwise`, starting
    /// at child `from`.
    fn branches(
        &self,
        from: usize,
        branch: &[NodeKind],
        otherwise: NodeKind,
    ) -> AstResult<()> {
        for i in from..self.len() {
            if self.at(i) != otherwise {
                self.one_of(i, branch, "branch")?;
            } else if i + 1 != self.len() {
                return Err(self.fail(format_args!("{otherwise} (child {i}) must come last")));
            } else if i == from {
                return Err(self.fail(format_args!("{otherwise} needs a preceding branch")));
            }
        }
        Ok(())
    }

    /// Every branch from child `from` on must end in a field list.
    fn branch_bodies_are_fields(&self, from: usize) -> AstResult<()> {
        for i in from..self.len() {
            let body = self.ctx.last_child(self.children[i])?;
            let body_kind = body.map(|b| self.ctx.kind(b));
            if body_kind != Some(NodeKind::RecList) {
                return Err(self.fail(format_args!(
                    "branch (child {i}) must end in a RecList field list"
                )));
            }
        }
        Ok(())
    }

    fn routine(&self) -> AstResult<()> {
        if matches!(self.kind, NodeKind::LambdaExpr | NodeKind::DoExpr) {
            self.one_of(0, &[NodeKind::Empty], "anonymous routine name")?;
        } else {
            self.one_of(0, DECL_NAMES, "name")?;
        }
        self.one_of(2, &[NodeKind::Empty, NodeKind::GenericParams], "generic parameters")?;
        self.one_of(3, &[NodeKind::FormalParams], "formal parameters")?;
        self.one_of(4, PRAGMA_OR_EMPTY, "pragmas")?;
        self.one_of(5, &[NodeKind::Empty], "reserved slot")
    }

    fn check_rules(&self) -> AstResult<()> {
        use NodeKind::*;
        let n = self.len();
        match self.kind {
            Empty | Ident | Sym | CharLit | IntLit | Int8Lit | Int16Lit | Int32Lit | Int64Lit
            | UIntLit | UInt8Lit | UInt16Lit | UInt32Lit | UInt64Lit | FloatLit | Float32Lit
            | Float64Lit | StrLit | RStrLit | TripleStrLit | NilLit | CommentStmt => {
                Err(self.fail("not a compound kind"))
            }

            Call | Command => self.present(0, "callee"),
            CallStrLit => {
                self.present(0, "callee")?;
                self.one_of(1, RAW_TEXT, "text argument")
            }
            Infix => {
                self.one_of(0, NAMES, "operator")?;
                self.all_present(1..3, "operand")
            }
            Prefix | Postfix => {
                self.one_of(0, NAMES, "operator")?;
                self.present(1, "operand")
            }

            ExprEqExpr | ExprColonExpr => self.all_present(self.all(), "pair element"),
            DotExpr => {
                self.present(0, "object")?;
                self.one_of(1, NAMES, "member")
            }
            BracketExpr => self.all_present(self.all(), "object or index"),
            Par => self.present(0, "inner expression"),
            Bracket | Curly => self.all_present(self.all(), "element"),
            TupleConstr => {
                let named = (0..n).filter(|&i| self.at(i) == ExprColonExpr).count();
                if named != 0 && named != n {
                    return Err(self.fail("tuple elements must be all named or all positional"));
                }
                self.all_present(self.all(), "element")
            }
            TableConstr => self.all_one_of(self.all(), &[ExprColonExpr], "table entry"),
            ObjConstr => {
                self.present(0, "type")?;
                self.all_one_of(1..n, &[ExprColonExpr], "field initializer")
            }
            IfExpr => self.branches(0, &[ElifExpr], ElseExpr),
            ElifExpr => self.all_present(self.all(), "condition or value"),
            ElseExpr => self.present(0, "value"),
            Range => self.all_present(self.all(), "bound"),
            DerefExpr | Addr => self.present(0, "operand"),
            Cast => {
                self.present(0, "type")?;
                self.present(1, "operand")
            }
            AccQuoted => self.all_one_of(self.all(), &[Ident], "quoted part"),
            PragmaExpr => {
                self.present(0, "subject")?;
                self.one_of(1, &[Pragma], "pragma")
            }
            LambdaExpr | DoExpr | ProcDef | FuncDef | MethodDef | IteratorDef | ConverterDef
            | TemplateDef | MacroDef => self.routine(),
            StmtListExpr => self.present(n - 1, "value"),
            BlockExpr | BlockStmt => {
                self.one_of(0, LABELS, "label")?;
                self.present(1, "body")
            }

            StmtList => Ok(()),
            Asgn => self.all_present(self.all(), "assignment side"),
            IfStmt | WhenStmt => self.branches(0, &[ElifBranch], Else),
            ElifBranch => self.all_present(self.all(), "condition or body"),
            Else => self.present(0, "body"),
            CaseStmt => {
                self.present(0, "subject")?;
                self.branches(1, &[OfBranch, ElifBranch], Else)
            }
            OfBranch => self.all_present(self.all(), "branch value or body"),
            WhileStmt => self.all_present(self.all(), "condition or body"),
            ForStmt => {
                self.all_one_of(0..n - 2, LOOP_VARS, "loop variable")?;
                self.present(n - 2, "iterable")?;
                self.present(n - 1, "body")
            }
            TryStmt => {
                self.present(0, "body")?;
                for i in 1..n {
                    if self.at(i) != Finally {
                        self.one_of(i, &[ExceptBranch], "handler")?;
                    } else if i + 1 != n {
                        return Err(self.fail(format_args!("Finally (child {i}) must come last")));
                    }
                }
                Ok(())
            }
            ExceptBranch => self.all_present(self.all(), "exception type or handler"),
            Finally => self.present(0, "body"),
            ReturnStmt | YieldStmt | DiscardStmt | RaiseStmt => Ok(()),
            BreakStmt | ContinueStmt => self.one_of(0, LABELS, "label"),
            DeferStmt | StaticStmt => self.present(0, "body"),
            AsmStmt => {
                self.one_of(0, PRAGMA_OR_EMPTY, "pragmas")?;
                self.one_of(1, STRINGS, "assembly text")
            }
            PragmaBlock => {
                self.one_of(0, &[Pragma], "pragma")?;
                self.present(1, "body")
            }
            ImportStmt | ExportStmt | IncludeStmt | ImportExceptStmt | ExportExceptStmt
            | FromStmt => self.all_present(self.all(), "module or name"),
            MixinStmt | BindStmt => self.all_one_of(self.all(), NAMES, "name"),
            UsingStmt => self.all_one_of(self.all(), &[IdentDefs], "using entry"),

            VarSection | LetSection => {
                self.all_one_of(self.all(), VAR_ENTRIES, "binding")?;
                self.bindings_have_type_or_value()
            }
            ConstSection => self.all_one_of(self.all(), &[ConstDef, CommentStmt], "constant"),
            TypeSection => self.all_one_of(self.all(), &[TypeDef, CommentStmt], "type entry"),
            IdentDefs => self.all_one_of(0..n - 2, DECL_NAMES, "bound name"),
            VarTuple => {
                self.all_one_of(0..n - 2, DECL_NAMES, "bound name")?;
                self.one_of(n - 2, &[Empty], "type slot")?;
                self.present(n - 1, "value")
            }
            ConstDef => {
                self.one_of(0, DECL_NAMES, "name")?;
                self.present(2, "constant value")
            }
            TypeDef => {
                self.one_of(0, DECL_NAMES, "name")?;
                self.one_of(1, &[Empty, GenericParams], "generic parameters")?;
                self.present(2, "type body")
            }
            GenericParams => self.all_one_of(self.all(), &[IdentDefs], "generic parameter"),
            FormalParams => self.all_one_of(1..n, &[IdentDefs], "parameter"),
            Pragma => self.all_one_of(self.all(), PRAGMA_ENTRIES, "pragma entry"),
            EnumFieldDef => {
                self.one_of(0, NAMES, "name")?;
                self.present(1, "value")
            }

            ObjectTy => {
                self.one_of(0, PRAGMA_OR_EMPTY, "pragmas")?;
                self.one_of(1, &[Empty, OfInherit], "base type")?;
                self.one_of(2, &[Empty, RecList], "field list")
            }
            OfInherit => self.present(0, "base type"),
            RecList => self.all_one_of(self.all(), FIELDS, "field"),
            RecCase => {
                self.one_of(0, &[IdentDefs], "discriminator")?;
                self.branches(1, &[OfBranch], Else)?;
                self.branch_bodies_are_fields(1)
            }
            RecWhen => {
                self.branches(0, &[ElifBranch], Else)?;
                self.branch_bodies_are_fields(0)
            }
            EnumTy => {
                self.one_of(0, PRAGMA_OR_EMPTY, "pragmas")?;
                self.all_one_of(1..n, ENUM_FIELDS, "enum field")
            }
            TupleTy => self.all_one_of(self.all(), &[IdentDefs], "tuple field"),
            ProcTy | IteratorTy => {
                self.one_of(0, &[FormalParams], "formal parameters")?;
                self.one_of(1, PRAGMA_OR_EMPTY, "pragmas")
            }
            RefTy | PtrTy | VarTy => self.all_present(self.all(), "target type"),
            DistinctTy => self.present(0, "base type"),
            TypeOfExpr => self.all_present(self.all(), "operand"),
        }
    }

    /// A `var`/`let` entry needs a type, a value, or both.
    fn bindings_have_type_or_value(&self) -> AstResult<()> {
        for (i, &child) in self.children.iter().enumerate() {
            if self.ctx.kind(child) != NodeKind::IdentDefs {
                continue;
            }
            let slots = self.ctx.children(child)?;
            let untyped = slots.len() < 2
                || slots[slots.len() - 2..]
                    .iter()
                    .all(|&s| self.ctx.is_empty(s));
            if untyped {
                return Err(self.fail(format_args!(
                    "binding (child {i}) needs a type or a value"
                )));
            }
        }
        Ok(())
    }
}
