//! The closed node kind taxonomy.
//!
//! Every kind fixes two things up front: which payload a node of that kind
//! carries ([`PayloadClass`]) and which family of constructs it belongs to
//! ([`KindClass`]). Child arity and slot rules for compound kinds live in
//! [`crate::shape`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// The single payload variant a node carries, determined by its kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PayloadClass {
    None,
    Int,
    Float,
    Text,
    Children,
}

impl fmt::Display for PayloadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PayloadClass::None => "no",
            PayloadClass::Int => "integer",
            PayloadClass::Float => "float",
            PayloadClass::Text => "text",
            PayloadClass::Children => "child-list",
        })
    }
}

/// Construct family of a kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KindClass {
    /// Literals, identifiers and resolved symbols.
    Atom,
    /// Calls and operator applications.
    OperatorCall,
    Expression,
    Statement,
    Declaration,
    TypeExpr,
    /// The absence sentinel.
    Special,
}

macro_rules! node_kinds {
    ($($(#[$attr:meta])* $name:ident: $payload:ident, $class:ident;)*) => {
        /// Tag identifying a node's construct and payload class.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum NodeKind {
            $($(#[$attr])* $name,)*
        }

        impl NodeKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$name,)*];

            pub const fn name(self) -> &'static str {
                match self {
                    $(NodeKind::$name => stringify!($name),)*
                }
            }

            pub const fn payload_class(self) -> PayloadClass {
                match self {
                    $(NodeKind::$name => PayloadClass::$payload,)*
                }
            }

            pub const fn class(self) -> KindClass {
                match self {
                    $(NodeKind::$name => KindClass::$class,)*
                }
            }
        }
    };
}

node_kinds! {
    /// Absence sentinel filling an optional slot. No payload, no children.
    Empty: None, Special;

    /// Unresolved name. Text payload.
    Ident: Text, Atom;
    /// Name linked to symbol metadata by the resolution pass. Only produced
    /// by rewriting an `Ident` or by `make_sym`.
    Sym: Text, Atom;
    /// Character literal, byte-valued.
    CharLit: Int, Atom;
    IntLit: Int, Atom;
    Int8Lit: Int, Atom;
    Int16Lit: Int, Atom;
    Int32Lit: Int, Atom;
    Int64Lit: Int, Atom;
    /// Unsigned literal; values above `i64::MAX` are stored as raw bits.
    UIntLit: Int, Atom;
    UInt8Lit: Int, Atom;
    UInt16Lit: Int, Atom;
    UInt32Lit: Int, Atom;
    UInt64Lit: Int, Atom;
    FloatLit: Float, Atom;
    Float32Lit: Float, Atom;
    Float64Lit: Float, Atom;
    StrLit: Text, Atom;
    /// Raw string literal, `r"..."`.
    RStrLit: Text, Atom;
    /// Triple-quoted string literal.
    TripleStrLit: Text, Atom;
    NilLit: None, Atom;

    /// `f(a, b)`: `[callee, arg...]`.
    Call: Children, OperatorCall;
    /// `f a, b`: same shape as `Call`.
    Command: Children, OperatorCall;
    /// `f"raw text"`: `[callee, RStrLit | TripleStrLit]`.
    CallStrLit: Children, OperatorCall;
    /// `a + b`: `[op, left, right]`.
    Infix: Children, OperatorCall;
    /// `-a`: `[op, operand]`.
    Prefix: Children, OperatorCall;
    /// Postfix marker such as the export `*`: `[op, operand]`.
    Postfix: Children, OperatorCall;

    /// Named argument `name = value`: `[name, value]`.
    ExprEqExpr: Children, Expression;
    /// `name: value` pair in tables, object constructors and pragmas.
    ExprColonExpr: Children, Expression;
    /// `a.b`: `[object, member]`.
    DotExpr: Children, Expression;
    /// `a[i, j]`: `[object, index...]`.
    BracketExpr: Children, Expression;
    /// `(a)`: `[inner]`.
    Par: Children, Expression;
    /// `(a, b)` or `(x: 1, y: 2)`.
    TupleConstr: Children, Expression;
    /// `[a, b]`.
    Bracket: Children, Expression;
    /// `{a, b}`.
    Curly: Children, Expression;
    /// `{k: v, ...}`: every child is an `ExprColonExpr`.
    TableConstr: Children, Expression;
    /// `T(field: value, ...)`: `[type, ExprColonExpr...]`.
    ObjConstr: Children, Expression;
    /// `if c: a elif d: b else: e` in expression position.
    IfExpr: Children, Expression;
    /// `[condition, value]` branch of an `IfExpr`.
    ElifExpr: Children, Expression;
    /// `[value]` fallback of an `IfExpr`.
    ElseExpr: Children, Expression;
    /// `lo..hi` as a case-branch value: `[low, high]`.
    Range: Children, Expression;
    /// `a[]`: `[operand]`.
    DerefExpr: Children, Expression;
    /// `addr a`: `[operand]`.
    Addr: Children, Expression;
    /// `cast[T](a)`: `[type, operand]`.
    Cast: Children, Expression;
    /// Backtick-quoted identifier: `[Ident...]`.
    AccQuoted: Children, Expression;
    /// `subject {.pragma.}`: `[subject, Pragma]`.
    PragmaExpr: Children, Expression;
    /// Anonymous routine, same seven slots as `ProcDef` with an empty name.
    LambdaExpr: Children, Expression;
    /// `do` block argument, same seven slots as `LambdaExpr`.
    DoExpr: Children, Expression;
    /// Statements followed by a value: `[stmt..., value]`.
    StmtListExpr: Children, Expression;
    /// Labeled block in expression position: `[label | Empty, body]`.
    BlockExpr: Children, Expression;

    /// Statement sequence of any length.
    StmtList: Children, Statement;
    /// `a = b`: `[target, value]`.
    Asgn: Children, Statement;
    /// `ElifBranch...` then an optional `Else`.
    IfStmt: Children, Statement;
    /// Compile-time conditional, same shape as `IfStmt`.
    WhenStmt: Children, Statement;
    /// `[condition, body]`.
    ElifBranch: Children, Statement;
    /// `[body]`.
    Else: Children, Statement;
    /// `[subject, OfBranch | ElifBranch..., Else?]`.
    CaseStmt: Children, Statement;
    /// `[value..., body]`; values may be `Range` nodes.
    OfBranch: Children, Statement;
    /// `[condition, body]`.
    WhileStmt: Children, Statement;
    /// `[var..., iterable, body]`.
    ForStmt: Children, Statement;
    /// `[body, ExceptBranch..., Finally?]`.
    TryStmt: Children, Statement;
    /// `[type..., body]`; with only a body it catches everything.
    ExceptBranch: Children, Statement;
    /// `[body]`.
    Finally: Children, Statement;
    /// `[value | Empty]`.
    ReturnStmt: Children, Statement;
    /// `[value | Empty]`.
    YieldStmt: Children, Statement;
    /// `[value | Empty]`.
    DiscardStmt: Children, Statement;
    /// `[value | Empty]`.
    RaiseStmt: Children, Statement;
    /// `[label | Empty]`.
    BreakStmt: Children, Statement;
    /// `[label | Empty]`.
    ContinueStmt: Children, Statement;
    /// `[label | Empty, body]`.
    BlockStmt: Children, Statement;
    /// `[body]`.
    DeferStmt: Children, Statement;
    /// `[body]`.
    StaticStmt: Children, Statement;
    /// `[Pragma | Empty, string literal]`.
    AsmStmt: Children, Statement;
    /// `[Pragma, body]`.
    PragmaBlock: Children, Statement;
    /// `[module...]`; `import m as n` is `Infix("as", m, n)`.
    ImportStmt: Children, Statement;
    /// `[module, excluded...]`.
    ImportExceptStmt: Children, Statement;
    /// `from m import a, b`: `[module, name...]`.
    FromStmt: Children, Statement;
    /// `[module...]`.
    ExportStmt: Children, Statement;
    /// `[module, excluded...]`.
    ExportExceptStmt: Children, Statement;
    /// `[module...]`.
    IncludeStmt: Children, Statement;
    /// `[name...]`.
    MixinStmt: Children, Statement;
    /// `[name...]`.
    BindStmt: Children, Statement;
    /// `[IdentDefs...]`.
    UsingStmt: Children, Statement;
    /// Documentation comment; contiguous lines share one node.
    CommentStmt: Text, Statement;

    /// `var` section of `IdentDefs` / `VarTuple` entries.
    VarSection: Children, Declaration;
    /// `let` section, same shape as `VarSection`.
    LetSection: Children, Declaration;
    /// `const` section of `ConstDef` entries.
    ConstSection: Children, Declaration;
    /// `type` section of `TypeDef` entries.
    TypeSection: Children, Declaration;
    /// `[name..., type | Empty, value | Empty]`.
    IdentDefs: Children, Declaration;
    /// `let (a, b) = v`: `[name..., Empty, value]`.
    VarTuple: Children, Declaration;
    /// `[name, type | Empty, value]`.
    ConstDef: Children, Declaration;
    /// `[name, GenericParams | Empty, body]`.
    TypeDef: Children, Declaration;
    /// `[IdentDefs...]`.
    GenericParams: Children, Declaration;
    /// `[return type | Empty, IdentDefs...]`.
    FormalParams: Children, Declaration;
    /// `{.a, b: c.}`: entries are names, `ExprColonExpr` or calls.
    Pragma: Children, Declaration;
    /// `[name, pattern, generics, FormalParams, pragmas, reserved, body]`.
    ProcDef: Children, Declaration;
    FuncDef: Children, Declaration;
    MethodDef: Children, Declaration;
    IteratorDef: Children, Declaration;
    ConverterDef: Children, Declaration;
    TemplateDef: Children, Declaration;
    MacroDef: Children, Declaration;
    /// Enum member with explicit value: `[name, value]`.
    EnumFieldDef: Children, Declaration;

    /// `[Pragma | Empty, OfInherit | Empty, RecList | Empty]`.
    ObjectTy: Children, TypeExpr;
    /// `of Base`: `[base type]`.
    OfInherit: Children, TypeExpr;
    /// Object field list.
    RecList: Children, TypeExpr;
    /// Discriminated variant group: `[IdentDefs, OfBranch..., Else?]`.
    RecCase: Children, TypeExpr;
    /// Conditional field group: `[ElifBranch..., Else?]`.
    RecWhen: Children, TypeExpr;
    /// `[Pragma | Empty, field...]`.
    EnumTy: Children, TypeExpr;
    /// `tuple[a: int, b: string]`: `[IdentDefs...]`.
    TupleTy: Children, TypeExpr;
    /// `[FormalParams, Pragma | Empty]`.
    ProcTy: Children, TypeExpr;
    /// `[FormalParams, Pragma | Empty]`.
    IteratorTy: Children, TypeExpr;
    /// `ref T`, or bare `ref` with no children.
    RefTy: Children, TypeExpr;
    PtrTy: Children, TypeExpr;
    VarTy: Children, TypeExpr;
    /// `distinct T`: `[base]`.
    DistinctTy: Children, TypeExpr;
    /// `typeof(a, ...)`.
    TypeOfExpr: Children, TypeExpr;
}

impl NodeKind {
    pub const fn is_compound(self) -> bool {
        matches!(self.payload_class(), PayloadClass::Children)
    }

    /// Kinds defining a named or anonymous routine with the seven-slot shape.
    pub const fn is_routine(self) -> bool {
        matches!(
            self,
            NodeKind::ProcDef
                | NodeKind::FuncDef
                | NodeKind::MethodDef
                | NodeKind::IteratorDef
                | NodeKind::ConverterDef
                | NodeKind::TemplateDef
                | NodeKind::MacroDef
                | NodeKind::LambdaExpr
                | NodeKind::DoExpr
        )
    }

    /// Inclusive value range a literal of this kind must fall in, for the
    /// fixed-width kinds narrower than 64 bits.
    pub(crate) const fn int_bounds(self) -> Option<(i64, i64)> {
        match self {
            NodeKind::CharLit | NodeKind::UInt8Lit => Some((0, u8::MAX as i64)),
            NodeKind::Int8Lit => Some((i8::MIN as i64, i8::MAX as i64)),
            NodeKind::Int16Lit => Some((i16::MIN as i64, i16::MAX as i64)),
            NodeKind::UInt16Lit => Some((0, u16::MAX as i64)),
            NodeKind::Int32Lit => Some((i32::MIN as i64, i32::MAX as i64)),
            NodeKind::UInt32Lit => Some((0, u32::MAX as i64)),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
