//! Tests for the kind taxonomy and shape table as seen by producers.

use bough_ast::{
    Arity, AstContext, AstErrorKind, KindClass, NodeBuilder, NodeKind, NodeRef, PayloadClass,
    RoutineBuilder, descendants,
};

// ========================================================================
// Taxonomy
// ========================================================================

#[test]
fn test_payload_class_decides_arity() {
    for &kind in NodeKind::ALL {
        match kind.payload_class() {
            PayloadClass::Children => assert!(kind.arity().is_some(), "{kind} needs an arity"),
            _ => assert_eq!(kind.arity(), None, "{kind} is scalar"),
        }
    }
}

#[test]
fn test_routine_kinds_share_seven_slots() {
    for &kind in NodeKind::ALL.iter().filter(|k| k.is_routine()) {
        assert_eq!(kind.arity(), Some(Arity::Exact(7)), "{kind}");
    }
}

#[test]
fn test_empty_child_list_respects_minimum() {
    let mut ctx = AstContext::new();
    for &kind in NodeKind::ALL.iter().filter(|k| k.is_compound()) {
        let Some(arity) = kind.arity() else {
            continue;
        };
        let result = ctx.make_compound(kind, []);
        assert_eq!(result.is_ok(), arity.admits(0), "{kind} with no children");
        if let Err(err) = result {
            assert!(matches!(err.kind(), AstErrorKind::MalformedNode { .. }));
        }
    }
}

#[test]
fn test_scalar_kinds_reject_children() {
    let mut ctx = AstContext::new();
    for &kind in NodeKind::ALL.iter().filter(|k| !k.is_compound()) {
        let err = ctx.make_compound(kind, []).unwrap_err();
        assert!(matches!(err.kind(), AstErrorKind::MalformedNode { .. }), "{kind}");
        assert!(ctx.new_node(kind).is_err(), "{kind}");
    }
}

#[test]
fn test_classes_cover_families() {
    assert_eq!(NodeKind::Infix.class(), KindClass::OperatorCall);
    assert_eq!(NodeKind::IfExpr.class(), KindClass::Expression);
    assert_eq!(NodeKind::IfStmt.class(), KindClass::Statement);
    assert_eq!(NodeKind::ProcDef.class(), KindClass::Declaration);
    assert_eq!(NodeKind::ObjectTy.class(), KindClass::TypeExpr);
    assert_eq!(NodeKind::StrLit.class(), KindClass::Atom);
}

// ========================================================================
// One valid instance per family
// ========================================================================

/// Builds a module touching most statement and declaration families.
fn build_module(ctx: &mut AstContext) -> NodeRef {
    let mut stmts = Vec::new();

    // import strutils as su; from os import getEnv
    let (strutils, su) = (ctx.ident("strutils"), ctx.ident("su"));
    stmts.push(ctx.import_as(strutils, su).unwrap());
    let (os, get_env) = (ctx.ident("os"), ctx.ident("getEnv"));
    stmts.push(ctx.from_import(os, [get_env]).unwrap());

    // const limit = 10
    let (limit, ten) = (ctx.ident("limit"), ctx.int_lit(10));
    let limit = ctx.const_def(limit, None, Some(ten)).unwrap();
    stmts.push(ctx.const_section([limit]).unwrap());

    // let (a, b) = (1, 2)
    let (a, b) = (ctx.ident("a"), ctx.ident("b"));
    let (one, two) = (ctx.int_lit(1), ctx.int_lit(2));
    let pair = ctx.tuple([one, two]).unwrap();
    let unpack = NodeBuilder::new(NodeKind::VarTuple)
        .children([a, b, NodeRef::EMPTY, pair])
        .build(ctx)
        .unwrap();
    stmts.push(ctx.let_section([unpack]).unwrap());

    // type Callback = proc (x: int) {.nimcall.}
    let (x, int_ty) = (ctx.ident("x"), ctx.ident("int"));
    let param = ctx.ident_defs([x], Some(int_ty), None).unwrap();
    let params = ctx.formal_params(None, [param]).unwrap();
    let nimcall = ctx.ident("nimcall");
    let pragma = ctx.pragma([nimcall]).unwrap();
    let proc_ty = ctx
        .make_compound(NodeKind::ProcTy, [params, pragma])
        .unwrap();
    let callback = ctx.ident("Callback");
    let callback = ctx.type_def(callback, None, proc_ty).unwrap();
    stmts.push(ctx.type_section([callback]).unwrap());

    // while running: try: step() except IOError: break finally: discard
    let running = ctx.ident("running");
    let step = ctx.ident("step");
    let step = ctx.call(step, []).unwrap();
    let io_error = ctx.ident("IOError");
    let brk = ctx.break_stmt(None).unwrap();
    let cleanup = ctx.discard_stmt(None).unwrap();
    let guarded = ctx
        .try_stmt(step, [(vec![io_error], brk)], Some(cleanup))
        .unwrap();
    stmts.push(ctx.while_stmt(running, guarded).unwrap());

    // when defined(debug): block trace: defer: flush()
    let defined = ctx.ident("defined");
    let debug = ctx.ident("debug");
    let cond = ctx.call(defined, [debug]).unwrap();
    let flush = ctx.ident("flush");
    let flush = ctx.call(flush, []).unwrap();
    let deferred = ctx.make_compound(NodeKind::DeferStmt, [flush]).unwrap();
    let label = ctx.ident("trace");
    let block = ctx.block_stmt(Some(label), deferred).unwrap();
    stmts.push(ctx.when_stmt([(cond, block)], None).unwrap());

    // let f = proc (): int = 1
    let ret = ctx.ident("int");
    let value = ctx.int_lit(1);
    let lambda = RoutineBuilder::lambda()
        .returns(ret)
        .body(value)
        .build(ctx)
        .unwrap();
    let f = ctx.ident("f");
    let f = ctx.ident_defs([f], None, Some(lambda)).unwrap();
    stmts.push(ctx.let_section([f]).unwrap());

    // asm """nop"""
    let text = ctx.make_text(NodeKind::TripleStrLit, "nop").unwrap();
    stmts.push(
        ctx.make_compound(NodeKind::AsmStmt, [NodeRef::EMPTY, text])
            .unwrap(),
    );

    // ## Module docs.
    stmts.push(ctx.comment("Module docs."));

    ctx.stmt_list(stmts).unwrap()
}

#[test]
fn test_module_of_every_family_validates() {
    let mut ctx = AstContext::new();
    let module = build_module(&mut ctx);
    let result = ctx.validate_tree(module);
    assert!(result.is_ok(), "{result}");
    assert_eq!(ctx.child_count(module).unwrap(), 10);
}

#[test]
fn test_every_node_has_one_owner() {
    let mut ctx = AstContext::new();
    let module = build_module(&mut ctx);
    for node in descendants(&ctx, module).skip(1) {
        let parent = ctx.parent(node).expect("attached node");
        let siblings = ctx.children(parent).unwrap();
        assert_eq!(siblings.iter().filter(|&&c| c == node).count(), 1);
    }
    assert_eq!(ctx.parent(module), None);
}

#[test]
fn test_deep_copy_of_module_is_equal() {
    let mut ctx = AstContext::new();
    let module = build_module(&mut ctx);
    let copy = ctx.deep_copy(module);
    assert!(ctx.tree_eq(module, copy));
    assert!(ctx.validate_tree(copy).is_ok());

    let first = ctx.child(copy, 0).unwrap();
    ctx.remove_child(copy, 0).unwrap();
    assert_eq!(ctx.parent(first), None);
    assert!(!ctx.tree_eq(module, copy));
}
