//! Name resolution.
//!
//! Runs once per function after parsing. Each block is handled in two
//! passes: first every name assigned directly in the block is declared
//! there unless an enclosing scope already has it, then identifiers are
//! bound to slots. A read that finds no slot becomes a global function
//! lookup.

use crate::ast::{Binding, Block, Expr, ExprKind, FunctionDecl, Ident, Stmt, StmtKind};
use crate::scope::{ScopeId, ScopeTree};
use crate::stack::ensure_sufficient_stack;

pub(crate) fn resolve_function(function: &mut FunctionDecl) {
    let mut scopes = std::mem::take(&mut function.scopes);
    for param in &mut function.params {
        bind(&scopes, ScopeId::ROOT, param);
    }
    resolve_block(&mut scopes, &mut function.body);
    function.scopes = scopes;
}

fn resolve_block(scopes: &mut ScopeTree, block: &mut Block) {
    for stmt in &block.stmts {
        if let StmtKind::Assign { target, .. } = &stmt.kind {
            if scopes.lookup(block.scope, &target.name).is_none() {
                scopes.declare(block.scope, &target.name);
            }
        }
    }
    for stmt in &mut block.stmts {
        resolve_stmt(scopes, block.scope, stmt);
    }
}

fn resolve_stmt(scopes: &mut ScopeTree, scope: ScopeId, stmt: &mut Stmt) {
    ensure_sufficient_stack(|| resolve_stmt_inner(scopes, scope, stmt));
}

fn resolve_stmt_inner(scopes: &mut ScopeTree, scope: ScopeId, stmt: &mut Stmt) {
    match &mut stmt.kind {
        StmtKind::Expr(expr) => resolve_expr(scopes, scope, expr),
        StmtKind::Assign { target, value } => {
            resolve_expr(scopes, scope, value);
            bind(scopes, scope, target);
        }
        StmtKind::If {
            condition,
            then_block,
            else_block,
        } => {
            resolve_expr(scopes, scope, condition);
            resolve_block(scopes, then_block);
            if let Some(block) = else_block {
                resolve_block(scopes, block);
            }
        }
        StmtKind::While { condition, body } => {
            resolve_expr(scopes, scope, condition);
            resolve_block(scopes, body);
        }
        StmtKind::Return(Some(expr)) => resolve_expr(scopes, scope, expr),
        StmtKind::Block(block) => resolve_block(scopes, block),
        StmtKind::Return(None) | StmtKind::Break | StmtKind::Continue | StmtKind::Debugger => {}
    }
}

fn resolve_expr(scopes: &ScopeTree, scope: ScopeId, expr: &mut Expr) {
    ensure_sufficient_stack(|| resolve_expr_inner(scopes, scope, expr));
}

fn resolve_expr_inner(scopes: &ScopeTree, scope: ScopeId, expr: &mut Expr) {
    match &mut expr.kind {
        ExprKind::Literal(_) => {}
        ExprKind::Read(ident) => bind(scopes, scope, ident),
        ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
            resolve_expr(scopes, scope, left);
            resolve_expr(scopes, scope, right);
        }
        ExprKind::Unary { operand, .. } => resolve_expr(scopes, scope, operand),
        ExprKind::Call { callee, args } => {
            resolve_expr(scopes, scope, callee);
            for arg in args {
                resolve_expr(scopes, scope, arg);
            }
        }
        ExprKind::Member { receiver, .. } => resolve_expr(scopes, scope, receiver),
    }
}

fn bind(scopes: &ScopeTree, scope: ScopeId, ident: &mut Ident) {
    ident.binding = scopes
        .lookup(scope, &ident.name)
        .map_or(Binding::Global, Binding::Local);
}

#[cfg(test)]
mod tests {
    use crate::ast::{Binding, ExprKind, StmtKind};
    use crate::parser::parse;
    use crate::source::Source;

    #[test]
    fn later_assignment_in_outer_block_is_visible_to_inner_block() {
        let source = Source::new(
            "hashemi",
            "bebin f() {\n  age (true) bood { x = 1; }\n  x = 2;\n  bede x;\n}",
            "t.hashem",
        );
        let program = parse(&source).unwrap();
        let function = &program.functions[0];
        assert_eq!(function.slot_count(), 1);

        let StmtKind::If { then_block, .. } = &function.body.stmts[0].kind else {
            panic!("expected if");
        };
        let StmtKind::Assign { target, .. } = &then_block.stmts[0].kind else {
            panic!("expected assignment");
        };
        let StmtKind::Assign { target: outer, .. } = &function.body.stmts[1].kind else {
            panic!("expected assignment");
        };
        assert_eq!(target.binding, outer.binding);
    }

    #[test]
    fn block_local_names_get_their_own_slot() {
        let source = Source::new(
            "hashemi",
            "bebin f(n) {\n  ta (n > 0) bood { tmp = n; n = n - 1; }\n  bede n;\n}",
            "t.hashem",
        );
        let program = parse(&source).unwrap();
        let function = &program.functions[0];
        assert_eq!(function.slot_count(), 2);
        let StmtKind::While { body, .. } = &function.body.stmts[0].kind else {
            panic!("expected while");
        };
        let scope = function.scopes.get(body.scope).unwrap();
        assert_eq!(scope.len(), 1);
        assert!(scope.get("tmp").is_some());
        assert_eq!(scope.parent(), Some(crate::scope::ScopeId::ROOT));
    }

    #[test]
    fn unknown_reads_are_global() {
        let source = Source::new("hashemi", "bebin f() { bede g(1); }", "t.hashem");
        let program = parse(&source).unwrap();
        let StmtKind::Return(Some(expr)) = &program.functions[0].body.stmts[0].kind else {
            panic!("expected return");
        };
        let ExprKind::Call { callee, .. } = &expr.kind else {
            panic!("expected call");
        };
        let ExprKind::Read(ident) = &callee.kind else {
            panic!("expected read");
        };
        assert_eq!(ident.binding, Binding::Global);
    }
}
