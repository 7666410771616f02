use std::mem;

use crate::error::{CompileError, CompileResult};
use crate::parser::{BinOp, Function, Node, NodeKind, Stmt};

use super::Type;

pub fn visit_function(func: &mut Function) -> CompileResult<()> {
    for stmt in func.body.iter_mut() {
        visit_stmt(stmt)?;
    }
    Ok(())
}

pub fn visit_stmt(stmt: &mut Stmt) -> CompileResult<()> {
    match stmt {
        Stmt::Null => (),
        Stmt::Expr(node) | Stmt::Return(node) => visit_expr(node)?,
        Stmt::Block(stmts) => {
            for s in stmts {
                visit_stmt(s)?;
            }
        }
        Stmt::If { cond, then, els } => {
            visit_expr(cond)?;
            visit_stmt(then)?;
            if let Some(els) = els {
                visit_stmt(els)?;
            }
        }
        Stmt::While { cond, body } => {
            visit_expr(cond)?;
            visit_stmt(body)?;
        }
        Stmt::For {
            init,
            cond,
            inc,
            body,
        } => {
            for node in [init, cond, inc].into_iter().flatten() {
                visit_expr(node)?;
            }
            visit_stmt(body)?;
        }
    }
    Ok(())
}

/// Types `node` after all of its children, rewriting `+` and `-` into their
/// pointer-aware forms along the way.
pub fn visit_expr(node: &mut Node) -> CompileResult<()> {
    let offset = node.offset;

    let ty = match &mut node.kind {
        NodeKind::Num(_) => Type::Int,
        // Variables carry their declared type from the parser.
        NodeKind::LocalVar { .. } | NodeKind::GlobalVar { .. } => {
            return match node.ty {
                Some(_) => Ok(()),
                None => Err(CompileError::internal("variable without a declared type")),
            };
        }
        NodeKind::Assign { lhs, rhs } => {
            visit_expr(lhs)?;
            visit_expr(rhs)?;
            let ty = lhs.ty()?.clone();
            if ty.is_array() {
                return Err(CompileError::at(lhs.offset, "array is not assignable"));
            }
            ty
        }
        NodeKind::Addr(inner) => {
            visit_expr(inner)?;
            Type::pointer_to(inner.ty()?.clone())
        }
        NodeKind::Deref(inner) => {
            visit_expr(inner)?;
            let ty = inner.ty()?;
            ty.pointee()
                .cloned()
                .ok_or_else(|| CompileError::at(offset, format!("cannot dereference '{ty}'")))?
        }
        NodeKind::Binary { op, lhs, rhs } => {
            visit_expr(lhs)?;
            visit_expr(rhs)?;
            match *op {
                BinOp::Add => resolve_add(op, lhs, rhs, offset)?,
                BinOp::Sub => resolve_sub(op, lhs, rhs, offset)?,
                _ => (),
            }
            match *op {
                BinOp::PtrAdd | BinOp::PtrSub => lhs.ty()?.decay(),
                _ => Type::Int,
            }
        }
        NodeKind::Call { args, .. } => {
            for arg in args {
                visit_expr(arg)?;
            }
            Type::Int
        }
    };

    node.ty = Some(ty);
    Ok(())
}

fn is_pointer_like(node: &Node) -> CompileResult<bool> {
    Ok(node.ty()?.pointee().is_some())
}

fn resolve_add(
    op: &mut BinOp,
    lhs: &mut Box<Node>,
    rhs: &mut Box<Node>,
    offset: usize,
) -> CompileResult<()> {
    match (is_pointer_like(lhs)?, is_pointer_like(rhs)?) {
        (false, false) => (),
        (true, false) => *op = BinOp::PtrAdd,
        // Keep the pointer on the left so codegen only scales the right side.
        (false, true) => {
            mem::swap(lhs, rhs);
            *op = BinOp::PtrAdd;
        }
        (true, true) => return Err(CompileError::at(offset, "invalid operands to '+'")),
    }
    Ok(())
}

fn resolve_sub(
    op: &mut BinOp,
    lhs: &mut Box<Node>,
    rhs: &mut Box<Node>,
    offset: usize,
) -> CompileResult<()> {
    match (is_pointer_like(lhs)?, is_pointer_like(rhs)?) {
        (false, false) => (),
        (true, false) => *op = BinOp::PtrSub,
        (true, true) => *op = BinOp::PtrDiff,
        (false, true) => return Err(CompileError::at(offset, "invalid operands to '-'")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(ty: Type, offset: usize) -> Node {
        Node {
            kind: NodeKind::LocalVar { offset: 8 },
            ty: Some(ty),
            offset,
        }
    }

    fn int_ptr() -> Type {
        Type::pointer_to(Type::Int)
    }

    #[test]
    fn int_plus_int_stays_plain() {
        let mut node = Node::new_binary(BinOp::Add, Node::new_num(1, 0), Node::new_num(2, 4), 2);
        visit_expr(&mut node).unwrap();
        assert_eq!(node.ty, Some(Type::Int));
        let NodeKind::Binary { op, .. } = node.kind else {
            panic!();
        };
        assert_eq!(op, BinOp::Add);
    }

    #[test]
    fn int_plus_pointer_is_swapped() {
        let mut node = Node::new_binary(BinOp::Add, Node::new_num(1, 0), var(int_ptr(), 4), 2);
        visit_expr(&mut node).unwrap();
        assert_eq!(node.ty, Some(int_ptr()));
        let NodeKind::Binary { op, lhs, rhs } = node.kind else {
            panic!();
        };
        assert_eq!(op, BinOp::PtrAdd);
        assert_eq!(lhs.ty, Some(int_ptr()));
        assert_eq!(rhs.kind, NodeKind::Num(1));
    }

    #[test]
    fn array_arithmetic_decays() {
        let arr = Type::array_of(Type::Char, 4).unwrap();
        let mut node = Node::new_binary(BinOp::Sub, var(arr, 0), Node::new_num(1, 4), 2);
        visit_expr(&mut node).unwrap();
        assert_eq!(node.ty, Some(Type::pointer_to(Type::Char)));
    }

    #[test]
    fn pointer_difference_is_an_int() {
        let mut node = Node::new_binary(BinOp::Sub, var(int_ptr(), 0), var(int_ptr(), 4), 2);
        visit_expr(&mut node).unwrap();
        assert_eq!(node.ty, Some(Type::Int));
        let NodeKind::Binary { op, .. } = node.kind else {
            panic!();
        };
        assert_eq!(op, BinOp::PtrDiff);
    }

    #[test]
    fn pointer_plus_pointer_is_rejected() {
        let mut node = Node::new_binary(BinOp::Add, var(int_ptr(), 0), var(int_ptr(), 4), 2);
        let err = visit_expr(&mut node).unwrap_err();
        assert_eq!(err, CompileError::at(2, "invalid operands to '+'"));
    }

    #[test]
    fn int_minus_pointer_is_rejected() {
        let mut node = Node::new_binary(BinOp::Sub, Node::new_num(1, 0), var(int_ptr(), 4), 2);
        assert!(visit_expr(&mut node).is_err());
    }

    #[test]
    fn address_and_deref() {
        let mut addr = Node::new(NodeKind::Addr(Box::new(var(Type::Char, 1))), 0);
        visit_expr(&mut addr).unwrap();
        assert_eq!(addr.ty, Some(Type::pointer_to(Type::Char)));

        let mut deref = Node::new(NodeKind::Deref(Box::new(addr)), 0);
        visit_expr(&mut deref).unwrap();
        assert_eq!(deref.ty, Some(Type::Char));
    }

    #[test]
    fn deref_of_int_is_rejected() {
        let mut node = Node::new(NodeKind::Deref(Box::new(Node::new_num(3, 1))), 0);
        let err = visit_expr(&mut node).unwrap_err();
        assert_eq!(err, CompileError::at(0, "cannot dereference 'int'"));
    }

    #[test]
    fn assignment_takes_left_type() {
        let mut node = Node::new(
            NodeKind::Assign {
                lhs: Box::new(var(Type::Char, 0)),
                rhs: Box::new(Node::new_num(300, 4)),
            },
            2,
        );
        visit_expr(&mut node).unwrap();
        assert_eq!(node.ty, Some(Type::Char));
    }

    #[test]
    fn visiting_twice_is_stable() {
        let mut node = Node::new_binary(BinOp::Add, Node::new_num(1, 0), var(int_ptr(), 4), 2);
        visit_expr(&mut node).unwrap();
        let once = node.clone();
        visit_expr(&mut node).unwrap();
        assert_eq!(node, once);
    }
}
