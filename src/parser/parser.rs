use std::mem;

use tracing::debug;

use crate::analyzer::{self, Type};
use crate::error::{CompileError, CompileResult};
use crate::lexer::{Token, TokenKind};

use super::{
    local_variables::align_to, BinOp, Function, GlobalVariables, LocalVariables, Node, NodeKind,
    Stmt, TopLevel,
};

/// Arguments are passed in registers only.
pub const MAX_ARGS: usize = 6;

#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
    locals: LocalVariables,
    globals: GlobalVariables,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let offset = tokens.last().map_or(0, |t| t.offset + t.len);
            tokens.push(Token {
                kind: TokenKind::Eof,
                offset,
                len: 0,
            });
        }

        Self {
            tokens,
            index: 0,
            locals: LocalVariables::new(),
            globals: GlobalVariables::new(),
        }
    }

    pub fn globals_mut(&mut self) -> &mut GlobalVariables {
        &mut self.globals
    }

    fn peek(&self) -> &Token {
        // `new` guarantees a trailing Eof, which is never consumed.
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn offset(&self) -> usize {
        self.peek().offset
    }

    fn is_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind != kind || self.is_eof() {
            return false;
        }
        self.index += 1;
        true
    }

    fn expect(&mut self, kind: &TokenKind) -> CompileResult<()> {
        if !self.consume(kind) {
            return Err(CompileError::at(self.offset(), format!("expected '{kind}'")));
        }
        Ok(())
    }

    fn expect_ident(&mut self) -> CompileResult<(String, usize)> {
        let token = self.peek();
        let TokenKind::Ident(name) = &token.kind else {
            return Err(CompileError::at(token.offset, "expected an identifier"));
        };
        let ident = (name.clone(), token.offset);
        self.index += 1;
        Ok(ident)
    }

    fn expect_num(&mut self) -> CompileResult<i64> {
        let token = self.peek();
        let TokenKind::Num(value) = token.kind else {
            return Err(CompileError::at(token.offset, "expected a number"));
        };
        self.index += 1;
        Ok(value)
    }

    fn at_type(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Int | TokenKind::Char)
    }

    /// Parses the next function definition or global declaration, or returns
    /// `None` once the input is exhausted.
    ///
    /// top-level = type "*"* ident ( function | global )
    pub fn parse_top_level(&mut self) -> CompileResult<Option<TopLevel>> {
        if self.is_eof() {
            return Ok(None);
        }

        let ty = self.parse_type()?;
        let (name, offset) = self.expect_ident()?;

        if self.consume(&TokenKind::OpenParen) {
            Ok(Some(TopLevel::Function(self.parse_func(name, ty)?)))
        } else {
            Ok(Some(TopLevel::Global(self.parse_global(name, offset, ty)?)))
        }
    }

    /// type = ("int" | "char") "*"*
    fn parse_type(&mut self) -> CompileResult<Type> {
        let mut ty = if self.consume(&TokenKind::Int) {
            Type::Int
        } else if self.consume(&TokenKind::Char) {
            Type::Char
        } else {
            return Err(CompileError::at(self.offset(), "expected a type name"));
        };

        while self.consume(&TokenKind::Star) {
            ty = Type::pointer_to(ty);
        }
        Ok(ty)
    }

    /// array-suffix = ("[" num "]")?
    fn parse_array_suffix(&mut self, ty: Type) -> CompileResult<Type> {
        if !self.consume(&TokenKind::OpenSquareBrace) {
            return Ok(ty);
        }
        let offset = self.offset();
        let len = usize::try_from(self.expect_num()?)
            .map_err(|_| CompileError::at(offset, "array length is out of range"))?;
        self.expect(&TokenKind::CloseSquareBrace)?;
        Type::array_of(ty, len).ok_or_else(|| CompileError::at(offset, "array is too large"))
    }

    /// global = array-suffix ";"
    fn parse_global(&mut self, name: String, offset: usize, ty: Type) -> CompileResult<usize> {
        let ty = self.parse_array_suffix(ty)?;
        if self.peek().kind == TokenKind::Equal {
            return Err(CompileError::at(
                self.offset(),
                "global variables cannot have an initializer",
            ));
        }
        self.expect(&TokenKind::SemiColon)?;

        debug!(name = %name, ty = %ty, "declared global");
        self.globals
            .declare(&name, ty)
            .ok_or_else(|| CompileError::at(offset, format!("redeclaration of '{name}'")))
    }

    /// function = "(" params? ")" "{" stmt* "}"
    fn parse_func(&mut self, name: String, return_ty: Type) -> CompileResult<Function> {
        self.locals = LocalVariables::new();

        let params = self.parse_params()?;

        let mut body = vec![];
        self.expect(&TokenKind::OpenCurlyBrace)?;
        while !self.consume(&TokenKind::CloseCurlyBrace) {
            if self.is_eof() {
                return Err(CompileError::at(self.offset(), "expected '}'"));
            }
            body.push(self.parse_stmt()?);
        }

        let locals = mem::take(&mut self.locals);
        let frame_size = align_to(locals.get_last_offset(), 8);
        debug!(
            name = %name,
            params = params.len(),
            frame_size,
            "parsed function"
        );

        Ok(Function {
            name,
            return_ty,
            params,
            body,
            locals,
            frame_size,
        })
    }

    /// params = type ident ("," type ident)*
    fn parse_params(&mut self) -> CompileResult<Vec<usize>> {
        let mut params = vec![];
        if self.consume(&TokenKind::CloseParen) {
            return Ok(params);
        }

        loop {
            if params.len() == MAX_ARGS {
                return Err(CompileError::at(
                    self.offset(),
                    format!("too many parameters (at most {MAX_ARGS} are supported)"),
                ));
            }
            let ty = self.parse_type()?;
            let (name, offset) = self.expect_ident()?;
            params.push(self.locals.declare(&name, ty, offset)?);
            if !self.consume(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::CloseParen)?;

        Ok(params)
    }

    fn local_node(&self, id: usize, offset: usize) -> Node {
        let var = self.locals.get(id);
        Node {
            kind: NodeKind::LocalVar { offset: var.offset },
            ty: Some(var.ty.clone()),
            offset,
        }
    }

    /// stmt = "return" expr ";"
    ///      | "if" "(" expr ")" stmt ("else" stmt)?
    ///      | "while" "(" expr ")" stmt
    ///      | "for" "(" expr? ";" expr? ";" expr? ")" stmt
    ///      | "{" stmt* "}"
    ///      | declaration
    ///      | ";"
    ///      | expr ";"
    fn parse_stmt(&mut self) -> CompileResult<Stmt> {
        if self.consume(&TokenKind::Return) {
            let expr = self.parse_expr()?;
            self.expect(&TokenKind::SemiColon)?;
            Ok(Stmt::Return(expr))
        } else if self.consume(&TokenKind::If) {
            self.expect(&TokenKind::OpenParen)?;
            let cond = self.parse_expr()?;
            self.expect(&TokenKind::CloseParen)?;
            let then = Box::new(self.parse_stmt()?);
            let els = if self.consume(&TokenKind::Else) {
                Some(Box::new(self.parse_stmt()?))
            } else {
                None
            };
            Ok(Stmt::If { cond, then, els })
        } else if self.consume(&TokenKind::While) {
            self.expect(&TokenKind::OpenParen)?;
            let cond = self.parse_expr()?;
            self.expect(&TokenKind::CloseParen)?;
            let body = Box::new(self.parse_stmt()?);
            Ok(Stmt::While { cond, body })
        } else if self.consume(&TokenKind::For) {
            self.parse_for()
        } else if self.consume(&TokenKind::OpenCurlyBrace) {
            let mut stmts = vec![];
            while !self.consume(&TokenKind::CloseCurlyBrace) {
                if self.is_eof() {
                    return Err(CompileError::at(self.offset(), "expected '}'"));
                }
                stmts.push(self.parse_stmt()?);
            }
            Ok(Stmt::Block(stmts))
        } else if self.at_type() {
            self.parse_declaration()
        } else if self.consume(&TokenKind::SemiColon) {
            Ok(Stmt::Null)
        } else {
            let expr = self.parse_expr()?;
            self.expect(&TokenKind::SemiColon)?;
            Ok(Stmt::Expr(expr))
        }
    }

    /// declaration = type ident array-suffix (";" | "=" expr ";")
    fn parse_declaration(&mut self) -> CompileResult<Stmt> {
        let ty = self.parse_type()?;
        let (name, offset) = self.expect_ident()?;
        let ty = self.parse_array_suffix(ty)?;
        let id = self.locals.declare(&name, ty, offset)?;

        if self.consume(&TokenKind::SemiColon) {
            return Ok(Stmt::Null);
        }

        let assign_offset = self.offset();
        self.expect(&TokenKind::Equal)?;
        let rhs = self.parse_expr()?;
        self.expect(&TokenKind::SemiColon)?;

        let lhs = self.local_node(id, offset);
        Ok(Stmt::Expr(Node::new(
            NodeKind::Assign {
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            assign_offset,
        )))
    }

    fn parse_for(&mut self) -> CompileResult<Stmt> {
        self.expect(&TokenKind::OpenParen)?;
        let init = self.parse_optional_expr(&TokenKind::SemiColon)?;
        let cond = self.parse_optional_expr(&TokenKind::SemiColon)?;
        let inc = self.parse_optional_expr(&TokenKind::CloseParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(Stmt::For {
            init,
            cond,
            inc,
            body,
        })
    }

    fn parse_optional_expr(&mut self, terminator: &TokenKind) -> CompileResult<Option<Node>> {
        if self.consume(terminator) {
            return Ok(None);
        }
        let expr = self.parse_expr()?;
        self.expect(terminator)?;
        Ok(Some(expr))
    }

    /// expr = assign
    pub fn parse_expr(&mut self) -> CompileResult<Node> {
        self.parse_assign()
    }

    /// assign = equality ("=" assign)?
    fn parse_assign(&mut self) -> CompileResult<Node> {
        let lhs = self.parse_equality()?;

        let offset = self.offset();
        if self.consume(&TokenKind::Equal) {
            let rhs = self.parse_assign()?;
            return Ok(Node::new(
                NodeKind::Assign {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                offset,
            ));
        }
        Ok(lhs)
    }

    /// equality = relational ("==" relational | "!=" relational)?
    ///
    /// At most one equality operator is taken; `a == b == c` stops after
    /// `a == b` and leaves the second `==` to the caller.
    fn parse_equality(&mut self) -> CompileResult<Node> {
        let node = self.parse_relational()?;

        let offset = self.offset();
        if self.consume(&TokenKind::DoubleEqual) {
            let rhs = self.parse_relational()?;
            Ok(Node::new_binary(BinOp::Equal, node, rhs, offset))
        } else if self.consume(&TokenKind::NotEqual) {
            let rhs = self.parse_relational()?;
            Ok(Node::new_binary(BinOp::NotEqual, node, rhs, offset))
        } else {
            Ok(node)
        }
    }

    /// relational = add (">=" add | "<=" add | ">" add | "<" add)*
    fn parse_relational(&mut self) -> CompileResult<Node> {
        let mut node = self.parse_add()?;

        loop {
            let offset = self.offset();
            let op = if self.consume(&TokenKind::GreaterEqual) {
                BinOp::GreaterEqual
            } else if self.consume(&TokenKind::LessEqual) {
                BinOp::LessEqual
            } else if self.consume(&TokenKind::GreaterThan) {
                BinOp::GreaterThan
            } else if self.consume(&TokenKind::LessThan) {
                BinOp::LessThan
            } else {
                return Ok(node);
            };
            let rhs = self.parse_add()?;
            node = Node::new_binary(op, node, rhs, offset);
        }
    }

    /// add = mul ("+" mul | "-" mul)*
    fn parse_add(&mut self) -> CompileResult<Node> {
        let mut node = self.parse_mul()?;

        loop {
            let offset = self.offset();
            let op = if self.consume(&TokenKind::Plus) {
                BinOp::Add
            } else if self.consume(&TokenKind::Minus) {
                BinOp::Sub
            } else {
                return Ok(node);
            };
            let rhs = self.parse_mul()?;
            node = Node::new_binary(op, node, rhs, offset);
        }
    }

    /// mul = unary ("*" unary | "/" unary)*
    fn parse_mul(&mut self) -> CompileResult<Node> {
        let mut node = self.parse_unary()?;

        loop {
            let offset = self.offset();
            let op = if self.consume(&TokenKind::Star) {
                BinOp::Mul
            } else if self.consume(&TokenKind::Slash) {
                BinOp::Div
            } else {
                return Ok(node);
            };
            let rhs = self.parse_unary()?;
            node = Node::new_binary(op, node, rhs, offset);
        }
    }

    /// unary = "+" unary
    ///       | "-" unary
    ///       | "*" unary
    ///       | "&" unary
    ///       | "sizeof" unary
    ///       | postfix
    fn parse_unary(&mut self) -> CompileResult<Node> {
        let offset = self.offset();

        if self.consume(&TokenKind::Plus) {
            self.parse_unary()
        } else if self.consume(&TokenKind::Minus) {
            let operand = self.parse_unary()?;
            Ok(Node::new_binary(
                BinOp::Sub,
                Node::new_num(0, offset),
                operand,
                offset,
            ))
        } else if self.consume(&TokenKind::Star) {
            let operand = self.parse_unary()?;
            Ok(Node::new(NodeKind::Deref(Box::new(operand)), offset))
        } else if self.consume(&TokenKind::Ampersand) {
            let operand = self.parse_unary()?;
            Ok(Node::new(NodeKind::Addr(Box::new(operand)), offset))
        } else if self.consume(&TokenKind::Sizeof) {
            let mut operand = self.parse_unary()?;
            analyzer::visit_expr(&mut operand)?;
            let size = i64::try_from(operand.ty()?.sizeof())
                .map_err(|_| CompileError::at(offset, "size is out of range"))?;
            Ok(Node::new_num(size, offset))
        } else {
            self.parse_postfix()
        }
    }

    /// postfix = primary ("[" expr "]")*
    fn parse_postfix(&mut self) -> CompileResult<Node> {
        let mut node = self.parse_primary()?;

        loop {
            let offset = self.offset();
            if !self.consume(&TokenKind::OpenSquareBrace) {
                return Ok(node);
            }
            let index = self.parse_expr()?;
            self.expect(&TokenKind::CloseSquareBrace)?;
            let addr = Node::new_binary(BinOp::Add, node, index, offset);
            node = Node::new(NodeKind::Deref(Box::new(addr)), offset);
        }
    }

    /// primary = "(" expr ")"
    ///         | ident ("(" (assign ("," assign)*)? ")")?
    ///         | num
    fn parse_primary(&mut self) -> CompileResult<Node> {
        let token = self.peek().clone();

        match token.kind {
            TokenKind::OpenParen => {
                self.index += 1;
                let node = self.parse_expr()?;
                self.expect(&TokenKind::CloseParen)?;
                Ok(node)
            }
            TokenKind::Num(value) => {
                self.index += 1;
                Ok(Node::new_num(value, token.offset))
            }
            TokenKind::Ident(name) => {
                self.index += 1;
                if self.consume(&TokenKind::OpenParen) {
                    self.parse_call(name, token.offset)
                } else {
                    self.resolve_var(&name, token.offset)
                }
            }
            _ => Err(CompileError::at(token.offset, "expected an expression")),
        }
    }

    fn parse_call(&mut self, name: String, offset: usize) -> CompileResult<Node> {
        let mut args = vec![];
        if !self.consume(&TokenKind::CloseParen) {
            loop {
                args.push(self.parse_assign()?);
                if !self.consume(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::CloseParen)?;
        }

        if args.len() > MAX_ARGS {
            return Err(CompileError::at(
                offset,
                format!("too many arguments to '{name}' (at most {MAX_ARGS} are supported)"),
            ));
        }
        Ok(Node::new(NodeKind::Call { name, args }, offset))
    }

    /// Locals shadow globals; an unknown name is an error.
    fn resolve_var(&self, name: &str, offset: usize) -> CompileResult<Node> {
        if let Some(var) = self.locals.find(name) {
            return Ok(Node {
                kind: NodeKind::LocalVar { offset: var.offset },
                ty: Some(var.ty.clone()),
                offset,
            });
        }
        if let Some(var) = self.globals.find(name) {
            return Ok(Node {
                kind: NodeKind::GlobalVar {
                    name: var.name.clone(),
                },
                ty: Some(var.ty.clone()),
                offset,
            });
        }
        Err(CompileError::at(offset, format!("unknown identifier '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parser(source: &str) -> Parser {
        Parser::new(Lexer::tokenize(source).unwrap())
    }

    fn parse_function(source: &str) -> CompileResult<Function> {
        match parser(source).parse_top_level()? {
            Some(TopLevel::Function(f)) => Ok(f),
            other => panic!("expected a function, got {:?}", other),
        }
    }

    fn binary(node: &Node) -> (BinOp, &Node, &Node) {
        let NodeKind::Binary { op, lhs, rhs } = &node.kind else {
            panic!("not a binary node: {:?}", node);
        };
        (*op, lhs, rhs)
    }

    #[test]
    fn precedence_and_left_associativity() {
        let node = parser("1 - 2 * 3 - 4").parse_expr().unwrap();
        let (op, lhs, rhs) = binary(&node);
        assert_eq!(op, BinOp::Sub);
        assert_eq!(rhs.kind, NodeKind::Num(4));
        let (op, one, mul) = binary(lhs);
        assert_eq!(op, BinOp::Sub);
        assert_eq!(one.kind, NodeKind::Num(1));
        assert_eq!(binary(mul).0, BinOp::Mul);
    }

    #[test]
    fn assignment_is_right_associative() {
        let f = parse_function("int f() { int a; int b; a = b = 3; }").unwrap();
        let Stmt::Expr(node) = &f.body[2] else {
            panic!();
        };
        let NodeKind::Assign { rhs, .. } = &node.kind else {
            panic!();
        };
        assert!(matches!(rhs.kind, NodeKind::Assign { .. }));
    }

    #[test]
    fn equality_takes_a_single_operator() {
        let mut p = parser("1 == 2 == 3");
        let node = p.parse_expr().unwrap();
        assert_eq!(binary(&node).0, BinOp::Equal);
        assert_eq!(p.peek().kind, TokenKind::DoubleEqual);
    }

    #[test]
    fn greater_than_is_kept_for_codegen() {
        let node = parser("1 > 2").parse_expr().unwrap();
        assert_eq!(binary(&node).0, BinOp::GreaterThan);
    }

    #[test]
    fn unary_minus_is_zero_minus() {
        let node = parser("-5").parse_expr().unwrap();
        let (op, lhs, rhs) = binary(&node);
        assert_eq!(op, BinOp::Sub);
        assert_eq!(lhs.kind, NodeKind::Num(0));
        assert_eq!(rhs.kind, NodeKind::Num(5));
    }

    #[test]
    fn sizeof_folds_to_a_literal() {
        let f = parse_function("int f() { char a[7]; int *p; return sizeof a + sizeof p + sizeof *p; }")
            .unwrap();
        let Stmt::Return(node) = &f.body[2] else {
            panic!();
        };
        let (_, lhs, rhs) = binary(node);
        assert_eq!(rhs.kind, NodeKind::Num(8));
        let (_, a, p) = binary(lhs);
        assert_eq!(a.kind, NodeKind::Num(7));
        assert_eq!(p.kind, NodeKind::Num(8));
    }

    #[test]
    fn indexing_desugars_to_deref_of_add() {
        let f = parse_function("int f() { int a[3]; return a[1]; }").unwrap();
        let Stmt::Return(node) = &f.body[1] else {
            panic!();
        };
        let NodeKind::Deref(inner) = &node.kind else {
            panic!();
        };
        let (op, base, index) = binary(inner);
        assert_eq!(op, BinOp::Add);
        assert!(matches!(base.kind, NodeKind::LocalVar { offset: 24 }));
        assert_eq!(index.kind, NodeKind::Num(1));
    }

    #[test]
    fn declarations_become_null_or_assign() {
        let f = parse_function("int f() { int x; int y = 2; }").unwrap();
        assert_eq!(f.body[0], Stmt::Null);
        let Stmt::Expr(node) = &f.body[1] else {
            panic!();
        };
        assert!(matches!(node.kind, NodeKind::Assign { .. }));
        assert_eq!(f.frame_size, 16);
    }

    #[test]
    fn params_are_locals_in_order() {
        let f = parse_function("char *f(int a, char b, int *c) { return c; }").unwrap();
        assert_eq!(f.return_ty, Type::pointer_to(Type::Char));
        let names: Vec<_> = f
            .params
            .iter()
            .map(|&id| f.locals.get(id).name.as_str())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(f.locals.get(f.params[1]).ty, Type::Char);
        assert_eq!(f.frame_size, 24);
    }

    #[test]
    fn frame_size_is_rounded_to_eight() {
        let f = parse_function("int f() { char a[3]; }").unwrap();
        assert_eq!(f.frame_size, 8);
    }

    #[test]
    fn duplicate_local_is_rejected() {
        let err = parse_function("int f() { int x; int x; }").unwrap_err();
        assert_eq!(err, CompileError::at(21, "redeclaration of 'x'"));
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        let err = parse_function("int f() { return y; }").unwrap_err();
        assert_eq!(err, CompileError::at(17, "unknown identifier 'y'"));
    }

    #[test]
    fn locals_shadow_globals() {
        let mut p = parser("int x; int f() { int x; return x; } int g() { return x; }");
        assert!(matches!(p.parse_top_level().unwrap(), Some(TopLevel::Global(0))));

        let Some(TopLevel::Function(f)) = p.parse_top_level().unwrap() else {
            panic!();
        };
        let Stmt::Return(node) = &f.body[1] else {
            panic!();
        };
        assert!(matches!(node.kind, NodeKind::LocalVar { .. }));

        let Some(TopLevel::Function(g)) = p.parse_top_level().unwrap() else {
            panic!();
        };
        let Stmt::Return(node) = &g.body[0] else {
            panic!();
        };
        assert_eq!(
            node.kind,
            NodeKind::GlobalVar {
                name: "x".to_string()
            }
        );
        assert!(p.parse_top_level().unwrap().is_none());
    }

    #[test]
    fn scopes_do_not_leak_between_functions() {
        let mut p = parser("int f() { int x; } int g() { return x; }");
        p.parse_top_level().unwrap();
        let err = p.parse_top_level().unwrap_err();
        assert_eq!(err.message(), "unknown identifier 'x'");
    }

    #[test]
    fn global_redeclaration_is_rejected() {
        let mut p = parser("int g; char g;");
        p.parse_top_level().unwrap();
        let err = p.parse_top_level().unwrap_err();
        assert_eq!(err, CompileError::at(12, "redeclaration of 'g'"));
    }

    #[test]
    fn global_initializer_is_rejected() {
        let err = parser("int g = 3;").parse_top_level().unwrap_err();
        assert_eq!(
            err,
            CompileError::at(6, "global variables cannot have an initializer")
        );
    }

    #[test]
    fn missing_semicolon() {
        let err = parse_function("int f() { return 1 }").unwrap_err();
        assert_eq!(err, CompileError::at(19, "expected ';'"));
    }

    #[test]
    fn unterminated_body() {
        let err = parse_function("int f() { return 1;").unwrap_err();
        assert_eq!(err, CompileError::at(19, "expected '}'"));
    }

    #[test]
    fn too_many_arguments() {
        let err = parse_function("int f() { return g(1, 2, 3, 4, 5, 6, 7); }").unwrap_err();
        assert_eq!(
            err,
            CompileError::at(17, "too many arguments to 'g' (at most 6 are supported)")
        );
    }

    #[test]
    fn six_arguments_are_fine() {
        let f = parse_function("int f() { return g(1, 2, 3, 4, 5, 6); }").unwrap();
        let Stmt::Return(node) = &f.body[0] else {
            panic!();
        };
        let NodeKind::Call { name, args } = &node.kind else {
            panic!();
        };
        assert_eq!(name, "g");
        assert_eq!(args.len(), 6);
    }

    #[test]
    fn too_many_parameters() {
        let err =
            parse_function("int f(int a, int b, int c, int d, int e, int f, int g) { }").unwrap_err();
        assert_eq!(err.message(), "too many parameters (at most 6 are supported)");
    }

    #[test]
    fn array_size_overflow_is_rejected() {
        let err =
            parse_function("int main() { int a[2305843009213693952]; return 0; }").unwrap_err();
        assert_eq!(err, CompileError::at(19, "array is too large"));
    }

    #[test]
    fn frame_overflow_is_rejected() {
        let err =
            parse_function("int f() { char a[2000000000]; char b[2000000000]; }").unwrap_err();
        assert_eq!(err, CompileError::at(35, "stack frame is too large for 'b'"));
    }

    #[test]
    fn sizeof_beyond_i64_is_rejected() {
        let mut p = parser("int g[2000000000000000000]; int main() { return sizeof g; }");
        assert!(matches!(p.parse_top_level().unwrap(), Some(TopLevel::Global(0))));
        let err = p.parse_top_level().unwrap_err();
        assert_eq!(err, CompileError::at(48, "size is out of range"));
    }

    #[test]
    fn for_with_empty_clauses() {
        let f = parse_function("int f() { for (;;) ; }").unwrap();
        assert_eq!(
            f.body[0],
            Stmt::For {
                init: None,
                cond: None,
                inc: None,
                body: Box::new(Stmt::Null),
            }
        );
    }
}
