use tracing::debug;

use crate::{
    analyzer::Type,
    error::{CompileError, CompileResult},
    parser::{BinOp, Function, GlobalVariables, Node, NodeKind, Stmt, MAX_ARGS},
};

const ARGUMENT_REGISTERS: [&str; MAX_ARGS] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];
const BYTE_ARGUMENT_REGISTERS: [&str; MAX_ARGS] = ["dil", "sil", "dl", "cl", "r8b", "r9b"];

macro_rules! emit {
    ($self:ident, $($arg:tt)*) => {{
        $self.asm.push_str(&format!($($arg)*));
        $self.asm.push('\n');
    }};
}

/// Stack-machine code generator. Every expression leaves exactly one value
/// on the stack; every statement other than a null statement does too, and
/// the enclosing block discards it.
pub struct Codegen {
    label_index: usize,
    asm: String,
}

impl Default for Codegen {
    fn default() -> Self {
        Self::new()
    }
}

impl Codegen {
    pub fn new() -> Self {
        let mut codegen = Self {
            label_index: 0,
            asm: String::new(),
        };
        emit!(codegen, ".intel_syntax noprefix");
        codegen
    }

    pub fn finish(self) -> String {
        self.asm
    }

    /// One number per control construct, never reset between functions.
    fn new_label_id(&mut self) -> usize {
        let id = self.label_index;
        self.label_index += 1;
        id
    }

    fn gen_binop(&mut self, s: &str) {
        emit!(self, "  pop rdi");
        emit!(self, "  pop rax");
        emit!(self, "{}", s);
        emit!(self, "  push rax");
    }

    fn epilogue(&mut self) {
        emit!(self, "  pop rax");
        emit!(self, "  mov rsp, rbp");
        emit!(self, "  pop rbp");
        emit!(self, "  ret");
    }

    pub fn gen_function(&mut self, func: &Function) -> CompileResult<()> {
        debug!(name = %func.name, frame_size = func.frame_size, "generating function");

        if func.params.len() > MAX_ARGS {
            return Err(CompileError::internal(format!(
                "function '{}' has {} parameters, at most {MAX_ARGS} are supported",
                func.name,
                func.params.len()
            )));
        }

        emit!(self, ".text");
        emit!(self, ".globl {}", func.name);
        emit!(self, "{}:", func.name);
        emit!(self, "  push rbp");
        emit!(self, "  mov rbp, rsp");
        emit!(self, "  sub rsp, {}", func.frame_size);

        for (i, &id) in func.params.iter().enumerate() {
            let var = func.locals.get(id);
            let reg = if var.ty.sizeof() == 1 {
                BYTE_ARGUMENT_REGISTERS[i]
            } else {
                ARGUMENT_REGISTERS[i]
            };
            emit!(self, "  mov [rbp-{}], {reg}", var.offset);
        }

        self.gen_block(&func.body)?;
        self.epilogue();
        Ok(())
    }

    /// Writes zero-filled storage for every global not written out yet.
    pub fn gen_globals(&mut self, globals: &mut GlobalVariables) {
        let pending: Vec<_> = globals.iter_mut().filter(|g| !g.emitted).collect();
        if pending.is_empty() {
            return;
        }

        emit!(self, ".data");
        for global in pending {
            emit!(self, "{}:", global.name);
            emit!(self, "  .zero {}", global.ty.sizeof());
            global.emitted = true;
        }
    }

    /// Leaves the value of the last statement on the stack.
    fn gen_block(&mut self, stmts: &[Stmt]) -> CompileResult<()> {
        for stmt in stmts {
            self.gen_discarded(stmt)?;
        }
        emit!(self, "  push rax");
        Ok(())
    }

    /// Runs `stmt` and pops its value into rax.
    fn gen_discarded(&mut self, stmt: &Stmt) -> CompileResult<()> {
        if matches!(stmt, Stmt::Null) {
            return Ok(());
        }
        self.gen_stmt(stmt)?;
        emit!(self, "  pop rax");
        Ok(())
    }

    /// Runs `stmt` so that it leaves exactly one value, even when null.
    fn gen_valued(&mut self, stmt: &Stmt) -> CompileResult<()> {
        if matches!(stmt, Stmt::Null) {
            emit!(self, "  push rax");
            return Ok(());
        }
        self.gen_stmt(stmt)
    }

    fn gen_stmt(&mut self, stmt: &Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Null => (),
            Stmt::Expr(node) => self.gen_expr(node)?,
            Stmt::Return(node) => {
                self.gen_expr(node)?;
                self.epilogue();
            }
            Stmt::Block(stmts) => self.gen_block(stmts)?,
            Stmt::If { cond, then, els } => self.gen_if(cond, then, els.as_deref())?,
            Stmt::While { cond, body } => self.gen_while(cond, body)?,
            Stmt::For {
                init,
                cond,
                inc,
                body,
            } => self.gen_for(init.as_ref(), cond.as_ref(), inc.as_ref(), body)?,
        };
        Ok(())
    }

    fn gen_if(&mut self, cond: &Node, then: &Stmt, els: Option<&Stmt>) -> CompileResult<()> {
        let id = self.new_label_id();

        self.gen_expr(cond)?;
        emit!(self, "  pop rax");
        emit!(self, "  cmp rax, 0");
        emit!(self, "  je .Lelse{id}");
        self.gen_valued(then)?;
        emit!(self, "  jmp .Lend{id}");
        emit!(self, ".Lelse{id}:");
        match els {
            Some(els) => self.gen_valued(els)?,
            None => emit!(self, "  push rax"),
        }
        emit!(self, ".Lend{id}:");
        Ok(())
    }

    fn gen_while(&mut self, cond: &Node, body: &Stmt) -> CompileResult<()> {
        let id = self.new_label_id();

        emit!(self, ".Lbegin{id}:");
        self.gen_expr(cond)?;
        emit!(self, "  pop rax");
        emit!(self, "  cmp rax, 0");
        emit!(self, "  je .Lend{id}");
        self.gen_discarded(body)?;
        emit!(self, "  jmp .Lbegin{id}");
        emit!(self, ".Lend{id}:");
        emit!(self, "  push rax");
        Ok(())
    }

    fn gen_for(
        &mut self,
        init: Option<&Node>,
        cond: Option<&Node>,
        inc: Option<&Node>,
        body: &Stmt,
    ) -> CompileResult<()> {
        let id = self.new_label_id();

        if let Some(init) = init {
            self.gen_expr(init)?;
            emit!(self, "  pop rax");
        }
        emit!(self, ".Lbegin{id}:");
        if let Some(cond) = cond {
            self.gen_expr(cond)?;
            emit!(self, "  pop rax");
            emit!(self, "  cmp rax, 0");
            emit!(self, "  je .Lend{id}");
        }
        self.gen_discarded(body)?;
        if let Some(inc) = inc {
            self.gen_expr(inc)?;
            emit!(self, "  pop rax");
        }
        emit!(self, "  jmp .Lbegin{id}");
        emit!(self, ".Lend{id}:");
        emit!(self, "  push rax");
        Ok(())
    }

    /// Pushes the address of an lvalue.
    fn gen_addr(&mut self, node: &Node) -> CompileResult<()> {
        match &node.kind {
            NodeKind::LocalVar { offset } => {
                emit!(self, "  mov rax, rbp");
                emit!(self, "  sub rax, {}", offset);
                emit!(self, "  push rax");
            }
            NodeKind::GlobalVar { name } => {
                emit!(self, "  lea rax, QWORD PTR {}[rip]", name);
                emit!(self, "  push rax");
            }
            NodeKind::Deref(inner) => self.gen_expr(inner)?,
            _ => return Err(CompileError::at(node.offset, "not an lvalue")),
        }
        Ok(())
    }

    /// Replaces the address on top of the stack with the value it points to.
    /// Arrays stay as their address.
    fn load(&mut self, ty: &Type) {
        if ty.is_array() {
            return;
        }

        emit!(self, "  pop rax");
        if ty.sizeof() == 1 {
            emit!(self, "  movsx rax, BYTE PTR [rax]");
        } else {
            emit!(self, "  mov rax, [rax]");
        }
        emit!(self, "  push rax");
    }

    fn store(&mut self, ty: &Type) {
        emit!(self, "  pop rdi");
        emit!(self, "  pop rax");
        if ty.sizeof() == 1 {
            emit!(self, "  mov [rax], dil");
        } else {
            emit!(self, "  mov [rax], rdi");
        }
        emit!(self, "  push rdi");
    }

    fn gen_expr(&mut self, node: &Node) -> CompileResult<()> {
        match &node.kind {
            NodeKind::Num(num) if i32::try_from(*num).is_err() => {
                emit!(self, "  mov rax, {}", num);
                emit!(self, "  push rax");
            }
            NodeKind::Num(num) => emit!(self, "  push {}", num),
            NodeKind::LocalVar { .. } | NodeKind::GlobalVar { .. } => {
                self.gen_addr(node)?;
                self.load(node.ty()?);
            }
            NodeKind::Assign { lhs, rhs } => {
                self.gen_addr(lhs)?;
                self.gen_expr(rhs)?;
                self.store(node.ty()?);
            }
            NodeKind::Addr(inner) => self.gen_addr(inner)?,
            NodeKind::Deref(inner) => {
                self.gen_expr(inner)?;
                self.load(node.ty()?);
            }
            NodeKind::Binary { op, lhs, rhs } => self.gen_binary(*op, lhs, rhs)?,
            NodeKind::Call { name, args } => self.gen_call(name, args)?,
        }
        Ok(())
    }

    fn gen_binary(&mut self, op: BinOp, lhs: &Node, rhs: &Node) -> CompileResult<()> {
        // `a > b` is emitted as `b < a`, `a >= b` as `b <= a`.
        let (first, second) = match op {
            BinOp::GreaterThan | BinOp::GreaterEqual => (rhs, lhs),
            _ => (lhs, rhs),
        };
        self.gen_expr(first)?;
        self.gen_expr(second)?;

        match op {
            BinOp::Add => self.gen_binop("  add rax, rdi"),
            BinOp::Sub => self.gen_binop("  sub rax, rdi"),
            BinOp::Mul => self.gen_binop("  imul rax, rdi"),
            BinOp::Div => self.gen_binop("  cqo\n  idiv rdi"),

            BinOp::PtrAdd => {
                let size = element_size(lhs)?;
                self.gen_binop(&format!("  imul rdi, {size}\n  add rax, rdi"));
            }
            BinOp::PtrSub => {
                let size = element_size(lhs)?;
                self.gen_binop(&format!("  imul rdi, {size}\n  sub rax, rdi"));
            }
            BinOp::PtrDiff => {
                let size = element_size(lhs)?;
                self.gen_binop(&format!("  sub rax, rdi\n  cqo\n  mov rdi, {size}\n  idiv rdi"));
            }

            BinOp::Equal => self.gen_binop("  cmp rax, rdi\n  sete al\n  movzb rax, al"),
            BinOp::NotEqual => self.gen_binop("  cmp rax, rdi\n  setne al\n  movzb rax, al"),
            BinOp::LessThan | BinOp::GreaterThan => {
                self.gen_binop("  cmp rax, rdi\n  setl al\n  movzb rax, al")
            }
            BinOp::LessEqual | BinOp::GreaterEqual => {
                self.gen_binop("  cmp rax, rdi\n  setle al\n  movzb rax, al")
            }
        }
        Ok(())
    }

    fn gen_call(&mut self, name: &str, args: &[Node]) -> CompileResult<()> {
        let n_args = args.len();
        if n_args > MAX_ARGS {
            return Err(CompileError::internal(format!(
                "call to '{name}' has {n_args} arguments, at most {MAX_ARGS} are supported"
            )));
        }

        for arg in args {
            self.gen_expr(arg)?;
        }
        for reg in ARGUMENT_REGISTERS.iter().take(n_args).rev() {
            emit!(self, "  pop {}", reg);
        }

        // rsp must be 16-byte aligned at the call; pad by 8 when it is not.
        let id = self.new_label_id();
        emit!(self, "  mov rax, rsp");
        emit!(self, "  and rax, 15");
        emit!(self, "  jnz .Lcall{id}");
        emit!(self, "  mov rax, 0");
        emit!(self, "  call {name}");
        emit!(self, "  jmp .Lend{id}");
        emit!(self, ".Lcall{id}:");
        emit!(self, "  sub rsp, 8");
        emit!(self, "  mov rax, 0");
        emit!(self, "  call {name}");
        emit!(self, "  add rsp, 8");
        emit!(self, ".Lend{id}:");
        emit!(self, "  push rax");
        Ok(())
    }
}

fn element_size(pointer: &Node) -> CompileResult<usize> {
    let ty = pointer.ty()?;
    ty.pointee()
        .map(Type::sizeof)
        .ok_or_else(|| CompileError::internal(format!("pointer arithmetic on '{ty}'")))
}
