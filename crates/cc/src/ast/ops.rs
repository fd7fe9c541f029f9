//! Operator and node-kind enums.

/// Expression operators.
///
/// The first block mirrors the C operators the parser produces; the final
/// three (`ColonEq`, `ExprBlock`, `SideEffectFunc`) only appear after the
/// translator has begun reshaping the tree toward Go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprOp {
    Name,
    Number,
    String,
    Arrow,
    Dot,
    Call,
    Index,
    Paren,
    PostInc,
    PostDec,
    PreInc,
    PreDec,
    Addr,
    Indir,
    Plus,
    Minus,
    Twid,
    Not,
    SizeofExpr,
    SizeofType,
    Cast,
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Lsh,
    Rsh,
    Lt,
    LtEq,
    Gt,
    GtEq,
    EqEq,
    NotEq,
    And,
    Xor,
    Or,
    AndAnd,
    OrOr,
    Cond,
    Comma,
    Eq,
    AddEq,
    SubEq,
    MulEq,
    DivEq,
    ModEq,
    XorEq,
    OrEq,
    AndEq,
    LshEq,
    RshEq,
    // Introduced by rewriting; never produced by the parser.
    ColonEq,
    ExprBlock,
    SideEffectFunc,
}

impl ExprOp {
    /// Source text of a binary or assignment operator, as printed in Go.
    pub fn as_str(self) -> &'static str {
        match self {
            ExprOp::Arrow | ExprOp::Dot => ".",
            ExprOp::Mul => "*",
            ExprOp::Div => "/",
            ExprOp::Mod => "%",
            ExprOp::Add => "+",
            ExprOp::Sub => "-",
            ExprOp::Lsh => "<<",
            ExprOp::Rsh => ">>",
            ExprOp::Lt => "<",
            ExprOp::LtEq => "<=",
            ExprOp::Gt => ">",
            ExprOp::GtEq => ">=",
            ExprOp::EqEq => "==",
            ExprOp::NotEq => "!=",
            ExprOp::And => "&",
            ExprOp::Xor => "^",
            ExprOp::Or => "|",
            ExprOp::AndAnd => "&&",
            ExprOp::OrOr => "||",
            ExprOp::Eq => "=",
            ExprOp::AddEq => "+=",
            ExprOp::SubEq => "-=",
            ExprOp::MulEq => "*=",
            ExprOp::DivEq => "/=",
            ExprOp::ModEq => "%=",
            ExprOp::XorEq => "^=",
            ExprOp::OrEq => "|=",
            ExprOp::AndEq => "&=",
            ExprOp::LshEq => "<<=",
            ExprOp::RshEq => ">>=",
            ExprOp::ColonEq => ":=",
            _ => "",
        }
    }

    /// True for `=` and the compound assignments.
    pub fn is_assign(self) -> bool {
        matches!(
            self,
            ExprOp::Eq
                | ExprOp::AddEq
                | ExprOp::SubEq
                | ExprOp::MulEq
                | ExprOp::DivEq
                | ExprOp::ModEq
                | ExprOp::XorEq
                | ExprOp::OrEq
                | ExprOp::AndEq
                | ExprOp::LshEq
                | ExprOp::RshEq
        )
    }

    /// True for the operators that already yield a Go boolean.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            ExprOp::EqEq
                | ExprOp::NotEq
                | ExprOp::Lt
                | ExprOp::LtEq
                | ExprOp::Gt
                | ExprOp::GtEq
                | ExprOp::AndAnd
                | ExprOp::OrOr
                | ExprOp::Not
        )
    }
}

/// Statement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StmtOp {
    Empty,
    Block,
    /// Ephemeral statement sequence spliced into a single-statement slot;
    /// flattened into the enclosing block before emission.
    BlockNoBrace,
    StmtExpr,
    StmtDecl,
    If,
    For,
    While,
    Do,
    Switch,
    Return,
    Break,
    Continue,
    Goto,
    ArgBegin,
    Fallthrough,
}

/// Label kinds attached to statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelOp {
    LabelName,
    Case,
    Default,
}

/// Type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Void,
    Bool,
    Char,
    Uchar,
    Short,
    Ushort,
    Int,
    Uint,
    Long,
    Ulong,
    Longlong,
    Ulonglong,
    Float32,
    Float64,
    Ptr,
    Array,
    Struct,
    Union,
    Enum,
    Func,
    TypedefType,
    Named,
}

impl TypeKind {
    /// True for the two floating-point kinds. Comparison inversion must not
    /// touch float operands (NaN makes `!(a<b)` and `a>=b` differ).
    pub fn is_float(self) -> bool {
        matches!(self, TypeKind::Float32 | TypeKind::Float64)
    }

    /// Go spelling of a scalar kind; empty for the structured kinds.
    pub fn go_name(self) -> &'static str {
        match self {
            TypeKind::Bool => "bool",
            TypeKind::Char => "int8",
            TypeKind::Uchar => "uint8",
            TypeKind::Short => "int16",
            TypeKind::Ushort => "uint16",
            TypeKind::Int => "int",
            TypeKind::Uint => "uint",
            TypeKind::Long => "int32",
            TypeKind::Ulong => "uint32",
            TypeKind::Longlong => "int64",
            TypeKind::Ulonglong => "uint64",
            TypeKind::Float32 => "float32",
            TypeKind::Float64 => "float64",
            _ => "",
        }
    }
}
