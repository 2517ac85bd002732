/// Kinds of syntax tree nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// Root of a parsed input
    SourceFile,
    ExprStmt,

    // === String literals ===
    /// `"..."` or `"""..."""` with text runs and injections
    GString,
    /// `${ expr }` or `$name.path` inside a GString
    StringInjection,

    // === Expressions ===
    /// Number, boolean, `null`, or single-quoted string
    Literal,
    NameRef,
    ParenExpr,
    ListExpr,
    PrefixExpr,
    BinaryExpr,
    /// `cond ? a : b`
    TernaryExpr,
    /// `a ?: b`
    ElvisExpr,
    AssignExpr,
    CallExpr,
    ArgList,
    /// `a.b` or `a?.b`
    FieldExpr,
    IndexExpr,

    /// Tokens the parser could not place
    Error,
}

impl SyntaxKind {
    /// Human readable name.
    pub fn name(self) -> &'static str {
        match self {
            SyntaxKind::SourceFile => "source file",
            SyntaxKind::ExprStmt => "expression statement",
            SyntaxKind::GString => "interpolated string literal",
            SyntaxKind::StringInjection => "string injection",
            SyntaxKind::Literal => "literal",
            SyntaxKind::NameRef => "name reference",
            SyntaxKind::ParenExpr => "parenthesized expression",
            SyntaxKind::ListExpr => "list literal",
            SyntaxKind::PrefixExpr => "prefix expression",
            SyntaxKind::BinaryExpr => "binary expression",
            SyntaxKind::TernaryExpr => "conditional expression",
            SyntaxKind::ElvisExpr => "elvis expression",
            SyntaxKind::AssignExpr => "assignment",
            SyntaxKind::CallExpr => "call",
            SyntaxKind::ArgList => "argument list",
            SyntaxKind::FieldExpr => "field access",
            SyntaxKind::IndexExpr => "index expression",
            SyntaxKind::Error => "error",
        }
    }

    pub fn is_expr(self) -> bool {
        !matches!(
            self,
            SyntaxKind::SourceFile
                | SyntaxKind::ExprStmt
                | SyntaxKind::StringInjection
                | SyntaxKind::ArgList
                | SyntaxKind::Error
        )
    }
}

impl std::fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
