//! Binary and Unary Operators
//!
//! Parsers hand operators over as their source text (`"+"`, `"not"`,
//! `"and"`), so both enums round-trip through `as_symbol` / `from_symbol`.

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Every binary operator, in declaration order.
    pub const ALL: [BinaryOp; 13] = [
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Mod,
        Self::Eq,
        Self::NotEq,
        Self::Lt,
        Self::LtEq,
        Self::Gt,
        Self::GtEq,
        Self::And,
        Self::Or,
    ];

    /// Returns the source-level symbol for this operator.
    ///
    /// Used in error messages to show the exact operator that failed.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            // Arithmetic
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            // Comparison
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            // Logical
            Self::And => "and",
            Self::Or => "or",
        }
    }

    /// Parse an operator from its source symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_symbol() == symbol)
    }

    /// Returns the precedence level of this operator.
    ///
    /// Higher number = lower precedence (binds less tightly).
    /// - 3: `*` `/` `%`
    /// - 4: `+` `-`
    /// - 7: `<` `>` `<=` `>=`
    /// - 8: `==` `!=`
    /// - 12: `and`
    /// - 13: `or`
    pub const fn precedence(self) -> u8 {
        match self {
            // Multiplicative (highest binary precedence)
            Self::Mul | Self::Div | Self::Mod => 3,
            // Additive
            Self::Add | Self::Sub => 4,
            // Comparison
            Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => 7,
            // Equality
            Self::Eq | Self::NotEq => 8,
            // Logical AND
            Self::And => 12,
            // Logical OR (lowest binary precedence)
            Self::Or => 13,
        }
    }

    /// Whether this operator always produces a Bool.
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }

    /// Whether this operator is `and` / `or`.
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    /// Numeric negation (`-`).
    Neg,
    /// Logical negation (`not`).
    Not,
}

impl UnaryOp {
    /// Returns the source-level symbol for this operator.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "not",
        }
    }

    /// Parse an operator from its source symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "-" => Some(Self::Neg),
            "not" => Some(Self::Not),
            _ => None,
        }
    }
}
