/// Default cap on string literals nested through injections.
pub const DEFAULT_MAX_INTERPOLATION_DEPTH: usize = 32;

/// Default cap on expression recursion.
pub const DEFAULT_MAX_EXPRESSION_DEPTH: usize = 64;

/// Limits applied while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// String literals nested deeper than this are reported and skipped.
    pub max_interpolation_depth: usize,
    /// Expressions nested deeper than this are reported and skipped.
    pub max_expression_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_interpolation_depth: DEFAULT_MAX_INTERPOLATION_DEPTH,
            max_expression_depth: DEFAULT_MAX_EXPRESSION_DEPTH,
        }
    }
}

impl ParserConfig {
    pub fn with_max_interpolation_depth(mut self, depth: usize) -> Self {
        self.max_interpolation_depth = depth;
        self
    }

    pub fn with_max_expression_depth(mut self, depth: usize) -> Self {
        self.max_expression_depth = depth;
        self
    }
}
