/// Tunables for an [`Interpreter`](crate::interpreter::Interpreter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of nested Lox calls before `StackOverflow` is raised.
    /// The host stack grows on demand, so this is the only recursion bound.
    pub max_call_depth: usize,
}

impl Config {
    pub const DEFAULT_MAX_CALL_DEPTH: usize = 4096;

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_call_depth: Self::DEFAULT_MAX_CALL_DEPTH,
        }
    }
}
