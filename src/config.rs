//! Analyzer configuration.

/// Knobs for one front-end run.
///
/// ## Examples
/// ```rust
/// use asthra::config::AnalyzerConfig;
///
/// let config = AnalyzerConfig::default().with_max_errors(10).with_parallel(false);
/// assert_eq!(config.max_errors_per_module, 10);
/// assert_eq!(config.const_eval_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Semantic errors kept per module; the rest are counted but dropped.
    pub max_errors_per_module: usize,
    /// Nesting limit for const-to-const references.
    pub const_eval_depth: usize,
    /// Lex, parse, and analyse independent modules on the rayon pool.
    pub parallel: bool,
    /// Module whose `main` is the program entry point. Defaults to the module declaring `package main`.
    pub entry_module: Option<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_errors_per_module: 100,
            const_eval_depth: 64,
            parallel: true,
            entry_module: None,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_max_errors(mut self, max: usize) -> Self {
        self.max_errors_per_module = max;
        self
    }

    pub fn with_const_eval_depth(mut self, depth: usize) -> Self {
        self.const_eval_depth = depth;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_entry_module(mut self, module: impl Into<String>) -> Self {
        self.entry_module = Some(module.into());
        self
    }
}
