//! Evaluator configuration and builder.

use om_ir::SharedClassTable;

use crate::Evaluator;

/// Resource limits for one evaluation session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum nesting of on-demand evaluations, or `None` for unlimited
    /// (native targets grow the stack instead).
    pub max_depth: Option<usize>,
    /// Maximum number of objects one top-level call may create.
    pub max_instances: Option<usize>,
}

impl EvalConfig {
    /// Default demand depth: unlimited on native, 200 on WASM.
    pub const fn default_max_depth() -> Option<usize> {
        if cfg!(target_arch = "wasm32") {
            Some(200)
        } else {
            None
        }
    }

    pub const DEFAULT_MAX_INSTANCES: usize = 1_000_000;
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_depth: Self::default_max_depth(),
            max_instances: Some(Self::DEFAULT_MAX_INSTANCES),
        }
    }
}

/// Builder for creating [`Evaluator`] instances with non-default limits.
pub struct EvaluatorBuilder {
    classes: SharedClassTable,
    config: EvalConfig,
}

impl EvaluatorBuilder {
    pub fn new(classes: impl Into<SharedClassTable>) -> Self {
        Self {
            classes: classes.into(),
            config: EvalConfig::default(),
        }
    }

    /// Limit the nesting of on-demand evaluations.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = Some(depth);
        self
    }

    /// Remove the demand depth limit.
    #[must_use]
    pub fn unlimited_depth(mut self) -> Self {
        self.config.max_depth = None;
        self
    }

    /// Limit the number of objects per top-level call.
    #[must_use]
    pub fn max_instances(mut self, limit: usize) -> Self {
        self.config.max_instances = Some(limit);
        self
    }

    /// Remove the instance limit.
    #[must_use]
    pub fn unlimited_instances(mut self) -> Self {
        self.config.max_instances = None;
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Evaluator {
        Evaluator::with_config(self.classes, self.config)
    }
}
