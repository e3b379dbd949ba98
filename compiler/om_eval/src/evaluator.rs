//! Public entry point.

use om_ir::{Name, SharedClassTable};
use rayon::prelude::*;

use crate::engine::Session;
use crate::errors::{unknown_class, EvalResult};
use crate::{EvalConfig, EvaluatorBuilder, ObjectValue, Value};

/// Instantiates classes from a shared, read-only class table.
///
/// Each call runs its own session; nothing (memo table, frames, values) is
/// shared between calls except the table.
#[derive(Clone, Debug)]
pub struct Evaluator {
    classes: SharedClassTable,
    config: EvalConfig,
}

/// One request for [`Evaluator::instantiate_all`].
#[derive(Clone, Debug)]
pub struct InstantiateRequest {
    pub class: String,
    pub params: Vec<Option<Value>>,
}

impl InstantiateRequest {
    pub fn new(class: impl Into<String>, params: Vec<Option<Value>>) -> Self {
        InstantiateRequest {
            class: class.into(),
            params,
        }
    }
}

impl Evaluator {
    /// Evaluator with the default [`EvalConfig`].
    pub fn new(classes: impl Into<SharedClassTable>) -> Self {
        Self::with_config(classes, EvalConfig::default())
    }

    pub fn with_config(classes: impl Into<SharedClassTable>, config: EvalConfig) -> Self {
        Evaluator {
            classes: classes.into(),
            config,
        }
    }

    pub fn builder(classes: impl Into<SharedClassTable>) -> EvaluatorBuilder {
        EvaluatorBuilder::new(classes)
    }

    pub fn classes(&self) -> &SharedClassTable {
        &self.classes
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Instantiate `class_name` with the given actual parameters.
    ///
    /// `None` is an absent parameter and is rejected. Parameters may be
    /// standalone values or values from earlier results; the latter are
    /// copied into the new result graph with their sharing intact.
    #[tracing::instrument(level = "debug", skip_all, fields(class = class_name))]
    #[expect(
        clippy::needless_pass_by_value,
        reason = "parameters are handed over by the caller; the session only borrows them"
    )]
    pub fn instantiate(
        &self,
        class_name: &str,
        actual_params: Vec<Option<Value>>,
    ) -> EvalResult<ObjectValue> {
        let Some(name) = self.classes.interner().get(class_name) else {
            return Err(unknown_class(class_name));
        };
        self.run(name, &actual_params)
    }

    /// [`instantiate`](Self::instantiate) with an interned class name.
    #[expect(
        clippy::needless_pass_by_value,
        reason = "same signature as instantiate"
    )]
    pub fn instantiate_name(
        &self,
        class_name: Name,
        actual_params: Vec<Option<Value>>,
    ) -> EvalResult<ObjectValue> {
        self.run(class_name, &actual_params)
    }

    /// Evaluate independent requests in parallel; results are in request order.
    pub fn instantiate_all(
        &self,
        requests: Vec<InstantiateRequest>,
    ) -> Vec<EvalResult<ObjectValue>> {
        requests
            .into_par_iter()
            .map(|request| self.instantiate(&request.class, request.params))
            .collect()
    }

    fn run(&self, class_name: Name, actual_params: &[Option<Value>]) -> EvalResult<ObjectValue> {
        Session::new(&self.classes, &self.config).instantiate(class_name, actual_params)
    }
}
