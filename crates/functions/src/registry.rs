use std::collections::HashMap;
use std::rc::Rc;

use crate::aggregate::{AggregateFunction, MedianFunction};

/// Instance-based lookup table for aggregate functions.
///
/// Hosts create one registry per engine; there is no process-wide state.
/// Names are case-insensitive.
#[derive(Default)]
pub struct FunctionRegistry {
    aggregate_functions: HashMap<String, Rc<dyn AggregateFunction>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_builtins();
        registry
    }

    fn register_builtins(&mut self) {
        self.register_aggregate("MEDIAN".to_string(), Rc::new(MedianFunction));
    }

    pub fn register_aggregate(&mut self, name: String, func: Rc<dyn AggregateFunction>) {
        self.aggregate_functions.insert(name.to_uppercase(), func);
    }

    pub fn get_aggregate(&self, name: &str) -> Option<Rc<dyn AggregateFunction>> {
        self.aggregate_functions.get(&name.to_uppercase()).cloned()
    }
}
