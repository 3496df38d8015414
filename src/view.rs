//! Interactive view: maps the current predicate set to a summary.
//!
//! Each call goes through [`filter`] then [`aggregate`], the same two
//! functions the text report uses. Results are memoized per predicate set.

use crate::analyzers::{Summary, aggregate};
use crate::filter::{FilterSet, filter};
use crate::record::Record;
use std::collections::HashMap;
use tracing::debug;

pub struct InteractiveView<'a> {
    records: &'a [Record],
    cache: HashMap<FilterSet, Summary>,
}

impl<'a> InteractiveView<'a> {
    pub fn new(records: &'a [Record]) -> Self {
        Self {
            records,
            cache: HashMap::new(),
        }
    }

    /// The records currently matching `predicates`, in input order.
    pub fn rows(&self, predicates: &FilterSet) -> Vec<&'a Record> {
        filter(self.records, predicates)
    }

    /// Summary of the records matching `predicates`.
    pub fn summarize(&mut self, predicates: &FilterSet) -> &Summary {
        let records = self.records;
        self.cache.entry(predicates.clone()).or_insert_with(|| {
            debug!(?predicates, "Summary cache miss");
            aggregate(&filter(records, predicates))
        })
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}
