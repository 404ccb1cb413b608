//! Query builder
//!
//! Collects conditions, ordering, paging and the filter switch of a
//! single `find`.

use std::collections::HashMap;

use crate::query_builder::filter::{FilterDef, QueryFilter};
use crate::query_builder::ordering::SortOrder;
use crate::Record;

/// Which registered entity filters a query applies
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FilterSwitch {
    /// Every filter registered with `default: true`
    #[default]
    Defaults,
    /// No entity filters at all
    Disabled,
    /// Per-filter overrides; filters not named fall back to their default
    /// when `defaults` is set and are off otherwise
    Custom {
        defaults: bool,
        overrides: HashMap<String, bool>,
    },
}

impl FilterSwitch {
    pub fn is_enabled(&self, filter: &FilterDef) -> bool {
        match self {
            FilterSwitch::Defaults => filter.default,
            FilterSwitch::Disabled => false,
            FilterSwitch::Custom {
                defaults,
                overrides,
            } => overrides
                .get(&filter.name)
                .copied()
                .unwrap_or(*defaults && filter.default),
        }
    }
}

/// Query builder for constructing entity queries
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    pub(crate) conditions: Vec<QueryFilter>,
    pub(crate) order_by: Vec<(String, SortOrder)>,
    pub(crate) limit: Option<usize>,
    pub(crate) offset: Option<usize>,
    pub(crate) filters: FilterSwitch,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter condition
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.conditions.push(filter);
        self
    }

    /// Add multiple filters (combined with AND)
    pub fn filters(mut self, filters: Vec<QueryFilter>) -> Self {
        self.conditions.extend(filters);
        self
    }

    /// Add ordering
    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by.push((field.to_string(), order));
        self
    }

    /// Add limit
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add offset
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Skip every registered entity filter
    pub fn disable_filters(mut self) -> Self {
        self.filters = FilterSwitch::Disabled;
        self
    }

    /// Enable or disable one registered entity filter by name.
    ///
    /// After `disable_filters()` only the filters enabled here apply.
    pub fn filter_enabled(mut self, name: &str, enabled: bool) -> Self {
        if let FilterSwitch::Custom { overrides, .. } = &mut self.filters {
            overrides.insert(name.to_string(), enabled);
            return self;
        }

        let defaults = !matches!(self.filters, FilterSwitch::Disabled);
        self.filters = FilterSwitch::Custom {
            defaults,
            overrides: HashMap::from([(name.to_string(), enabled)]),
        };
        self
    }

    pub fn filter_switch(&self) -> &FilterSwitch {
        &self.filters
    }

    /// Whether `record` passes the query conditions and the active entity filters
    pub fn matches(&self, record: &Record, entity_filters: &[FilterDef]) -> bool {
        entity_filters
            .iter()
            .filter(|f| self.filters.is_enabled(f))
            .all(|f| f.cond.matches(record))
            && self.conditions.iter().all(|c| c.matches(record))
    }

    /// Filter, sort and page a set of records
    pub fn execute(&self, records: Vec<Record>, entity_filters: &[FilterDef]) -> Vec<Record> {
        let mut selected: Vec<Record> = records
            .into_iter()
            .filter(|r| self.matches(r, entity_filters))
            .collect();

        if !self.order_by.is_empty() {
            selected.sort_by(|a, b| {
                self.order_by
                    .iter()
                    .map(|(field, order)| {
                        let left = a.get(field).unwrap_or(&serde_json::Value::Null);
                        let right = b.get(field).unwrap_or(&serde_json::Value::Null);
                        order.compare(left, right)
                    })
                    .find(|o| o.is_ne())
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        selected
            .into_iter()
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}
