//! Query builder utilities
//!
//! This module provides query construction and in-memory evaluation.

pub mod builder;
pub mod filter;
pub mod ordering;


pub use builder::{FilterSwitch, QueryBuilder};
pub use filter::{FilterDef, LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
pub use ordering::SortOrder;
