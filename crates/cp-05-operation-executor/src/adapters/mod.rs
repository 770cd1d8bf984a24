//! Adapters for the operation executor.

pub mod in_memory_contract;

pub use in_memory_contract::InMemoryPayrollContract;
