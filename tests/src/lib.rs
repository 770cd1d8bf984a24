//! # Payroll Integration Tests
//!
//! Cross-subsystem tests over the fully wired client core. Everything
//! runs against the in-memory adapters: mock browser wallet, in-memory
//! auth backend, in-memory FHE provider, and the in-memory payroll
//! contract sharing the provider's handle table.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! └── src/
//!     ├── lib.rs               # This file
//!     ├── harness.rs           # Shared rig builder and wait helpers
//!     ├── readiness_flows.rs   # Connect/disconnect/interleaving flows
//!     └── operation_flows.rs   # Money movement and balance reads
//! ```

pub mod harness;
pub mod operation_flows;
pub mod readiness_flows;
