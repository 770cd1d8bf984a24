//! # Provider Detection
//!
//! Select which injected wallet provider to use when several are present.
//! Host bindings describe every candidate they can see; the gateway picks
//! one deterministically so reloads land on the same wallet.

use serde::{Deserialize, Serialize};

/// Description of a candidate wallet provider, as reported by the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Provider name ("metamask", "rabby", ...).
    pub name: String,
    /// Whether the provider is injected into the page (vs. a bridge).
    pub injected: bool,
}

impl ProviderDescriptor {
    /// Create a descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, injected: bool) -> Self {
        Self {
            name: name.into(),
            injected,
        }
    }
}

/// Pick the provider to use from the detected candidates.
///
/// Injected providers win over bridged ones; ties break on detection order.
/// Returns the index into `candidates`, or `None` when nothing usable was
/// detected.
#[must_use]
pub fn select_provider(candidates: &[ProviderDescriptor]) -> Option<usize> {
    candidates
        .iter()
        .position(|c| c.injected)
        .or_else(|| (!candidates.is_empty()).then_some(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_none_when_empty() {
        assert_eq!(select_provider(&[]), None);
    }

    #[test]
    fn test_select_prefers_injected() {
        let candidates = vec![
            ProviderDescriptor::new("bridge", false),
            ProviderDescriptor::new("metamask", true),
        ];
        assert_eq!(select_provider(&candidates), Some(1));
    }

    #[test]
    fn test_select_first_injected_wins() {
        let candidates = vec![
            ProviderDescriptor::new("metamask", true),
            ProviderDescriptor::new("rabby", true),
        ];
        assert_eq!(select_provider(&candidates), Some(0));
    }

    #[test]
    fn test_select_falls_back_to_bridge() {
        let candidates = vec![ProviderDescriptor::new("walletconnect", false)];
        assert_eq!(select_provider(&candidates), Some(0));
    }
}
