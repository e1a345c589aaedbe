use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide switch disabling all mutating financial operations.
///
/// The gate is injected into the engine rather than read from ambient
/// global state; clones share the same underlying flag. The engine only
/// reads the flag; toggling belongs to the administrative path (and tests).
#[derive(Debug, Clone)]
pub struct FeatureGate {
    enabled: Arc<AtomicBool>,
}

impl FeatureGate {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

impl Default for FeatureGate {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gate_is_open() {
        assert!(FeatureGate::default().is_enabled());
    }

    #[test]
    fn gate_can_start_closed() {
        assert!(!FeatureGate::new(false).is_enabled());
    }

    #[test]
    fn toggling_is_observable() {
        let gate = FeatureGate::new(true);

        gate.set_enabled(false);
        assert!(!gate.is_enabled());

        gate.set_enabled(true);
        assert!(gate.is_enabled());
    }

    #[test]
    fn clones_share_the_flag() {
        let gate = FeatureGate::new(true);
        let clone = gate.clone();

        clone.set_enabled(false);
        assert!(!gate.is_enabled());
    }
}
