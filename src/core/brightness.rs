//! Idempotent brightness application.
//!
//! Tracks the last percentage successfully pushed to the backend and skips
//! the platform call entirely when the target has not changed. A failed call
//! leaves the tracked value untouched so the next cycle retries the same
//! unmet target.

use anyhow::Result;

use crate::backend::BrightnessBackend;
use crate::common::constants::MAXIMUM_BRIGHTNESS;

/// Result of an apply call.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Applied {
    /// The backend was invoked with a new target.
    Changed,
    /// Target equals the last applied value; no platform call was made.
    Unchanged,
}

pub struct BrightnessApplier {
    backend: Box<dyn BrightnessBackend>,
    last_applied: Option<u8>,
}

impl BrightnessApplier {
    pub fn new(backend: Box<dyn BrightnessBackend>) -> Self {
        Self {
            backend,
            last_applied: None,
        }
    }

    /// Apply a target percentage, clamped to 0-100.
    pub fn apply(&mut self, percent: u8) -> Result<Applied> {
        let target = percent.min(MAXIMUM_BRIGHTNESS);
        if self.last_applied == Some(target) {
            return Ok(Applied::Unchanged);
        }

        self.backend.set_brightness(target)?;
        self.last_applied = Some(target);
        Ok(Applied::Changed)
    }

    pub fn last_applied(&self) -> Option<u8> {
        self.last_applied
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBrightnessBackend;

    #[test]
    fn repeated_target_invokes_backend_once() {
        let mut backend = MockBrightnessBackend::new();
        backend
            .expect_set_brightness()
            .times(1)
            .withf(|p| *p == 50)
            .returning(|_| Ok(()));

        let mut applier = BrightnessApplier::new(Box::new(backend));
        assert_eq!(applier.apply(50).unwrap(), Applied::Changed);
        assert_eq!(applier.apply(50).unwrap(), Applied::Unchanged);
        assert_eq!(applier.last_applied(), Some(50));
    }

    #[test]
    fn differing_targets_invoke_backend_each_time() {
        let mut backend = MockBrightnessBackend::new();
        backend
            .expect_set_brightness()
            .times(2)
            .returning(|_| Ok(()));

        let mut applier = BrightnessApplier::new(Box::new(backend));
        assert_eq!(applier.apply(50).unwrap(), Applied::Changed);
        assert_eq!(applier.apply(60).unwrap(), Applied::Changed);
        assert_eq!(applier.last_applied(), Some(60));
    }

    #[test]
    fn failure_keeps_previous_state_for_retry() {
        let mut backend = MockBrightnessBackend::new();
        let mut call = 0;
        backend.expect_set_brightness().times(2).returning(move |_| {
            call += 1;
            if call == 1 {
                Err(anyhow::anyhow!("no compatible monitor"))
            } else {
                Ok(())
            }
        });

        let mut applier = BrightnessApplier::new(Box::new(backend));
        assert!(applier.apply(40).is_err());
        assert_eq!(applier.last_applied(), None);
        // Retry against the same unmet target reaches the backend again
        assert_eq!(applier.apply(40).unwrap(), Applied::Changed);
        assert_eq!(applier.last_applied(), Some(40));
    }

    #[test]
    fn target_above_maximum_is_clamped() {
        let mut backend = MockBrightnessBackend::new();
        backend
            .expect_set_brightness()
            .times(1)
            .withf(|p| *p == 100)
            .returning(|_| Ok(()));

        let mut applier = BrightnessApplier::new(Box::new(backend));
        applier.apply(250).unwrap();
        // The clamped value is what gets tracked
        assert_eq!(applier.apply(100).unwrap(), Applied::Unchanged);
    }
}
