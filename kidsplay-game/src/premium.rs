//! Simulated premium unlock. No payment, no expiry.
use crate::KeyValueStore;

/// Storage key of the premium flag.
pub const PREMIUM_KEY: &str = "isPremium";

#[derive(Debug, Clone)]
pub struct PremiumFlag<S> {
    store: S,
}

impl<S: KeyValueStore> PremiumFlag<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn is_premium_user(&self) -> bool {
        match self.store.get_item(PREMIUM_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(err) => {
                log::warn!("reading {PREMIUM_KEY} failed: {err}");
                false
            }
        }
    }

    pub fn upgrade_to_premium(&self) {
        if let Err(err) = self.store.set_item(PREMIUM_KEY, "true") {
            log::warn!("persisting {PREMIUM_KEY} failed: {err}");
        } else {
            log::info!("premium unlocked");
        }
    }
}
