//! Readiness signal for the sync engine.

use crate::config::WebDavConfig;
use tokio::sync::watch;

/// Tells the sync engine when the provider may be used.
///
/// Ready means the application finished its initial data load and the
/// configuration has every required field. Values are emitted only when they
/// change.
#[derive(Debug)]
pub struct ReadySignal {
    data_loaded: watch::Receiver<bool>,
    config: watch::Receiver<Option<WebDavConfig>>,
    last: Option<bool>,
    data_open: bool,
    config_open: bool,
}

impl ReadySignal {
    /// Creates a signal from the data-load flag and the configuration stream.
    pub fn new(
        data_loaded: watch::Receiver<bool>,
        config: watch::Receiver<Option<WebDavConfig>>,
    ) -> Self {
        Self {
            data_loaded,
            config,
            last: None,
            data_open: true,
            config_open: true,
        }
    }

    /// Returns the readiness right now.
    pub fn is_ready(&self) -> bool {
        *self.data_loaded.borrow()
            && self
                .config
                .borrow()
                .as_ref()
                .is_some_and(WebDavConfig::is_complete)
    }

    /// Waits for the next distinct readiness value.
    ///
    /// The first call returns the current value immediately. Returns `None`
    /// once both sources are closed and nothing can change any more.
    pub async fn next(&mut self) -> Option<bool> {
        loop {
            let ready = self.is_ready();
            if self.last != Some(ready) {
                self.last = Some(ready);
                return Some(ready);
            }

            let (data_open, config_open) = (self.data_open, self.config_open);
            if !data_open && !config_open {
                return None;
            }

            tokio::select! {
                changed = self.data_loaded.changed(), if data_open => {
                    if changed.is_err() {
                        self.data_open = false;
                    }
                }
                changed = self.config.changed(), if config_open => {
                    if changed.is_err() {
                        self.config_open = false;
                    }
                }
            }
        }
    }

    /// Waits until the provider is ready.
    ///
    /// Returns false if the sources closed while still not ready.
    pub async fn wait_ready(&mut self) -> bool {
        loop {
            match self.next().await {
                Some(true) => return true,
                Some(false) => continue,
                None => return self.is_ready(),
            }
        }
    }
}
