//! Expanding and restoring the collapsible reasoning trace.

use std::time::Duration;

use log::{debug, warn};

use super::{Extractor, Page};
use crate::util::sleep;

/// How long to wait for a reasoning trace to render after expanding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandPolicy {
    /// Number of checks after the click.
    pub attempts: u32,
    /// Pause between checks.
    pub interval: Duration,
}

impl Default for ExpandPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_millis(50),
        }
    }
}

impl ExpandPolicy {
    /// Check without waiting between attempts.
    pub fn immediate(attempts: u32) -> Self {
        Self {
            attempts,
            interval: Duration::ZERO,
        }
    }
}

impl Extractor {
    fn has_thoughts<P: Page + ?Sized>(&self, page: &P, position: usize) -> bool {
        self.conversation_at(page.dom(), position)
            .is_some_and(|container| !self.model_thoughts(page.dom(), container).is_empty())
    }

    /// Open the reasoning trace of the container at `position` if it is collapsed.
    ///
    /// Returns `true` only if this call expanded it, i.e. the caller should
    /// collapse it again with [`restore_thoughts`](Self::restore_thoughts).
    pub fn ensure_thoughts_expanded<P: Page + ?Sized>(
        &self,
        page: &mut P,
        position: usize,
        policy: &ExpandPolicy,
    ) -> bool {
        let Some(container) = self.conversation_at(page.dom(), position) else {
            return false;
        };
        if !self.model_thoughts(page.dom(), container).is_empty() {
            return false;
        }
        let Some(toggle) = self.thoughts_toggle(page.dom(), container) else {
            debug!("turn {position}: no reasoning trace toggle");
            return false;
        };
        if !page.click(toggle) {
            debug!("turn {position}: reasoning trace toggle not clickable");
            return false;
        }

        for attempt in 0..policy.attempts {
            if self.has_thoughts(&*page, position) {
                debug!("turn {position}: reasoning trace expanded after {attempt} waits");
                return true;
            }
            sleep(policy.interval);
        }
        warn!(
            "turn {position}: reasoning trace did not appear after {} checks",
            policy.attempts
        );
        false
    }

    /// Collapse the reasoning trace again if `expanded` says we opened it.
    pub fn restore_thoughts<P: Page + ?Sized>(
        &self,
        page: &mut P,
        position: usize,
        expanded: bool,
    ) {
        if !expanded {
            return;
        }
        let toggle = self
            .conversation_at(page.dom(), position)
            .and_then(|container| self.thoughts_toggle(page.dom(), container));
        if toggle.is_some_and(|toggle| page.click(toggle)) {
            debug!("turn {position}: reasoning trace collapsed");
        } else {
            warn!("turn {position}: could not collapse reasoning trace");
        }
    }
}
