pub mod webdriver;

#[cfg(test)]
pub mod fake;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AutomationError;

/// One element inside a loaded page. Queries run against the live DOM,
/// so repeated calls can observe content revealed after a click.
#[async_trait]
pub trait Element: Send + Sync {
    async fn text(&self) -> Result<String, AutomationError>;
    async fn attribute(&self, name: &str) -> Result<Option<String>, AutomationError>;
    async fn click(&self) -> Result<(), AutomationError>;
    async fn is_displayed(&self) -> Result<bool, AutomationError>;
    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>, AutomationError>;
}

/// A browser tab the walker drives. Selectors are CSS.
#[async_trait]
pub trait Page: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), AutomationError>;
    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>, AutomationError>;

    /// Fixed-duration settle after navigation actions.
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
