use async_trait::async_trait;
use thirtyfour::prelude::*;
use tracing::info;

use super::{Element, Page};
use crate::error::AutomationError;

/// A live WebDriver session. The browser window stays open for the whole
/// run and must be released with [`Session::close`] on every exit path.
pub struct Session {
    driver: WebDriver,
}

impl Session {
    pub async fn connect(server_url: &str) -> Result<Self, AutomationError> {
        let caps = DesiredCapabilities::chrome();
        let driver = WebDriver::new(server_url, caps).await?;
        info!("webdriver session established at {}", server_url);
        Ok(Self { driver })
    }

    pub async fn close(self) -> Result<(), AutomationError> {
        self.driver.quit().await?;
        Ok(())
    }
}

#[async_trait]
impl Page for Session {
    async fn goto(&self, url: &str) -> Result<(), AutomationError> {
        self.driver.goto(url).await?;
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>, AutomationError> {
        let found = self.driver.find_all(By::Css(selector)).await?;
        Ok(found.into_iter().map(boxed).collect())
    }
}

struct DriverElement {
    inner: WebElement,
}

fn boxed(inner: WebElement) -> Box<dyn Element> {
    Box::new(DriverElement { inner })
}

#[async_trait]
impl Element for DriverElement {
    async fn text(&self) -> Result<String, AutomationError> {
        Ok(self.inner.text().await?)
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, AutomationError> {
        Ok(self.inner.attr(name).await?)
    }

    async fn click(&self) -> Result<(), AutomationError> {
        self.inner.click().await?;
        Ok(())
    }

    async fn is_displayed(&self) -> Result<bool, AutomationError> {
        Ok(self.inner.is_displayed().await?)
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>, AutomationError> {
        let found = self.inner.find_all(By::Css(selector)).await?;
        Ok(found.into_iter().map(boxed).collect())
    }
}
