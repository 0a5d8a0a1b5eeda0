//! In-memory stand-ins for the WebDriver layer. Selector matching is
//! exact-string, so tests wire children under the same selector constants
//! the production code queries with.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Element, Page};
use crate::error::AutomationError;
use crate::walker;

/// What a [`FakeElement`] does when clicked. Actions fire once.
#[derive(Default)]
pub enum ClickAction {
    #[default]
    Nothing,
    /// Attach `element` under `target` at `selector`, like a toggle
    /// revealing collapsed content elsewhere in the card.
    Reveal {
        target: FakeElement,
        selector: String,
        element: FakeElement,
    },
    /// Switch the owning [`FakePage`] to the given page number.
    SelectPage { state: Arc<Mutex<u32>>, page: u32 },
}

#[derive(Clone, Default)]
pub struct FakeElement {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    text: String,
    attrs: Mutex<HashMap<String, String>>,
    hidden: AtomicBool,
    children: Mutex<HashMap<String, Vec<FakeElement>>>,
    on_click: Mutex<ClickAction>,
    clicks: AtomicUsize,
    lookups: Mutex<Vec<String>>,
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            inner: Arc::new(Inner {
                text: text.to_string(),
                ..Default::default()
            }),
        }
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.inner
            .attrs
            .lock()
            .unwrap()
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn hidden(self) -> Self {
        self.inner.hidden.store(true, Ordering::SeqCst);
        self
    }

    pub fn add(&self, selector: &str, elements: Vec<FakeElement>) {
        self.inner
            .children
            .lock()
            .unwrap()
            .entry(selector.to_string())
            .or_default()
            .extend(elements);
    }

    pub fn on_click(&self, action: ClickAction) {
        *self.inner.on_click.lock().unwrap() = action;
    }

    pub fn clicks(&self) -> usize {
        self.inner.clicks.load(Ordering::SeqCst)
    }

    /// Every selector this element was queried with, in order.
    pub fn lookups(&self) -> Vec<String> {
        self.inner.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl Element for FakeElement {
    async fn text(&self) -> Result<String, AutomationError> {
        Ok(self.inner.text.clone())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>, AutomationError> {
        Ok(self.inner.attrs.lock().unwrap().get(name).cloned())
    }

    async fn click(&self) -> Result<(), AutomationError> {
        self.inner.clicks.fetch_add(1, Ordering::SeqCst);
        let action = std::mem::take(&mut *self.inner.on_click.lock().unwrap());
        match action {
            ClickAction::Nothing => {}
            ClickAction::Reveal {
                target,
                selector,
                element,
            } => target.add(&selector, vec![element]),
            ClickAction::SelectPage { state, page } => *state.lock().unwrap() = page,
        }
        Ok(())
    }

    async fn is_displayed(&self) -> Result<bool, AutomationError> {
        Ok(!self.inner.hidden.load(Ordering::SeqCst))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>, AutomationError> {
        self.inner.lookups.lock().unwrap().push(selector.to_string());
        let children = self.inner.children.lock().unwrap();
        Ok(children
            .get(selector)
            .into_iter()
            .flatten()
            .map(|el| Box::new(el.clone()) as Box<dyn Element>)
            .collect())
    }
}

#[derive(Default)]
pub struct FakePage {
    children: Mutex<HashMap<String, Vec<FakeElement>>>,
    cards_by_page: Vec<Vec<FakeElement>>,
    current_page: Arc<Mutex<u32>>,
    visited: Mutex<Vec<String>>,
}

impl FakePage {
    /// A page with no controls at all.
    pub fn bare() -> Self {
        Self::default()
    }

    /// A full review widget: read-all control, pagination indicator, one
    /// numbered button per page, and the given cards behind each page.
    /// No cards are served until a page button has been clicked.
    pub fn with_pages(cards_by_page: Vec<Vec<FakeElement>>) -> Self {
        let page = Self {
            cards_by_page,
            ..Default::default()
        };
        let total = page.cards_by_page.len() as u32;
        page.add(walker::READ_ALL, vec![FakeElement::new()]);
        page.add(
            walker::LAST_PAGE_ITEM,
            vec![FakeElement::with_text(&total.to_string())],
        );
        for n in 1..=total {
            let button = FakeElement::new();
            button.on_click(ClickAction::SelectPage {
                state: Arc::clone(&page.current_page),
                page: n,
            });
            page.add(&walker::page_button(n), vec![button]);
        }
        page
    }

    pub fn add(&self, selector: &str, elements: Vec<FakeElement>) {
        self.children
            .lock()
            .unwrap()
            .entry(selector.to_string())
            .or_default()
            .extend(elements);
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn current_page(&self) -> u32 {
        *self.current_page.lock().unwrap()
    }
}

#[async_trait]
impl Page for FakePage {
    async fn goto(&self, url: &str) -> Result<(), AutomationError> {
        self.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>, AutomationError> {
        if selector == walker::REVIEW_CARD {
            let current = *self.current_page.lock().unwrap();
            let cards = match current {
                0 => &[][..],
                n => self
                    .cards_by_page
                    .get(n as usize - 1)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]),
            };
            return Ok(cards
                .iter()
                .map(|el| Box::new(el.clone()) as Box<dyn Element>)
                .collect());
        }
        let children = self.children.lock().unwrap();
        Ok(children
            .get(selector)
            .into_iter()
            .flatten()
            .map(|el| Box::new(el.clone()) as Box<dyn Element>)
            .collect())
    }
}
