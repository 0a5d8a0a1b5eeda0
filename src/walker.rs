use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::automation::Page;
use crate::config::WalkPlan;
use crate::error::{AutomationError, ScrapeError};
use crate::extract;
use crate::sentiment::{self, Classifier};
use crate::table::FieldColumns;

// Review widget controls. Cards and numbered buttons are addressed
// through accessible markers; the page count sits in the last
// pagination list item.
pub(crate) const READ_ALL: &str = r#"[data-testid="fr-read-all-reviews"]"#;
pub(crate) const LAST_PAGE_ITEM: &str = "div.ab95b25344 > ol > li:last-child";
pub(crate) const REVIEW_CARD: &str = r#"[aria-label="Review card"]"#;

/// Numbered pagination buttons carry a leading space in their label.
pub(crate) fn page_button(n: u32) -> String {
    format!(r#"button[aria-label=" {}"]"#, n)
}

/// What a finished walk hands to the assembler.
#[derive(Debug)]
pub struct WalkOutcome {
    pub columns: FieldColumns,
    pub pages: u32,
}

/// Walk every review page of one listing and collect per-field columns.
/// Collection is all-or-nothing: the first fatal error aborts the run
/// before anything is persisted.
pub async fn walk(
    page: &dyn Page,
    classifier: &dyn Classifier,
    plan: &WalkPlan,
) -> Result<WalkOutcome, ScrapeError> {
    page.goto(&plan.listing_url).await?;
    page.wait(plan.settle).await;

    click_first(page, READ_ALL, "read-all-reviews control").await?;
    let total = page_count(page).await?;
    let pages = match plan.page_limit {
        Some(limit) => total.min(limit),
        None => total,
    };
    info!("pagination reports {} pages, walking {}", total, pages);

    let pb = ProgressBar::new(pages as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} (eta {eta})")
            .unwrap()
            .progress_chars("=> "),
    );

    let mut columns = FieldColumns::default();
    for n in 1..=pages {
        click_first(page, &page_button(n), "page button").await?;
        page.wait(plan.settle).await;

        let cards = page.find_all(REVIEW_CARD).await?;
        info!("page {}: {} review cards", n, cards.len());

        for card in &cards {
            let fields = extract::fields(card.as_ref()).await?;
            let reply = match extract::partner_reply(card.as_ref(), plan.reply_wait).await {
                Ok(reply) => reply,
                Err(AutomationError::WaitTimeout { what, timeout_ms }) => {
                    warn!(
                        "page {}: {} not revealed within {}ms, storing absent",
                        n, what, timeout_ms
                    );
                    None
                }
                Err(e) => return Err(e.into()),
            };
            let (combined, sentiment) = sentiment::label_review(
                classifier,
                fields.positive_text.as_deref(),
                fields.negative_text.as_deref(),
            )
            .await;
            columns.push_card(fields, reply, combined, sentiment);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(WalkOutcome { columns, pages })
}

async fn click_first(
    page: &dyn Page,
    selector: &str,
    what: &'static str,
) -> Result<(), AutomationError> {
    let found = page.find_all(selector).await?;
    match found.first() {
        Some(el) => el.click().await,
        None => Err(AutomationError::MissingControl(what)),
    }
}

/// Total page count read from the last pagination list item. This value
/// is authoritative; a page with no cards still counts as walked.
async fn page_count(page: &dyn Page) -> Result<u32, ScrapeError> {
    let items = page.find_all(LAST_PAGE_ITEM).await?;
    let item = items
        .first()
        .ok_or(AutomationError::MissingControl("pagination indicator"))?;
    let text = item.text().await?;
    let trimmed = text.trim();
    trimmed.parse().map_err(|_| ScrapeError::PageCount {
        text: trimmed.to_string(),
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::automation::fake::{ClickAction, FakeElement, FakePage};
    use crate::config::ReplyWait;
    use crate::extract::{POSITIVE_TEXT, REPLY_TEXT, REPLY_TOGGLE};
    use crate::sentiment::fakes::RecordingClassifier;
    use crate::table::{assemble, HotelIdentity};

    fn plan() -> WalkPlan {
        WalkPlan {
            listing_url: "https://example.test/hotel".to_string(),
            settle: Duration::from_millis(0),
            reply_wait: ReplyWait {
                timeout: Duration::from_millis(40),
                interval: Duration::from_millis(10),
            },
            page_limit: None,
        }
    }

    fn hotel() -> HotelIdentity {
        HotelIdentity {
            hotel_id: "KWA123".to_string(),
            hotel_name: "Kwa Maritane Lodge".to_string(),
            source_name: "booking.com".to_string(),
        }
    }

    fn card(pos: &str) -> FakeElement {
        let card = FakeElement::new();
        card.add(POSITIVE_TEXT, vec![FakeElement::with_text(pos)]);
        card
    }

    fn bare_card() -> FakeElement {
        FakeElement::new()
    }

    #[tokio::test]
    async fn walks_every_page_and_aligns_columns() {
        let page = FakePage::with_pages(vec![
            vec![card("Lovely view"), card("Calm and clean"), bare_card()],
            vec![card("Friendly staff"), card("Good value")],
        ]);
        let clf = RecordingClassifier::new("joy");

        let outcome = walk(&page, &clf, &plan()).await.unwrap();
        assert_eq!(outcome.pages, 2);
        assert_eq!(outcome.columns.len(), 5);
        for (field, len) in outcome.columns.field_lengths() {
            assert_eq!(len, 5, "column {} out of step", field);
        }
        // The bare card has no text on either side, so only 4 classify calls
        assert_eq!(clf.calls().len(), 4);
        assert_eq!(page.current_page(), 2);
        assert_eq!(page.visited(), vec!["https://example.test/hotel".to_string()]);

        let rows = assemble(outcome.columns, &hotel()).unwrap();
        assert_eq!(rows.len(), 5);
        assert!(rows
            .iter()
            .all(|r| r.hotel_id == "KWA123" && r.hotel_name == "Kwa Maritane Lodge" && !r.seen));
    }

    #[tokio::test]
    async fn zero_card_page_still_advances() {
        let page = FakePage::with_pages(vec![
            vec![card("Quiet")],
            vec![],
            vec![card("Warm pool")],
        ]);
        let clf = RecordingClassifier::new("neutral");

        let outcome = walk(&page, &clf, &plan()).await.unwrap();
        assert_eq!(outcome.pages, 3);
        assert_eq!(outcome.columns.len(), 2);
    }

    #[tokio::test]
    async fn page_limit_caps_the_walk() {
        let page = FakePage::with_pages(vec![
            vec![card("One")],
            vec![card("Two")],
            vec![card("Three")],
        ]);
        let clf = RecordingClassifier::new("neutral");
        let mut capped = plan();
        capped.page_limit = Some(2);

        let outcome = walk(&page, &clf, &capped).await.unwrap();
        assert_eq!(outcome.pages, 2);
        assert_eq!(outcome.columns.len(), 2);
    }

    #[tokio::test]
    async fn missing_read_all_control_is_fatal() {
        let page = FakePage::bare();
        let clf = RecordingClassifier::new("joy");
        let err = walk(&page, &clf, &plan()).await.unwrap_err();
        assert!(matches!(
            err,
            ScrapeError::Automation(AutomationError::MissingControl(_))
        ));
    }

    #[tokio::test]
    async fn unreadable_page_count_is_fatal() {
        let page = FakePage::bare();
        page.add(READ_ALL, vec![FakeElement::new()]);
        page.add(LAST_PAGE_ITEM, vec![FakeElement::with_text("many")]);
        let clf = RecordingClassifier::new("joy");
        let err = walk(&page, &clf, &plan()).await.unwrap_err();
        assert!(matches!(err, ScrapeError::PageCount { .. }));
    }

    #[tokio::test]
    async fn reply_timeout_stores_absent_and_continues() {
        let stuck = card("Nice stay");
        stuck.add(REPLY_TOGGLE, vec![FakeElement::new()]);
        let page = FakePage::with_pages(vec![vec![stuck, card("All fine")]]);
        let clf = RecordingClassifier::new("joy");

        let outcome = walk(&page, &clf, &plan()).await.unwrap();
        assert_eq!(outcome.columns.len(), 2);
        assert_eq!(outcome.columns.partner_reply_text[0], None);
    }

    #[tokio::test]
    async fn walked_columns_assemble_into_rows() {
        let replying = card("Spot on");
        let toggle = FakeElement::new();
        toggle.on_click(ClickAction::Reveal {
            target: replying.clone(),
            selector: REPLY_TEXT.to_string(),
            element: FakeElement::with_text("Glad you enjoyed it."),
        });
        replying.add(REPLY_TOGGLE, vec![toggle]);
        let page = FakePage::with_pages(vec![vec![replying], vec![bare_card()]]);
        let clf = RecordingClassifier::new("joy");

        let outcome = walk(&page, &clf, &plan()).await.unwrap();
        let rows = assemble(outcome.columns, &hotel()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].partner_reply_text.as_deref(),
            Some("Glad you enjoyed it.")
        );
        assert_eq!(rows[0].sentiment.as_deref(), Some("joy"));
        assert_eq!(
            rows[0].combined_review_text.as_deref(),
            Some("Positive: Spot on negative: None")
        );
        assert_eq!(rows[1].sentiment, None);
        assert!(rows.iter().all(|r| r.hotel_id == "KWA123" && !r.seen));
    }
}
