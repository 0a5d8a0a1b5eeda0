use std::sync::LazyLock;

use regex::Regex;

use crate::automation::Element;
use crate::config::ReplyWait;
use crate::error::AutomationError;

// Review card markers. data-testid attributes are stable; the class pairs
// are the obfuscated-but-long-lived ones the widget ships with.
pub(crate) const POSITIVE_TEXT: &str = r#"[data-testid="review-positive-text"] span"#;
pub(crate) const NEGATIVE_TEXT: &str = r#"[data-testid="review-negative-text"] span"#;
pub(crate) const RATING_BADGE: &str = ".a3b8729ab1.d86cee9b25";
pub(crate) const REVIEWER_NAME: &str = ".a3332d346a.e6208ee469";
pub(crate) const COUNTRY_FLAG: &str = "span.afac1f68d9.a1ad95c055 img";
pub(crate) const CHECKIN_DATE: &str = r#"[data-testid="review-stay-date"]"#;
pub(crate) const ROOM_NAME: &str = r#"span[data-testid="review-room-name"]"#;
pub(crate) const NUM_NIGHTS: &str = r#"span[data-testid="review-num-nights"]"#;
pub(crate) const TRAVELER_TYPE: &str = r#"span[data-testid="review-traveler-type"]"#;
pub(crate) const REVIEW_DATE: &str = r#"[data-testid="review-date"]"#;
pub(crate) const REPLY_TOGGLE: &str = r#"[data-testid="review-pr-toggle"]"#;
pub(crate) const REPLY_TEXT: &str = r#"[data-testid="review-partner-reply"] .a53cbfa6de.b5726afd0b span"#;

const REVIEWED_PREFIX: &str = "Reviewed: ";

static FIRST_INT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// All per-card fields except the partner reply, which needs a bounded
/// wait and is extracted separately.
#[derive(Debug, Default)]
pub struct CardFields {
    pub positive_text: Option<String>,
    pub negative_text: Option<String>,
    pub rating: Option<String>,
    pub reviewer_name: Option<String>,
    pub reviewer_country: Option<String>,
    pub checkin_date: Option<String>,
    pub review_created_date: Option<String>,
    pub apartment_type: Option<String>,
    pub length_of_stay_nights: Option<i64>,
    pub group_type: Option<String>,
}

pub async fn fields(card: &dyn Element) -> Result<CardFields, AutomationError> {
    let (positive_text, negative_text) = review_texts(card).await?;
    Ok(CardFields {
        positive_text,
        negative_text,
        rating: rating(card).await?,
        reviewer_name: trimmed_text(card, REVIEWER_NAME).await?,
        reviewer_country: reviewer_country(card).await?,
        checkin_date: trimmed_text(card, CHECKIN_DATE).await?,
        review_created_date: review_created_date(card).await?,
        apartment_type: trimmed_text(card, ROOM_NAME).await?,
        length_of_stay_nights: stay_length_nights(card).await?,
        group_type: trimmed_text(card, TRAVELER_TYPE).await?,
    })
}

/// Positive and negative sides of a review. Long reviews render a lead-in
/// span before the content span, so with two or more matches the second
/// span holds the real text.
pub async fn review_texts(
    card: &dyn Element,
) -> Result<(Option<String>, Option<String>), AutomationError> {
    Ok((
        side_text(card, POSITIVE_TEXT).await?,
        side_text(card, NEGATIVE_TEXT).await?,
    ))
}

async fn side_text(card: &dyn Element, selector: &str) -> Result<Option<String>, AutomationError> {
    let spans = card.find_all(selector).await?;
    let chosen = match spans.len() {
        0 => return Ok(None),
        1 => &spans[0],
        _ => &spans[1],
    };
    let text = chosen.text().await?;
    Ok((!text.is_empty()).then_some(text))
}

/// The rating badge repeats the score; the last whitespace token is it.
pub async fn rating(card: &dyn Element) -> Result<Option<String>, AutomationError> {
    let badges = card.find_all(RATING_BADGE).await?;
    let text = match badges.first() {
        Some(badge) => badge.text().await?,
        None => return Ok(None),
    };
    Ok(text.split_whitespace().last().map(str::to_string))
}

/// Country comes from the flag image's accessible name, not element text.
pub async fn reviewer_country(card: &dyn Element) -> Result<Option<String>, AutomationError> {
    let flags = card.find_all(COUNTRY_FLAG).await?;
    let name = match flags.first() {
        Some(img) => img.attribute("alt").await?,
        None => return Ok(None),
    };
    Ok(name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()))
}

/// First integer in the num-nights marker ("3 nights" → 3).
pub async fn stay_length_nights(card: &dyn Element) -> Result<Option<i64>, AutomationError> {
    let found = card.find_all(NUM_NIGHTS).await?;
    let text = match found.first() {
        Some(el) => el.text().await?,
        None => return Ok(None),
    };
    Ok(FIRST_INT_RE.find(&text).and_then(|m| m.as_str().parse().ok()))
}

/// The submission date marker carries a "Reviewed: " label to strip.
pub async fn review_created_date(card: &dyn Element) -> Result<Option<String>, AutomationError> {
    let found = card.find_all(REVIEW_DATE).await?;
    let text = match found.first() {
        Some(el) => el.text().await?,
        None => return Ok(None),
    };
    let cleaned = text.replace(REVIEWED_PREFIX, "");
    let trimmed = cleaned.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// Expand and read the property's reply. The toggle is only clicked when
/// present and displayed; an absent toggle means no reply and costs no
/// wait. After the click the reply text is polled until `wait.timeout`.
pub async fn partner_reply(
    card: &dyn Element,
    wait: ReplyWait,
) -> Result<Option<String>, AutomationError> {
    let toggles = card.find_all(REPLY_TOGGLE).await?;
    let toggle = match toggles.first() {
        Some(t) => t,
        None => return Ok(None),
    };
    if !toggle.is_displayed().await? {
        return Ok(None);
    }
    toggle.click().await?;

    let interval_ms = wait.interval.as_millis().max(1);
    let attempts = (wait.timeout.as_millis() / interval_ms).max(1);
    for _ in 0..attempts {
        let found = card.find_all(REPLY_TEXT).await?;
        if let Some(el) = found.first() {
            let text = el.text().await?;
            let trimmed = text.trim();
            return Ok((!trimmed.is_empty()).then(|| trimmed.to_string()));
        }
        tokio::time::sleep(wait.interval).await;
    }
    Err(AutomationError::WaitTimeout {
        what: "partner reply text",
        timeout_ms: wait.timeout.as_millis() as u64,
    })
}

async fn trimmed_text(
    card: &dyn Element,
    selector: &str,
) -> Result<Option<String>, AutomationError> {
    let found = card.find_all(selector).await?;
    let text = match found.first() {
        Some(el) => el.text().await?,
        None => return Ok(None),
    };
    let trimmed = text.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

// ── Tests ──
