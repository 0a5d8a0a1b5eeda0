use serde::Serialize;

use crate::error::ScrapeError;
use crate::extract::CardFields;

/// Scalar listing facts broadcast onto every row of a run.
pub struct HotelIdentity {
    pub hotel_id: String,
    pub hotel_name: String,
    pub source_name: String,
}

/// One flat review row. Field order here is the canonical column order
/// for both sinks.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRecord {
    pub hotel_id: String,
    pub hotel_name: String,
    pub source_name: String,
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
    pub partner_reply_text: Option<String>,
    pub sentiment: Option<String>,
    pub combined_review_text: Option<String>,
    pub seen: bool,
}

/// Per-field accumulators, one entry per card in walk order.
#[derive(Debug, Default)]
pub struct FieldColumns {
    pub positive_text: Vec<Option<String>>,
    pub negative_text: Vec<Option<String>>,
    pub rating: Vec<Option<String>>,
    pub reviewer_name: Vec<Option<String>>,
    pub reviewer_country: Vec<Option<String>>,
    pub checkin_date: Vec<Option<String>>,
    pub review_created_date: Vec<Option<String>>,
    pub apartment_type: Vec<Option<String>>,
    pub length_of_stay_nights: Vec<Option<i64>>,
    pub group_type: Vec<Option<String>>,
    pub partner_reply_text: Vec<Option<String>>,
    pub sentiment: Vec<Option<String>>,
    pub combined_review_text: Vec<Option<String>>,
}

impl FieldColumns {
    /// Append one card's worth of values. Every column grows by exactly
    /// one entry, absent fields included.
    pub fn push_card(
        &mut self,
        fields: CardFields,
        partner_reply: Option<String>,
        combined: Option<String>,
        sentiment: Option<String>,
    ) {
        self.positive_text.push(fields.positive_text);
        self.negative_text.push(fields.negative_text);
        self.rating.push(fields.rating);
        self.reviewer_name.push(fields.reviewer_name);
        self.reviewer_country.push(fields.reviewer_country);
        self.checkin_date.push(fields.checkin_date);
        self.review_created_date.push(fields.review_created_date);
        self.apartment_type.push(fields.apartment_type);
        self.length_of_stay_nights.push(fields.length_of_stay_nights);
        self.group_type.push(fields.group_type);
        self.partner_reply_text.push(partner_reply);
        self.sentiment.push(sentiment);
        self.combined_review_text.push(combined);
    }

    pub fn len(&self) -> usize {
        self.positive_text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Field name and collected length for every column, in column order.
    pub fn field_lengths(&self) -> [(&'static str, usize); 13] {
        [
            ("positive_text", self.positive_text.len()),
            ("negative_text", self.negative_text.len()),
            ("rating", self.rating.len()),
            ("reviewer_name", self.reviewer_name.len()),
            ("reviewer_country", self.reviewer_country.len()),
            ("checkin_date", self.checkin_date.len()),
            ("review_created_date", self.review_created_date.len()),
            ("apartment_type", self.apartment_type.len()),
            ("length_of_stay_nights", self.length_of_stay_nights.len()),
            ("group_type", self.group_type.len()),
            ("partner_reply_text", self.partner_reply_text.len()),
            ("sentiment", self.sentiment.len()),
            ("combined_review_text", self.combined_review_text.len()),
        ]
    }
}

/// Zip the columns into rows, broadcasting the listing identity onto each
/// one. Any column out of step with the rest fails the whole run.
pub fn assemble(
    mut columns: FieldColumns,
    hotel: &HotelIdentity,
) -> Result<Vec<ReviewRecord>, ScrapeError> {
    let expected = columns.len();
    for (field, actual) in columns.field_lengths() {
        if actual != expected {
            return Err(ScrapeError::ColumnMismatch {
                field,
                expected,
                actual,
            });
        }
    }

    let mut rows = Vec::with_capacity(expected);
    for i in 0..expected {
        rows.push(ReviewRecord {
            hotel_id: hotel.hotel_id.clone(),
            hotel_name: hotel.hotel_name.clone(),
            source_name: hotel.source_name.clone(),
            positive_text: columns.positive_text[i].take(),
            negative_text: columns.negative_text[i].take(),
            rating: columns.rating[i].take(),
            reviewer_name: columns.reviewer_name[i].take(),
            reviewer_country: columns.reviewer_country[i].take(),
            checkin_date: columns.checkin_date[i].take(),
            review_created_date: columns.review_created_date[i].take(),
            apartment_type: columns.apartment_type[i].take(),
            length_of_stay_nights: columns.length_of_stay_nights[i].take(),
            group_type: columns.group_type[i].take(),
            partner_reply_text: columns.partner_reply_text[i].take(),
            sentiment: columns.sentiment[i].take(),
            combined_review_text: columns.combined_review_text[i].take(),
            seen: false,
        });
    }
    Ok(rows)
}

// ── Tests ──
