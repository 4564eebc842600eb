//! Fallback field extraction: regex matching over the document's plain text,
//! used only when no tables were detected anywhere in the document.
//!
//! The field set is fixed (common invoice fields); each field tries its
//! patterns in order and keeps the first match. `None` fields are omitted
//! from the serialized output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::text::{clean, parse_date, to_decimal};

/// Fields pulled from plain text when no table exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FallbackFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_order: Option<String>,
}

impl FallbackFields {
    pub fn is_empty(&self) -> bool {
        self.invoice_number.is_none()
            && self.invoice_date.is_none()
            && self.due_date.is_none()
            && self.total_amount.is_none()
            && self.subtotal.is_none()
            && self.tax_amount.is_none()
            && self.currency.is_none()
            && self.purchase_order.is_none()
    }
}

// A date-ish token: separated day/month/year in any order, or 8 digits.
const DATE_TOKEN: &str = r"[0-9]{1,4}[./\-][0-9]{1,2}[./\-][0-9]{2,4}|[0-9]{8}";
// An amount with optional thousands separators.
const AMOUNT_TOKEN: &str = r"[\d,]+\.?\d*";

static INVOICE_NO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)\binvoice\s*(?:number|no\.?|num\.?|#)\s*[:#|]?\s*([A-Za-z0-9][A-Za-z0-9/\-]*)")
        .unwrap()
});
static INVOICE_NO_BARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)\binvoice\s*[:#|]\s*([A-Za-z0-9][A-Za-z0-9/\-]*)").unwrap()
});

static INVOICE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?im)\binvoice\s*date\s*[:|]?\s*({DATE_TOKEN})")).unwrap()
});
static GENERIC_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?im)\bdate\s*[:|]?\s*({DATE_TOKEN})")).unwrap()
});

static DUE_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?im)\b(?:due\s*date|payment\s*due(?:\s*date)?|date\s*due)\s*[:|]?\s*({DATE_TOKEN})"
    ))
    .unwrap()
});

static TOTAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?im)\b(?:grand\s*)?total\s*(?:amount|due|payable)?\s*[:|]?\s*(?:[A-Z]{{3}}\s*)?[$€£₹]?\s*({AMOUNT_TOKEN})"
    ))
    .unwrap()
});
static AMOUNT_DUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?im)\bamount\s*(?:due|payable)\s*[:|]?\s*[$€£₹]?\s*({AMOUNT_TOKEN})"
    ))
    .unwrap()
});

static SUBTOTAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?im)\bsub\s*[- ]?total\s*[:|]?\s*[$€£₹]?\s*({AMOUNT_TOKEN})"
    ))
    .unwrap()
});

static TAX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?im)\b(?:sales\s*tax|tax|vat|gst)\s*(?:amount)?\s*[:|]?\s*[$€£₹]?\s*({AMOUNT_TOKEN})"
    ))
    .unwrap()
});

static CURRENCY_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(USD|EUR|GBP|INR|AUD|CAD|JPY|CNY|CHF|SGD|AED|NZD)\b").unwrap()
});

static PURCHASE_ORDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)\bpurchase\s*order\s*(?:number|no\.?|#)?\s*[:#|]?\s*([A-Za-z0-9][A-Za-z0-9/\-]*)",
    )
    .unwrap()
});
static PO_SHORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)\bp\.?o\.?\s*(?:number|no\.?|#)\s*[:#|]?\s*([A-Za-z0-9][A-Za-z0-9/\-]*)")
        .unwrap()
});

/// Run the fixed field patterns over the full document text.
pub fn match_fields(text: &str) -> FallbackFields {
    FallbackFields {
        invoice_number: first_capture(&INVOICE_NO, text)
            .or_else(|| first_capture(&INVOICE_NO_BARE, text)),
        invoice_date: match_invoice_date(text),
        due_date: first_capture(&DUE_DATE, text).and_then(|v| parse_date(&v)),
        total_amount: match_total(text)
            .or_else(|| first_capture(&AMOUNT_DUE, text).and_then(|v| to_decimal(&v))),
        subtotal: first_capture(&SUBTOTAL, text).and_then(|v| to_decimal(&v)),
        tax_amount: first_capture(&TAX, text).and_then(|v| to_decimal(&v)),
        currency: match_currency(text),
        purchase_order: first_capture(&PURCHASE_ORDER, text)
            .or_else(|| first_capture(&PO_SHORT, text)),
    }
}

fn match_invoice_date(text: &str) -> Option<String> {
    if let Some(v) = first_capture(&INVOICE_DATE, text) {
        return parse_date(&v);
    }
    // The regex crate has no lookbehind, so the generic "Date:" pattern
    // would also hit "Due Date:" lines; filter those out by peeking at the
    // text just before the match.
    match_guarded(&GENERIC_DATE, text, &["due", "delivery", "ship"]).and_then(|v| parse_date(&v))
}

fn match_total(text: &str) -> Option<String> {
    // "Sub Total" would otherwise satisfy the total pattern.
    match_guarded(&TOTAL, text, &["sub"]).and_then(|v| to_decimal(&v))
}

/// First capture of `re` whose match is not immediately preceded by one of
/// `needles` (case-insensitive, within a short window).
fn match_guarded(re: &Regex, text: &str, needles: &[&str]) -> Option<String> {
    for caps in re.captures_iter(text) {
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        if preceded_by(text, start, needles) {
            continue;
        }
        if let Some(v) = caps.get(1).and_then(|m| clean(m.as_str())) {
            return Some(v);
        }
    }
    None
}

fn preceded_by(text: &str, start: usize, needles: &[&str]) -> bool {
    let mut from = start.saturating_sub(16);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    let prefix = text[from..start].to_ascii_lowercase();
    needles.iter().any(|n| prefix.contains(n))
}

fn match_currency(text: &str) -> Option<String> {
    if let Some(m) = CURRENCY_CODE.find(text) {
        return Some(m.as_str().to_string());
    }
    for (symbol, code) in [('€', "EUR"), ('£', "GBP"), ('₹', "INR"), ('$', "USD")] {
        if text.contains(symbol) {
            return Some(code.to_string());
        }
    }
    None
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| clean(m.as_str()))
}
