//! Price/size level extraction from feed text.
//!
//! Both encodings describe depth as a run of price/size pairs embedded in a
//! single field. Text that does not form a pair is skipped, and collection
//! stops once `max_levels` pairs have been read.

use orderstream_core::{PriceSize, Size};

fn parse_number(digits: &str) -> Result<Size, String> {
    digits
        .parse::<Size>()
        .map_err(|e| format!("invalid number '{digits}': {e}"))
}

const PRICE_LABEL: &str = "Price:";
const QUANTITY_LABEL: &str = "Quantity:";

/// Extract `Price: <int> Quantity: <int>` pairs.
///
/// Labels and numbers are separated by whitespace; whatever follows a
/// quantity's digits (`,`, `;`, another label) is ignored.
pub fn parse_labelled_levels(text: &str, max_levels: usize) -> Result<Vec<PriceSize>, String> {
    let mut levels = Vec::with_capacity(max_levels);
    let mut rest = text;

    while levels.len() < max_levels {
        let Some(at) = rest.find(PRICE_LABEL) else {
            break;
        };
        let after = &rest[at + PRICE_LABEL.len()..];
        match labelled_pair(after) {
            Some((price, size, end)) => {
                levels.push(PriceSize::new(parse_number(price)?, parse_number(size)?));
                rest = &after[end..];
            }
            None => rest = after,
        }
    }

    Ok(levels)
}

/// Digits of `<ws><price><ws>Quantity:<ws><size>` at the start of `text`,
/// with the byte offset just past the size.
fn labelled_pair(text: &str) -> Option<(&str, &str, usize)> {
    let bytes = text.as_bytes();

    let price_start = whitespace_run_end(bytes, 0);
    let price_end = digit_run_end(bytes, price_start);
    if price_start == 0 || price_end == price_start {
        return None;
    }

    let label_start = whitespace_run_end(bytes, price_end);
    if label_start == price_end || !text[label_start..].starts_with(QUANTITY_LABEL) {
        return None;
    }

    let label_end = label_start + QUANTITY_LABEL.len();
    let size_start = whitespace_run_end(bytes, label_end);
    let size_end = digit_run_end(bytes, size_start);
    if size_start == label_end || size_end == size_start {
        return None;
    }

    Some((&text[price_start..price_end], &text[size_start..size_end], size_end))
}

/// Extract `price,size` pairs.
pub fn parse_pairs(text: &str, max_levels: usize) -> Result<Vec<PriceSize>, String> {
    let bytes = text.as_bytes();
    let mut levels = Vec::with_capacity(max_levels);
    let mut i = 0;

    while i < bytes.len() && levels.len() < max_levels {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let price_end = digit_run_end(bytes, i);
        if price_end < bytes.len() && bytes[price_end] == b',' {
            let size_start = price_end + 1;
            let size_end = digit_run_end(bytes, size_start);
            if size_end > size_start {
                levels.push(PriceSize::new(
                    parse_number(&text[i..price_end])?,
                    parse_number(&text[size_start..size_end])?,
                ));
                i = size_end;
                continue;
            }
        }
        i = price_end;
    }

    Ok(levels)
}

/// First `price,size` pair in `text`, if any.
pub fn parse_pair(text: &str) -> Result<Option<PriceSize>, String> {
    Ok(parse_pairs(text, 1)?.into_iter().next())
}

pub(crate) fn digit_run_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    end
}

fn whitespace_run_end(bytes: &[u8], start: usize) -> usize {
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_whitespace() {
        end += 1;
    }
    end
}
