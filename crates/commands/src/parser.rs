//! Free-text payload parsers.
//!
//! Restock strings are whitespace-separated `<digits><letters>` /
//! `<letters><digits>` tokens ("100ew", "ew100"). Sale strings are
//! positional: serial, first name, last name, phone, price, region code,
//! then free-text description. Both parsers are pure; the catalog is only
//! consulted for code resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pikwa_catalog::{Catalog, Region};
use pikwa_core::{Alias, DomainError, DomainResult, ProductCode, PurchasePrice, SerialNumber};
use pikwa_sales::{Buyer, SaleRequest};

/// Parsed restock payload.
///
/// Unrecognized codes are not fatal: they are reported back per-code while
/// the recognized lines proceed. A token with no numeric amount at all, or
/// with no code at all, fails the entire command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockCommand {
    /// Valid request lines: recognized code, positive amount.
    pub requests: Vec<(ProductCode, u32)>,
    /// Candidate codes the catalog did not recognize.
    pub unrecognized: Vec<String>,
}

/// Decode a restock payload against the catalog.
///
/// Per-token outcomes mirror the field protocol: a missing amount (or
/// missing code) anywhere rejects the whole command, an unknown code is
/// collected and reported, and an amount of zero counts as unrecognized
/// rather than a request for nothing.
pub fn parse_restock_command(text: &str, catalog: &Catalog) -> DomainResult<RestockCommand> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(DomainError::malformed("empty restock command"));
    }

    let mut requests = Vec::new();
    let mut unrecognized = Vec::new();

    for token in tokens {
        let code_str: String = token
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_uppercase();
        if code_str.is_empty() {
            return Err(DomainError::malformed(
                "missing product code; restock lines cannot contain spaces",
            ));
        }

        let code = match ProductCode::new(&code_str) {
            Ok(code) if catalog.contains(&code) => code,
            _ => {
                unrecognized.push(code_str);
                continue;
            }
        };

        let digits: String = token.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return Err(DomainError::malformed(
                "missing amount; restock lines cannot contain spaces",
            ));
        }
        let amount: u32 = digits
            .parse()
            .map_err(|_| DomainError::malformed("amount is too large"))?;
        if amount == 0 {
            unrecognized.push(code_str);
            continue;
        }

        requests.push((code, amount));
    }

    Ok(RestockCommand {
        requests,
        unrecognized,
    })
}

/// Printed serial length on the devices in circulation.
const PRINTED_SERIAL_LEN: usize = 7;

/// Decode and validate a sale payload.
///
/// Validation never stops at the first bad field: every detected problem is
/// collected into one `Validation` error so the seller gets a single
/// combined correction message.
pub fn parse_sale_command(
    text: &str,
    catalog: &Catalog,
    seller: &Alias,
    now: DateTime<Utc>,
) -> DomainResult<SaleRequest> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 7 {
        return Err(DomainError::validation_one(
            "Sale missing information. Please check the format and try again",
        ));
    }

    let mut problems = Vec::new();

    // Serial number.
    let serial_raw = tokens[0].to_uppercase();
    if serial_raw.len() != PRINTED_SERIAL_LEN {
        problems.push(format!("SN must be {PRINTED_SERIAL_LEN} characters"));
    }
    if serial_raw
        .as_bytes()
        .iter()
        .take(2)
        .all(u8::is_ascii_digit)
    {
        problems.push("SN must start with a product code".to_string());
    }
    let serial = match SerialNumber::new(&serial_raw) {
        Ok(serial) => Some(serial),
        Err(_) => {
            problems.push(format!("SN {serial_raw} not understood"));
            None
        }
    };

    // Product code: the alphabetic run of the serial.
    let product = serial.as_ref().and_then(|s| {
        match catalog.lookup_by_alpha_prefix(s) {
            Ok(product) => Some(product.code().clone()),
            Err(_) => {
                problems.push(format!("product {} not found", s.alpha_prefix()));
                None
            }
        }
    });

    // Buyer name: the first two tokens after the serial.
    let (first, last) = (tokens[1], tokens[2]);
    if !first.chars().all(char::is_alphabetic) || !last.chars().all(char::is_alphabetic) {
        problems.push("cust name not understood".to_string());
    }
    if first.len() < 2 || last.len() < 2 {
        problems.push("cust name too short".to_string());
    }

    // Phone.
    let phone = tokens[3];
    if !phone.bytes().all(|b| b.is_ascii_digit()) {
        problems.push("phone # can only be digits".to_string());
    }
    if phone.len() < 10 {
        problems.push("phone # is missing digits".to_string());
    }

    // Price.
    let price = match PurchasePrice::parse(tokens[4]) {
        Ok(price) => Some(price),
        Err(DomainError::Validation(mut msgs)) => {
            problems.append(&mut msgs);
            None
        }
        Err(_) => {
            problems.push("price not understood".to_string());
            None
        }
    };

    // Region code is stored as received; no validation here.
    let region = Region::new(tokens[5]);

    // Everything left is the free-text description.
    let description = tokens[6..]
        .iter()
        .map(|t| capitalize(t))
        .collect::<Vec<_>>()
        .join(" ");

    if !problems.is_empty() {
        return Err(DomainError::validation(problems));
    }

    // All three are present when no problems were collected.
    let (serial, product, price) = match (serial, product, price) {
        (Some(s), Some(c), Some(p)) => (s, c, p),
        _ => return Err(DomainError::internal("sale fields missing in valid parse")),
    };

    Ok(SaleRequest {
        serial,
        product,
        purchase_date: now,
        buyer: Buyer {
            first_name: capitalize(first),
            last_name: capitalize(last),
            primary_phone: phone.to_string(),
            secondary_phone: None,
        },
        price,
        region,
        description,
        seller: seller.clone(),
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
