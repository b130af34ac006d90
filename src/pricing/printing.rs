use bigdecimal::{BigDecimal, One, Zero};
use thiserror::Error;

use crate::money::{self, cents};
use crate::records::PrintOptions;

pub const MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

pub const ACCEPTED_TYPES: [&str; 8] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "image/jpeg",
    "image/jpg",
    "image/png",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FileRejection {
    #[error("file type not supported")]
    UnsupportedType,
    #[error("file too large (max 50MB)")]
    TooLarge,
}

pub fn accept_file(mime_type: &str, size_bytes: u64) -> Result<(), FileRejection> {
    if !ACCEPTED_TYPES.contains(&mime_type) {
        return Err(FileRejection::UnsupportedType);
    }
    if size_bytes > MAX_FILE_BYTES {
        return Err(FileRejection::TooLarge);
    }
    Ok(())
}

/// Guesses a page count from the upload size. Images are one page,
/// presentations are denser than documents.
pub fn estimate_pages(size_bytes: u64, mime_type: &str) -> u32 {
    if mime_type.contains("image") {
        return 1;
    }
    let megabytes = size_bytes as f64 / (1024.0 * 1024.0);
    let per_megabyte = if mime_type.contains("presentation") {
        5.0
    } else {
        2.0
    };
    ((megabytes * per_megabyte).round() as u32).max(1)
}

pub fn base_price(print_type: &str, paper_size: &str) -> Option<BigDecimal> {
    let price = match (print_type, paper_size) {
        ("bw", "a4") => cents(10),
        ("bw", "a3") => cents(20),
        ("color", "a4") => cents(50),
        ("color", "a3") => cents(100),
        _ => return None,
    };
    Some(price)
}

pub fn binding_price(binding: &str) -> BigDecimal {
    match binding {
        "stapled" => BigDecimal::from(1),
        "spiral" => BigDecimal::from(5),
        "hardcover" => BigDecimal::from(15),
        _ => BigDecimal::zero(),
    }
}

pub fn urgency_multiplier(urgency: &str) -> BigDecimal {
    match urgency {
        "express" => cents(150),
        "urgent" => BigDecimal::from(2),
        _ => BigDecimal::one(),
    }
}

fn sides_factor(print_sides: &str) -> BigDecimal {
    match print_sides {
        "double" => cents(80),
        _ => BigDecimal::one(),
    }
}

/// Pages of one set times copies. Zero copies count as one.
pub fn total_pages(pages_per_set: u32, copies: u32) -> u32 {
    pages_per_set.saturating_mul(copies.max(1))
}

/// `((pages × copies × base) × sides + binding) × urgency`. The binding
/// surcharge is paid once per order and is subject to the urgency multiplier.
pub fn printing_cost(pages_per_set: u32, options: &PrintOptions) -> BigDecimal {
    let base = match base_price(&options.print_type, &options.paper_size) {
        Some(base) => base,
        None => return BigDecimal::zero(),
    };
    let pages = BigDecimal::from(total_pages(pages_per_set, options.copies));
    let printing = pages * base * sides_factor(&options.print_sides);
    let cost = (printing + binding_price(&options.binding)) * urgency_multiplier(&options.urgency);
    money::round(&cost)
}
