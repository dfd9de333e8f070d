// 📏 Field Codec - fixed-width field encode/decode
//
// Every record is assembled from three field kinds:
// - Numeric:       ASCII digits, zero-padded left. Optional = all zeros.
// - Alphanumeric:  legacy-charset text, space-padded right. Optional = all spaces.
// - Date:          DDMMYY with a two-digit-year pivot. Optional = all spaces.
//
// Decode errors carry the absolute byte position (record base + field
// offset + byte index) so corruption is reported against the physical file,
// not against an in-memory slice.

use crate::charset::Transcoder;
use crate::error::{DtausError, Result};
use chrono::{Datelike, NaiveDate};

/// Years representable by the two-digit wire date.
/// 00..=79 decodes to 2000..=2079, 80..=99 to 1980..=1999.
pub const YEAR_MIN: i32 = 1980;
pub const YEAR_MAX: i32 = 2079;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Alphanumeric,
    Date,
}

/// One fixed-width field within a record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Byte offset within the record.
    pub offset: usize,
    /// Width in bytes.
    pub width: usize,
    pub kind: FieldKind,
    /// Optional fields encode "absent" as all-zero / all-space.
    pub optional: bool,
}

impl FieldSpec {
    fn slice<'a>(&self, record: &'a [u8]) -> &'a [u8] {
        &record[self.offset..self.offset + self.width]
    }

    fn slice_mut<'a>(&self, record: &'a mut [u8]) -> &'a mut [u8] {
        &mut record[self.offset..self.offset + self.width]
    }
}

// ============================================================================
// NUMERIC FIELDS
// ============================================================================

/// Decode a zero-padded numeric field. `base` is the absolute byte
/// position of the record start in the physical file.
pub fn decode_numeric(record: &[u8], spec: &FieldSpec, base: u64) -> Result<Option<u64>> {
    let raw = spec.slice(record);

    let mut value: u64 = 0;
    for (i, &b) in raw.iter().enumerate() {
        if !b.is_ascii_digit() {
            return Err(DtausError::Corrupt {
                position: base + spec.offset as u64 + i as u64,
                reason: format!("non-digit byte 0x{:02X} in numeric field", b),
            });
        }
        value = value * 10 + u64::from(b - b'0');
    }

    if value == 0 && spec.optional {
        return Ok(None);
    }
    Ok(Some(value))
}

/// Encode a numeric field, zero-padded. `None` (or a required field the
/// validation layer guarantees present) writes all zeros.
pub fn encode_numeric(
    record: &mut [u8],
    spec: &FieldSpec,
    field: &'static str,
    value: Option<u64>,
) -> Result<()> {
    let out = spec.slice_mut(record);

    let value = value.unwrap_or(0);
    let digits = value.to_string();
    if digits.len() > spec.width {
        return Err(DtausError::FieldOverflow {
            field,
            value: digits,
            width: spec.width,
        });
    }

    out.fill(b'0');
    out[spec.width - digits.len()..].copy_from_slice(digits.as_bytes());
    Ok(())
}

// ============================================================================
// ALPHANUMERIC FIELDS
// ============================================================================

/// Decode a space-padded text field through the legacy transcoder.
/// Trailing spaces are trimmed; an all-space optional field is absent.
pub fn decode_alnum(
    record: &[u8],
    spec: &FieldSpec,
    base: u64,
    transcoder: &dyn Transcoder,
) -> Result<Option<String>> {
    let raw = spec.slice(record);

    let text = transcoder.decode(raw).map_err(|e| DtausError::Corrupt {
        position: base + spec.offset as u64 + e.index as u64,
        reason: format!("byte 0x{:02X} outside the legacy repertoire", e.byte),
    })?;

    let trimmed = text.trim_end_matches(' ');
    if trimmed.is_empty() {
        if spec.optional {
            return Ok(None);
        }
        // Required text field holding only padding decodes as empty;
        // structural completeness is the validation pipeline's call.
        return Ok(Some(String::new()));
    }
    Ok(Some(trimmed.to_string()))
}

/// Encode a text field, space-padded right. Unmappable characters fail,
/// overlong text fails - nothing is truncated or substituted.
pub fn encode_alnum(
    record: &mut [u8],
    spec: &FieldSpec,
    field: &'static str,
    text: Option<&str>,
    transcoder: &dyn Transcoder,
) -> Result<()> {
    let out = spec.slice_mut(record);
    out.fill(b' ');

    let text = match text {
        Some(t) => t,
        None => return Ok(()),
    };

    let bytes = transcoder
        .encode(text)
        .map_err(|e| DtausError::Unmappable {
            character: e.character,
        })?;

    if bytes.len() > spec.width {
        return Err(DtausError::FieldOverflow {
            field,
            value: text.to_string(),
            width: spec.width,
        });
    }

    out[..bytes.len()].copy_from_slice(&bytes);
    Ok(())
}

// ============================================================================
// DATE FIELDS (DDMMYY)
// ============================================================================

/// Decode a 6-digit DDMMYY date. An all-space optional field is absent.
pub fn decode_date(record: &[u8], spec: &FieldSpec, base: u64) -> Result<Option<NaiveDate>> {
    let raw = spec.slice(record);
    let position = base + spec.offset as u64;

    if raw.iter().all(|&b| b == b' ') {
        if spec.optional {
            return Ok(None);
        }
        return Err(DtausError::Corrupt {
            position,
            reason: "required date field is blank".to_string(),
        });
    }

    for (i, &b) in raw.iter().enumerate() {
        if !b.is_ascii_digit() {
            return Err(DtausError::Corrupt {
                position: position + i as u64,
                reason: format!("non-digit byte 0x{:02X} in date field", b),
            });
        }
    }

    let two = |i: usize| u32::from(raw[i] - b'0') * 10 + u32::from(raw[i + 1] - b'0');
    let day = two(0);
    let month = two(2);
    let yy = two(4) as i32;

    // Two-digit-year pivot: 00..=79 -> 2000s, 80..=99 -> 1900s
    let year = if yy <= 79 { 2000 + yy } else { 1900 + yy };

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| DtausError::Corrupt {
        position,
        reason: format!("invalid calendar date {:02}.{:02}.{:02}", day, month, yy),
    }).map(Some)
}

/// Encode a DDMMYY date, or all spaces for an absent optional date.
pub fn encode_date(
    record: &mut [u8],
    spec: &FieldSpec,
    field: &'static str,
    date: Option<NaiveDate>,
) -> Result<()> {
    let out = spec.slice_mut(record);

    let date = match date {
        Some(d) => d,
        None => {
            out.fill(b' ');
            return Ok(());
        }
    };

    let year = date.year();
    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        return Err(DtausError::FieldOverflow {
            field,
            value: date.to_string(),
            width: spec.width,
        });
    }

    let text = format!("{:02}{:02}{:02}", date.day(), date.month(), year % 100);
    out.copy_from_slice(text.as_bytes());
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
