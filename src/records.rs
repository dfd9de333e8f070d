// 🧱 Record Codec - fixed-width record assembly/disassembly
//
// Four record kinds on the wire:
//   'A' header, 'C' transaction, 'D' continuation (description overflow),
//   'E' checksum. 'B' and 'F' are reserved by the wire contract for
//   bank-internal records and decode as unsupported-format.
//
// Disk and tape variants share field order, widths and offsets; they
// differ only in the space padding that fills each record out to the
// block size. Field widths and positions are a stable wire contract -
// changing any of them breaks every stored file.

use crate::charset::Transcoder;
use crate::entities::{Checksum, Header, LogicalFileType, PaymentType, Transaction};
use crate::error::{DtausError, Result};
use crate::fields::{
    decode_alnum, decode_date, decode_numeric, encode_alnum, encode_date, encode_numeric,
    FieldKind, FieldSpec,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// STORAGE FORMAT
// ============================================================================

/// Physical block-size variant. Padding only - never field semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageFormat {
    Disk,
    Tape,
}

impl StorageFormat {
    pub fn block_size(&self) -> usize {
        match self {
            StorageFormat::Disk => 128,
            StorageFormat::Tape => 150,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StorageFormat::Disk => "disk",
            StorageFormat::Tape => "tape",
        }
    }
}

/// Blocks per record kind.
pub const HEADER_BLOCKS: usize = 1;
pub const TRANSACTION_BLOCKS: usize = 2;
pub const CONTINUATION_BLOCKS: usize = 1;
pub const CHECKSUM_BLOCKS: usize = 1;

/// Description lines carried inline in the 'C' record.
pub const INLINE_DESCRIPTIONS: usize = 2;
/// Description lines per 'D' continuation record.
pub const LINES_PER_CONTINUATION: usize = 4;

/// Discriminator byte offset, shared by all record kinds.
const DISCRIMINATOR_OFFSET: usize = 4;

/// Record-length field, shared by all record kinds.
const RECORD_LENGTH: FieldSpec = num(0, 4);

const fn num(offset: usize, width: usize) -> FieldSpec {
    FieldSpec {
        offset,
        width,
        kind: FieldKind::Numeric,
        optional: false,
    }
}

const fn num_opt(offset: usize, width: usize) -> FieldSpec {
    FieldSpec {
        offset,
        width,
        kind: FieldKind::Numeric,
        optional: true,
    }
}

const fn alnum(offset: usize, width: usize) -> FieldSpec {
    FieldSpec {
        offset,
        width,
        kind: FieldKind::Alphanumeric,
        optional: false,
    }
}

const fn alnum_opt(offset: usize, width: usize) -> FieldSpec {
    FieldSpec {
        offset,
        width,
        kind: FieldKind::Alphanumeric,
        optional: true,
    }
}

const fn date(offset: usize, width: usize) -> FieldSpec {
    FieldSpec {
        offset,
        width,
        kind: FieldKind::Date,
        optional: false,
    }
}

const fn date_opt(offset: usize, width: usize) -> FieldSpec {
    FieldSpec {
        offset,
        width,
        kind: FieldKind::Date,
        optional: true,
    }
}

// ============================================================================
// RECORD LAYOUTS
// ============================================================================

/// 'A' record fields (85 useful bytes).
mod header_layout {
    use super::*;

    pub const FILE_TYPE: FieldSpec = alnum(5, 2);
    pub const BANK_CODE: FieldSpec = num(7, 8);
    pub const BANK_DATA_CODE: FieldSpec = num_opt(15, 8);
    pub const CUSTOMER_NAME: FieldSpec = alnum(23, 27);
    pub const CREATE_DATE: FieldSpec = date(50, 6);
    pub const CURRENCY: FieldSpec = alnum(56, 3);
    pub const ACCOUNT_NUMBER: FieldSpec = num(59, 10);
    pub const REFERENCE_NUMBER: FieldSpec = num_opt(69, 10);
    pub const EXECUTION_DATE: FieldSpec = date_opt(79, 6);
}

/// 'C' record fields (242 useful bytes across two blocks).
mod transaction_layout {
    use super::*;

    pub const PRIMARY_BANK_CODE: FieldSpec = num_opt(5, 8);
    pub const EXECUTIVE_BANK_CODE: FieldSpec = num(13, 8);
    pub const TARGET_BANK_CODE: FieldSpec = num(21, 8);
    pub const EXECUTIVE_ACCOUNT: FieldSpec = num(29, 10);
    pub const TARGET_ACCOUNT: FieldSpec = num(39, 10);
    pub const REFERENCE_NUMBER: FieldSpec = num_opt(49, 10);
    pub const PAYMENT_KEY: FieldSpec = num(59, 2);
    pub const PAYMENT_EXT: FieldSpec = num(61, 3);
    pub const AMOUNT: FieldSpec = num(64, 11);
    pub const CURRENCY: FieldSpec = alnum(75, 3);
    pub const TARGET_NAME: FieldSpec = alnum(78, 27);
    pub const EXECUTIVE_NAME: FieldSpec = alnum(105, 27);
    pub const DESCRIPTION_COUNT: FieldSpec = num(132, 2);
    pub const DESCRIPTION_1: FieldSpec = alnum_opt(134, 27);
    pub const DESCRIPTION_2: FieldSpec = alnum_opt(161, 27);
    pub const TARGET_NAME_EXT: FieldSpec = alnum_opt(188, 27);
    pub const EXECUTIVE_NAME_EXT: FieldSpec = alnum_opt(215, 27);
}

/// 'D' record fields (127 useful bytes).
mod continuation_layout {
    use super::*;

    pub const LINKAGE: FieldSpec = num(5, 10);
    pub const SEQUENCE: FieldSpec = num(15, 2);
    pub const LINES_USED: FieldSpec = num(17, 2);
    pub const SLOTS: [FieldSpec; 4] = [
        alnum_opt(19, 27),
        alnum_opt(46, 27),
        alnum_opt(73, 27),
        alnum_opt(100, 27),
    ];
}

/// 'E' record fields (63 useful bytes).
mod checksum_layout {
    use super::*;

    pub const TRANSACTION_COUNT: FieldSpec = num(5, 7);
    pub const AMOUNT_SUM: FieldSpec = num(12, 17);
    pub const TARGET_ACCOUNT_SUM: FieldSpec = num(29, 17);
    pub const TARGET_BANK_CODE_SUM: FieldSpec = num(46, 17);
}

// ============================================================================
// DISCRIMINATORS
// ============================================================================

/// Classify the discriminator byte of the record starting at `base`.
/// Implemented kinds come back as `Ok`; reserved kinds ('B', 'F') as
/// `Unsupported`; everything else as `Corrupt`.
pub fn discriminator(record: &[u8], base: u64) -> Result<char> {
    let position = base + DISCRIMINATOR_OFFSET as u64;
    if record.len() <= DISCRIMINATOR_OFFSET {
        return Err(DtausError::Corrupt {
            position: base,
            reason: "truncated record".to_string(),
        });
    }
    match record[DISCRIMINATOR_OFFSET] {
        b @ (b'A' | b'C' | b'D' | b'E') => Ok(b as char),
        b @ (b'B' | b'F') => Err(DtausError::Unsupported {
            position,
            discriminator: b as char,
        }),
        b => Err(DtausError::Corrupt {
            position,
            reason: format!("unknown record discriminator 0x{:02X}", b),
        }),
    }
}

fn check_discriminator(record: &[u8], base: u64, expected: char) -> Result<()> {
    let found = discriminator(record, base)?;
    if found != expected {
        return Err(DtausError::Corrupt {
            position: base + DISCRIMINATOR_OFFSET as u64,
            reason: format!("expected '{}' record, found '{}'", expected, found),
        });
    }
    Ok(())
}

fn check_available(record: &[u8], base: u64, needed: usize) -> Result<()> {
    if record.len() < needed {
        return Err(DtausError::Corrupt {
            position: base,
            reason: format!(
                "truncated record: {} bytes present, {} required",
                record.len(),
                needed
            ),
        });
    }
    Ok(())
}

fn check_length_field(record: &[u8], base: u64, expected: usize) -> Result<()> {
    let stored = decode_numeric(record, &RECORD_LENGTH, base)?.unwrap_or(0);
    if stored != expected as u64 {
        return Err(DtausError::Corrupt {
            position: base,
            reason: format!("record length field says {}, layout expects {}", stored, expected),
        });
    }
    Ok(())
}

/// Fresh record buffer: all spaces, length field and discriminator set.
fn blank_record(total: usize, disc: u8, length_field: &FieldSpec) -> Result<Vec<u8>> {
    let mut record = vec![b' '; total];
    encode_numeric(&mut record, length_field, "record_length", Some(total as u64))?;
    record[DISCRIMINATOR_OFFSET] = disc;
    Ok(record)
}

// ============================================================================
// HEADER RECORD
// ============================================================================

pub fn encode_header(
    header: &Header,
    format: StorageFormat,
    transcoder: &dyn Transcoder,
) -> Result<Vec<u8>> {
    use header_layout as l;
    let total = HEADER_BLOCKS * format.block_size();
    let mut record = blank_record(total, b'A', &RECORD_LENGTH)?;

    encode_alnum(
        &mut record,
        &l::FILE_TYPE,
        "file_type",
        Some(header.file_type.code()),
        transcoder,
    )?;
    encode_numeric(&mut record, &l::BANK_CODE, "bank_code", Some(u64::from(header.bank_code)))?;
    encode_numeric(
        &mut record,
        &l::BANK_DATA_CODE,
        "bank_data_code",
        header.bank_data_code.map(u64::from),
    )?;
    encode_alnum(
        &mut record,
        &l::CUSTOMER_NAME,
        "customer_name",
        Some(header.customer_name.as_str()),
        transcoder,
    )?;
    encode_date(&mut record, &l::CREATE_DATE, "create_date", Some(header.create_date))?;
    encode_alnum(&mut record, &l::CURRENCY, "currency", Some(header.currency.as_str()), transcoder)?;
    encode_numeric(
        &mut record,
        &l::ACCOUNT_NUMBER,
        "account_number",
        Some(header.account_number),
    )?;
    encode_numeric(
        &mut record,
        &l::REFERENCE_NUMBER,
        "reference_number",
        header.reference_number,
    )?;
    encode_date(
        &mut record,
        &l::EXECUTION_DATE,
        "execution_date",
        header.execution_date,
    )?;

    Ok(record)
}

pub fn decode_header(
    record: &[u8],
    base: u64,
    format: StorageFormat,
    transcoder: &dyn Transcoder,
) -> Result<Header> {
    use header_layout as l;
    let total = HEADER_BLOCKS * format.block_size();
    check_available(record, base, total)?;
    check_discriminator(record, base, 'A')?;
    check_length_field(record, base, total)?;

    let code = decode_alnum(record, &l::FILE_TYPE, base, transcoder)?.unwrap_or_default();
    let file_type = LogicalFileType::from_code(&code).ok_or_else(|| DtausError::Corrupt {
        position: base + l::FILE_TYPE.offset as u64,
        reason: format!("unknown logical-file type code '{}'", code),
    })?;

    Ok(Header {
        account_number: decode_numeric(record, &l::ACCOUNT_NUMBER, base)?.unwrap_or(0),
        bank_code: decode_numeric(record, &l::BANK_CODE, base)?.unwrap_or(0) as u32,
        bank_data_code: decode_numeric(record, &l::BANK_DATA_CODE, base)?.map(|v| v as u32),
        currency: decode_alnum(record, &l::CURRENCY, base, transcoder)?.unwrap_or_default(),
        customer_name: decode_alnum(record, &l::CUSTOMER_NAME, base, transcoder)?
            .unwrap_or_default(),
        reference_number: decode_numeric(record, &l::REFERENCE_NUMBER, base)?,
        create_date: decode_date(record, &l::CREATE_DATE, base)?.ok_or_else(|| {
            DtausError::Corrupt {
                position: base + l::CREATE_DATE.offset as u64,
                reason: "required create date is blank".to_string(),
            }
        })?,
        execution_date: decode_date(record, &l::EXECUTION_DATE, base)?,
        file_type,
    })
}

// ============================================================================
// TRANSACTION RECORD (+ CONTINUATIONS)
// ============================================================================

/// Continuation records a transaction needs for its overflow lines.
pub fn continuation_count(tx: &Transaction) -> usize {
    let overflow = tx.descriptions.len().saturating_sub(INLINE_DESCRIPTIONS);
    overflow.div_ceil(LINES_PER_CONTINUATION)
}

/// Total encoded length of one transaction, continuations included.
pub fn encoded_transaction_len(tx: &Transaction, format: StorageFormat) -> usize {
    (TRANSACTION_BLOCKS + continuation_count(tx) * CONTINUATION_BLOCKS) * format.block_size()
}

pub fn encode_transaction(
    tx: &Transaction,
    format: StorageFormat,
    transcoder: &dyn Transcoder,
) -> Result<Vec<u8>> {
    use transaction_layout as l;
    let base_total = TRANSACTION_BLOCKS * format.block_size();
    let mut record = blank_record(base_total, b'C', &RECORD_LENGTH)?;

    encode_numeric(
        &mut record,
        &l::PRIMARY_BANK_CODE,
        "primary_bank_code",
        tx.primary_bank_code.map(u64::from),
    )?;
    encode_numeric(
        &mut record,
        &l::EXECUTIVE_BANK_CODE,
        "executive_bank_code",
        Some(u64::from(tx.executive_bank_code)),
    )?;
    encode_numeric(
        &mut record,
        &l::TARGET_BANK_CODE,
        "target_bank_code",
        Some(u64::from(tx.target_bank_code)),
    )?;
    encode_numeric(
        &mut record,
        &l::EXECUTIVE_ACCOUNT,
        "executive_account_number",
        Some(tx.executive_account_number),
    )?;
    encode_numeric(
        &mut record,
        &l::TARGET_ACCOUNT,
        "target_account_number",
        Some(tx.target_account_number),
    )?;
    encode_numeric(
        &mut record,
        &l::REFERENCE_NUMBER,
        "reference_number",
        tx.reference_number,
    )?;
    encode_numeric(
        &mut record,
        &l::PAYMENT_KEY,
        "payment_key",
        Some(u64::from(tx.payment_type.key)),
    )?;
    encode_numeric(
        &mut record,
        &l::PAYMENT_EXT,
        "payment_extension",
        Some(u64::from(tx.payment_type.extension)),
    )?;
    encode_numeric(&mut record, &l::AMOUNT, "amount", Some(tx.amount))?;
    encode_alnum(&mut record, &l::CURRENCY, "currency", Some(tx.currency.as_str()), transcoder)?;
    encode_alnum(
        &mut record,
        &l::TARGET_NAME,
        "target_name",
        Some(tx.target_name.as_str()),
        transcoder,
    )?;
    encode_alnum(
        &mut record,
        &l::EXECUTIVE_NAME,
        "executive_name",
        Some(tx.executive_name.as_str()),
        transcoder,
    )?;
    encode_numeric(
        &mut record,
        &l::DESCRIPTION_COUNT,
        "description_count",
        Some(tx.descriptions.len() as u64),
    )?;
    encode_alnum(
        &mut record,
        &l::DESCRIPTION_1,
        "description_1",
        tx.descriptions.first().map(String::as_str),
        transcoder,
    )?;
    encode_alnum(
        &mut record,
        &l::DESCRIPTION_2,
        "description_2",
        tx.descriptions.get(1).map(String::as_str),
        transcoder,
    )?;
    encode_alnum(
        &mut record,
        &l::TARGET_NAME_EXT,
        "target_name_ext",
        tx.target_name_ext.as_deref(),
        transcoder,
    )?;
    encode_alnum(
        &mut record,
        &l::EXECUTIVE_NAME_EXT,
        "executive_name_ext",
        tx.executive_name_ext.as_deref(),
        transcoder,
    )?;

    // Overflow descriptions spill into 'D' continuation records, four
    // lines apiece, each repeating the linkage marker.
    for (chunk_index, chunk) in tx
        .overflow_descriptions()
        .chunks(LINES_PER_CONTINUATION)
        .enumerate()
    {
        record.extend(encode_continuation(tx, chunk_index, chunk, format, transcoder)?);
    }

    Ok(record)
}

fn encode_continuation(
    tx: &Transaction,
    chunk_index: usize,
    lines: &[String],
    format: StorageFormat,
    transcoder: &dyn Transcoder,
) -> Result<Vec<u8>> {
    use continuation_layout as l;
    let total = CONTINUATION_BLOCKS * format.block_size();
    let mut record = blank_record(total, b'D', &RECORD_LENGTH)?;

    encode_numeric(&mut record, &l::LINKAGE, "linkage", Some(tx.target_account_number))?;
    encode_numeric(&mut record, &l::SEQUENCE, "sequence", Some(chunk_index as u64 + 1))?;
    encode_numeric(&mut record, &l::LINES_USED, "lines_used", Some(lines.len() as u64))?;

    for (slot, line) in l::SLOTS.iter().zip(lines) {
        encode_alnum(&mut record, slot, "description", Some(line.as_str()), transcoder)?;
    }

    Ok(record)
}

/// Decode a 'C' record and its continuation group. `bytes` starts at the
/// 'C' record; the returned usize is the number of bytes consumed.
pub fn decode_transaction(
    bytes: &[u8],
    base: u64,
    format: StorageFormat,
    transcoder: &dyn Transcoder,
) -> Result<(Transaction, usize)> {
    use transaction_layout as l;
    let block = format.block_size();
    let base_total = TRANSACTION_BLOCKS * block;
    check_available(bytes, base, base_total)?;
    check_discriminator(bytes, base, 'C')?;
    check_length_field(bytes, base, base_total)?;

    let record = &bytes[..base_total];

    let description_count =
        decode_numeric(record, &l::DESCRIPTION_COUNT, base)?.unwrap_or(0) as usize;

    let mut descriptions = Vec::with_capacity(description_count);
    for (i, spec) in [l::DESCRIPTION_1, l::DESCRIPTION_2].iter().enumerate() {
        if i < description_count {
            let line = decode_alnum(record, spec, base, transcoder)?.ok_or_else(|| {
                DtausError::Corrupt {
                    position: base + spec.offset as u64,
                    reason: format!(
                        "description count says {} but inline line {} is blank",
                        description_count,
                        i + 1
                    ),
                }
            })?;
            descriptions.push(line);
        }
    }

    let mut tx = Transaction {
        payment_type: PaymentType {
            key: decode_numeric(record, &l::PAYMENT_KEY, base)?.unwrap_or(0) as u8,
            extension: decode_numeric(record, &l::PAYMENT_EXT, base)?.unwrap_or(0) as u16,
        },
        amount: decode_numeric(record, &l::AMOUNT, base)?.unwrap_or(0),
        currency: decode_alnum(record, &l::CURRENCY, base, transcoder)?.unwrap_or_default(),
        reference_number: decode_numeric(record, &l::REFERENCE_NUMBER, base)?,
        descriptions,
        primary_bank_code: decode_numeric(record, &l::PRIMARY_BANK_CODE, base)?.map(|v| v as u32),
        executive_bank_code: decode_numeric(record, &l::EXECUTIVE_BANK_CODE, base)?.unwrap_or(0)
            as u32,
        executive_account_number: decode_numeric(record, &l::EXECUTIVE_ACCOUNT, base)?
            .unwrap_or(0),
        target_bank_code: decode_numeric(record, &l::TARGET_BANK_CODE, base)?.unwrap_or(0) as u32,
        target_account_number: decode_numeric(record, &l::TARGET_ACCOUNT, base)?.unwrap_or(0),
        executive_name: decode_alnum(record, &l::EXECUTIVE_NAME, base, transcoder)?
            .unwrap_or_default(),
        executive_name_ext: decode_alnum(record, &l::EXECUTIVE_NAME_EXT, base, transcoder)?,
        target_name: decode_alnum(record, &l::TARGET_NAME, base, transcoder)?.unwrap_or_default(),
        target_name_ext: decode_alnum(record, &l::TARGET_NAME_EXT, base, transcoder)?,
    };

    // Re-associate the continuation group, verifying the linkage marker
    // and sequence numbering as we go.
    let overflow = description_count.saturating_sub(INLINE_DESCRIPTIONS);
    let continuations = overflow.div_ceil(LINES_PER_CONTINUATION);
    let mut consumed = base_total;

    for seq in 0..continuations {
        let cont_base = base + consumed as u64;
        let remaining = &bytes[consumed.min(bytes.len())..];
        let expected_lines = (overflow - seq * LINES_PER_CONTINUATION).min(LINES_PER_CONTINUATION);
        let lines = decode_continuation(
            remaining,
            cont_base,
            format,
            transcoder,
            tx.target_account_number,
            seq + 1,
            expected_lines,
        )?;
        tx.descriptions.extend(lines);
        consumed += CONTINUATION_BLOCKS * block;
    }

    if tx.descriptions.len() != description_count {
        return Err(DtausError::Corrupt {
            position: base + l::DESCRIPTION_COUNT.offset as u64,
            reason: format!(
                "description count says {} but {} lines were decoded",
                description_count,
                tx.descriptions.len()
            ),
        });
    }

    Ok((tx, consumed))
}

#[allow(clippy::too_many_arguments)]
fn decode_continuation(
    bytes: &[u8],
    base: u64,
    format: StorageFormat,
    transcoder: &dyn Transcoder,
    linkage: u64,
    sequence: usize,
    expected_lines: usize,
) -> Result<Vec<String>> {
    use continuation_layout as l;
    let total = CONTINUATION_BLOCKS * format.block_size();
    check_available(bytes, base, total)?;
    check_discriminator(bytes, base, 'D')?;
    check_length_field(bytes, base, total)?;

    let record = &bytes[..total];

    let stored_linkage = decode_numeric(record, &l::LINKAGE, base)?.unwrap_or(0);
    if stored_linkage != linkage {
        return Err(DtausError::Corrupt {
            position: base + l::LINKAGE.offset as u64,
            reason: format!(
                "continuation linkage {} does not match parent transaction {}",
                stored_linkage, linkage
            ),
        });
    }

    let stored_sequence = decode_numeric(record, &l::SEQUENCE, base)?.unwrap_or(0);
    if stored_sequence != sequence as u64 {
        return Err(DtausError::Corrupt {
            position: base + l::SEQUENCE.offset as u64,
            reason: format!(
                "continuation sequence {} out of order, expected {}",
                stored_sequence, sequence
            ),
        });
    }

    let lines_used = decode_numeric(record, &l::LINES_USED, base)?.unwrap_or(0) as usize;
    if lines_used != expected_lines || lines_used > LINES_PER_CONTINUATION {
        return Err(DtausError::Corrupt {
            position: base + l::LINES_USED.offset as u64,
            reason: format!(
                "continuation carries {} lines, parent expects {}",
                lines_used, expected_lines
            ),
        });
    }

    let mut lines = Vec::with_capacity(lines_used);
    for (i, spec) in l::SLOTS.iter().take(lines_used).enumerate() {
        let line = decode_alnum(record, spec, base, transcoder)?.ok_or_else(|| {
            DtausError::Corrupt {
                position: base + spec.offset as u64,
                reason: format!("continuation slot {} is blank but counted", i + 1),
            }
        })?;
        lines.push(line);
    }
    Ok(lines)
}

// ============================================================================
// CHECKSUM RECORD
// ============================================================================

pub fn encode_checksum(checksum: &Checksum, format: StorageFormat) -> Result<Vec<u8>> {
    use checksum_layout as l;
    let total = CHECKSUM_BLOCKS * format.block_size();
    let mut record = blank_record(total, b'E', &RECORD_LENGTH)?;

    encode_numeric(
        &mut record,
        &l::TRANSACTION_COUNT,
        "transaction_count",
        Some(checksum.transaction_count as u64),
    )?;
    encode_numeric(
        &mut record,
        &l::AMOUNT_SUM,
        "amount_sum",
        Some(checksum.amount_sum as u64),
    )?;
    encode_numeric(
        &mut record,
        &l::TARGET_ACCOUNT_SUM,
        "target_account_sum",
        Some(checksum.target_account_sum as u64),
    )?;
    encode_numeric(
        &mut record,
        &l::TARGET_BANK_CODE_SUM,
        "target_bank_code_sum",
        Some(checksum.target_bank_code_sum as u64),
    )?;

    Ok(record)
}

pub fn decode_checksum(record: &[u8], base: u64, format: StorageFormat) -> Result<Checksum> {
    use checksum_layout as l;
    let total = CHECKSUM_BLOCKS * format.block_size();
    check_available(record, base, total)?;
    check_discriminator(record, base, 'E')?;
    check_length_field(record, base, total)?;

    Ok(Checksum {
        transaction_count: decode_numeric(record, &l::TRANSACTION_COUNT, base)?.unwrap_or(0)
            as i64,
        amount_sum: decode_numeric(record, &l::AMOUNT_SUM, base)?.unwrap_or(0) as i64,
        target_account_sum: decode_numeric(record, &l::TARGET_ACCOUNT_SUM, base)?.unwrap_or(0)
            as i64,
        target_bank_code_sum: decode_numeric(record, &l::TARGET_BANK_CODE_SUM, base)?
            .unwrap_or(0) as i64,
    })
}

// ============================================================================
// LOGICAL FILE ENCODING
// ============================================================================

/// Serialize one whole logical file: 'A', every 'C' (+'D') group, 'E'.
pub fn encode_logical_file(
    header: &Header,
    transactions: &[Transaction],
    checksum: &Checksum,
    format: StorageFormat,
    transcoder: &dyn Transcoder,
) -> Result<Vec<u8>> {
    let mut out = encode_header(header, format, transcoder)?;
    for tx in transactions {
        out.extend(encode_transaction(tx, format, transcoder)?);
    }
    out.extend(encode_checksum(checksum, format)?);
    Ok(out)
}

/// Encoded length of one whole logical file.
pub fn encoded_logical_file_len(transactions: &[Transaction], format: StorageFormat) -> usize {
    let block = format.block_size();
    let mut total = (HEADER_BLOCKS + CHECKSUM_BLOCKS) * block;
    for tx in transactions {
        total += encoded_transaction_len(tx, format);
    }
    total
}

// ============================================================================
// TESTS
// ============================================================================
