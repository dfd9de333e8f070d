// 🔤 Legacy Charset - DTA text transcoding
//
// DTAUS text fields use an 8-bit legacy repertoire, not UTF-8.
// The container core treats the transcoder as a black box behind the
// Transcoder trait; DtaCharset is the reference implementation
// (DIN 66003: the German umlauts live where ASCII puts [ \ ] ~).

/// A character that has no representation in the legacy charset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmappableCharacter {
    pub character: char,
}

/// A byte outside the legacy repertoire, found while decoding.
/// `index` is relative to the start of the decoded slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidByte {
    pub index: usize,
    pub byte: u8,
}

/// Transcoder - the seam between the codec and the legacy charset
///
/// FieldCodec talks to this trait only; swapping in a different bank's
/// charset table means implementing this trait, nothing else changes.
pub trait Transcoder: Send + Sync {
    /// Encode text to legacy bytes. Fails on the first unmappable
    /// character - never substitutes.
    fn encode(&self, text: &str) -> Result<Vec<u8>, UnmappableCharacter>;

    /// Decode legacy bytes to text. Fails on the first byte outside
    /// the repertoire.
    fn decode(&self, bytes: &[u8]) -> Result<String, InvalidByte>;
}

// ============================================================================
// DTA CHARSET (DIN 66003)
// ============================================================================

/// Reference transcoder for the DTA repertoire:
/// space, digits, A-Z, `.,&-+*%/$` and Ä Ö Ü ß.
/// Lowercase input is upcased before mapping (ä → Ä etc.).
#[derive(Debug, Clone, Copy, Default)]
pub struct DtaCharset;

impl DtaCharset {
    pub fn new() -> Self {
        DtaCharset
    }

    /// Map one (already upcased) character to its wire byte.
    fn char_to_byte(c: char) -> Option<u8> {
        match c {
            ' ' | '.' | ',' | '&' | '-' | '+' | '*' | '%' | '/' | '$' => Some(c as u8),
            '0'..='9' | 'A'..='Z' => Some(c as u8),
            'Ä' => Some(0x5B),
            'Ö' => Some(0x5C),
            'Ü' => Some(0x5D),
            'ß' => Some(0x7E),
            _ => None,
        }
    }

    /// Map one wire byte back to its character.
    fn byte_to_char(b: u8) -> Option<char> {
        match b {
            b' ' | b'.' | b',' | b'&' | b'-' | b'+' | b'*' | b'%' | b'/' | b'$' => Some(b as char),
            b'0'..=b'9' | b'A'..=b'Z' => Some(b as char),
            0x5B => Some('Ä'),
            0x5C => Some('Ö'),
            0x5D => Some('Ü'),
            0x7E => Some('ß'),
            _ => None,
        }
    }

    /// Upcase including the German special cases the std upcase misses
    /// for this repertoire (ß stays ß - it has its own wire byte).
    fn upcase(c: char) -> char {
        match c {
            'ä' => 'Ä',
            'ö' => 'Ö',
            'ü' => 'Ü',
            'ß' => 'ß',
            _ => c.to_ascii_uppercase(),
        }
    }
}

impl Transcoder for DtaCharset {
    fn encode(&self, text: &str) -> Result<Vec<u8>, UnmappableCharacter> {
        let mut out = Vec::with_capacity(text.len());
        for c in text.chars() {
            let up = Self::upcase(c);
            match Self::char_to_byte(up) {
                Some(b) => out.push(b),
                None => return Err(UnmappableCharacter { character: c }),
            }
        }
        Ok(out)
    }

    fn decode(&self, bytes: &[u8]) -> Result<String, InvalidByte> {
        let mut out = String::with_capacity(bytes.len());
        for (index, &byte) in bytes.iter().enumerate() {
            match Self::byte_to_char(byte) {
                Some(c) => out.push(c),
                None => return Err(InvalidByte { index, byte }),
            }
        }
        Ok(out)
    }
}

// ============================================================================
// TESTS
// ============================================================================
