use crate::error::Error;

pub const SIZE_FIELD_LEN: usize = 10;
pub const NAME_FIELD_LEN: usize = 64;
pub const HEADER_LEN: usize = SIZE_FIELD_LEN + NAME_FIELD_LEN;
pub const CHUNK_SIZE: usize = 2048;
pub const PAD_BYTE: u8 = b':';

/// Left-justify `value` in a `width`-byte field, padding with ':'.
pub fn pad_field(field: &'static str, value: &str, width: usize) -> Result<Vec<u8>, Error> {
    let bytes = value.as_bytes();
    if bytes.len() > width {
        return Err(Error::FieldTooLong {
            field,
            value_len: bytes.len(),
            width,
        });
    }
    let mut out = Vec::with_capacity(width);
    out.extend_from_slice(bytes);
    out.resize(width, PAD_BYTE);
    Ok(out)
}

pub fn chunk_count(payload_len: u64) -> u64 {
    let chunk = CHUNK_SIZE as u64;
    (payload_len + chunk - 1) / chunk
}

/// Fixed-width transfer header: decimal payload length then file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub payload_len: u64,
    pub name: String,
}

impl FrameHeader {
    pub fn new(payload_len: u64, name: impl Into<String>) -> Self {
        Self {
            payload_len,
            name: name.into(),
        }
    }

    pub fn encode(&self) -> Result<[u8; HEADER_LEN], Error> {
        let size = pad_field("size", &self.payload_len.to_string(), SIZE_FIELD_LEN)?;
        let name = pad_field("name", &self.name, NAME_FIELD_LEN)?;
        let mut header = [0u8; HEADER_LEN];
        header[..SIZE_FIELD_LEN].copy_from_slice(&size);
        header[SIZE_FIELD_LEN..].copy_from_slice(&name);
        Ok(header)
    }

    /// Receiver-side parse of an encoded header.
    pub fn decode(header: &[u8; HEADER_LEN]) -> Result<Self, Error> {
        let size = strip_padding(&header[..SIZE_FIELD_LEN]);
        let name = strip_padding(&header[SIZE_FIELD_LEN..]);
        let payload_len = std::str::from_utf8(size)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| Error::Other(format!("invalid size field {:?}", size)))?;
        let name = String::from_utf8(name.to_vec())
            .map_err(|_| Error::Other("name field is not UTF-8".to_string()))?;
        Ok(Self { payload_len, name })
    }
}

fn strip_padding(field: &[u8]) -> &[u8] {
    let end = field
        .iter()
        .rposition(|b| *b != PAD_BYTE)
        .map(|i| i + 1)
        .unwrap_or(0);
    &field[..end]
}
