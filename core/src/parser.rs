//! Parsing of the capture tool's CSV rows into [`NetworkRecord`]s.
//!
//! The capture tool writes comma separated rows whose width varies between
//! versions, so fields are addressed by position rather than by header name.
//! Every position used lives in [`FIELDS`]. Access point rows end with an
//! empty key column, which is why the name sits second-to-last.
//!
//! ```text
//! BSSID, First seen, Last seen, channel, Speed, Privacy, Cipher, Auth, Power, ..., ESSID, Key
//!   0        1          2          3       4       5        6      7     8            len-2  len-1
//! ```

use airmap_common::network::record::NetworkRecord;

const DELIMITER: char = ',';

/// Lines starting with one of these tokens are column headers.
const HEADER_TOKENS: &[&str] = &["Station MAC", "BSSID"];

/// Where a field sits inside a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offset {
    FromStart(usize),
    FromEnd(usize),
}

impl Offset {
    fn resolve(self, len: usize) -> Option<usize> {
        match self {
            Offset::FromStart(idx) => (idx < len).then_some(idx),
            Offset::FromEnd(back) => len.checked_sub(back).filter(|&idx| idx < len),
        }
    }
}

/// Positional contract with the capture tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    pub identity: Offset,
    pub channel: Offset,
    pub display_name: Offset,
    pub encryption: Offset,
    pub signal_level: Offset,
    /// Rows shorter than this are noise.
    pub min_fields: usize,
}

pub const FIELDS: FieldLayout = FieldLayout {
    identity: Offset::FromStart(0),
    channel: Offset::FromStart(3),
    display_name: Offset::FromEnd(2),
    encryption: Offset::FromStart(5),
    signal_level: Offset::FromStart(8),
    min_fields: 4,
};

#[derive(Debug, Clone, Copy)]
pub struct RecordParser {
    layout: FieldLayout,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self { layout: FIELDS }
    }
}

impl RecordParser {
    pub fn new(layout: FieldLayout) -> Self {
        Self { layout }
    }

    /// Parses one row. Returns `None` for headers, blank lines and rows
    /// without enough columns; never fails.
    pub fn parse(&self, raw_line: &str) -> Option<NetworkRecord> {
        let line = raw_line.trim();
        if !line.contains(DELIMITER) || is_header(line) {
            return None;
        }

        let parts: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
        if parts.len() < self.layout.min_fields {
            return None;
        }

        let field = |offset: Offset| offset.resolve(parts.len()).map(|idx| parts[idx]);

        let identity = field(self.layout.identity)?;
        let display_name = field(self.layout.display_name).unwrap_or_default();
        let channel = field(self.layout.channel).and_then(parse_channel);

        Some(NetworkRecord {
            identity: identity.to_string(),
            display_name: display_name.to_string(),
            channel,
            signal_level: field(self.layout.signal_level)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            encryption: field(self.layout.encryption)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }

    /// Parses one row and applies the validity filter.
    pub fn accept(&self, raw_line: &str) -> Option<NetworkRecord> {
        self.parse(raw_line).filter(NetworkRecord::is_valid)
    }

    /// Splits a pushed chunk into rows and keeps the valid ones, in order.
    pub fn parse_chunk(&self, chunk: &str) -> Vec<NetworkRecord> {
        chunk.lines().filter_map(|line| self.accept(line)).collect()
    }
}

fn is_header(line: &str) -> bool {
    HEADER_TOKENS.iter().any(|token| line.starts_with(token))
}

fn parse_channel(s: &str) -> Option<u16> {
    s.parse::<u16>().ok().filter(|ch| *ch > 0)
}
