use pnet::util::MacAddr;

/// Parses a colon separated hardware address as printed by the capture tool.
///
/// Surrounding whitespace is ignored, hex digits may be of either case.
pub fn parse_mac(s: &str) -> Option<MacAddr> {
    s.trim().parse::<MacAddr>().ok()
}

/// Whether `s` is a well formed hardware address.
pub fn is_mac(s: &str) -> bool {
    parse_mac(s).is_some()
}
