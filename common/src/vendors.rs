use pnet::util::MacAddr;

/// Resolves device manufacturers from MAC addresses.
pub trait VendorRepository: Send + Sync {
    /// Returns the vendor name for `mac_addr`, or `None` when the OUI is unknown.
    fn get_vendor(&self, mac_addr: MacAddr) -> Option<String>;
}
