//! # Discovery Models
//!
//! * [`record::NetworkRecord`]: one wireless network seen by the capture tool.
//! * [`device::DeviceRecord`]: one station observed inside a network.
//! * [`target::ScanTarget`]: the `(bssid, channel)` pair a device scan probes.
//! * [`session`]: stream kinds, session states and generation ids.

pub mod device;
pub mod mac;
pub mod record;
pub mod session;
pub mod target;
