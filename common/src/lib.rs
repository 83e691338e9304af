//! Shared models, errors and configuration for the airmap workspace.
//!
//! * **[`network`]**: discovered networks, devices and scan targets.
//! * **[`error`]**: error taxonomy shared by the backend client and the session layer.
//! * **[`config`]**: runtime settings built by the command line.
//! * **[`vendors`]**: the vendor lookup port.

pub mod config;
pub mod error;
pub mod network;
pub mod vendors;

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "airmap::success", $($arg)*)
    };
}
