//! Persistent runtime state

mod last_device;

pub use last_device::FileLastDeviceStore;
