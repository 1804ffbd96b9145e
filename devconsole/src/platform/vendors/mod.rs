//! Dialect drivers, one per [`Platform`](super::Platform) variant.

pub mod cisco_ios;
pub mod linux;
