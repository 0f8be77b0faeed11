//! Port matching module.
//!
//! This module decides which parsed packets are of interest, and expresses
//! the same decision as a capture filter for the capture subsystem (SRP).

mod port_filter;

pub use port_filter::PortFilter;
