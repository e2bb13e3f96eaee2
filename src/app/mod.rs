//! Application boundary: ports and outbound events.
//!
//! The LED core in [`crate::led`] never touches a peripheral or an OS
//! primitive directly. Everything it needs is expressed as a **port
//! trait** in [`ports`], and everything it reports is an [`events::LedEvent`].

pub mod events;
pub mod ports;
