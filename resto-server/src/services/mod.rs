//! Service layer
//!
//! - [`NotificationBus`] - in-process notifications
//! - [`bootstrap`] - singleton rows and the first manager account
//! - [`ReservationService`] - table reservations
//!
//! Order, payment and stock services live in `crate::orders` and
//! `crate::stock`.

pub mod bootstrap;
pub mod notifier;
pub mod reservation;

pub use notifier::NotificationBus;
pub use reservation::ReservationService;
