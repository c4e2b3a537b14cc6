pub mod person;
pub mod reservation;
pub mod seat;

pub use person::{ContactKind, ContactPolicy, Person};
pub use reservation::{NewReservation, PendingSeat, ReservationRecord};
pub use seat::Seat;
