//! Check-in request payloads and their validation.
//!
//! The DTOs mirror the wire shape the HTTP collaborator hands over; the
//! validator is the trust boundary that turns a raw payload into the typed
//! [`ValidatedCheckIn`] the scorer consumes. Nothing downstream of the
//! validator re-checks ranges.

mod dto;
mod validator;

pub use dto::{CheckInRequest, LocationDto, MotionDto, WifiDto};
pub use validator::{
    FieldViolation, RequestValidator, ValidatedCheckIn, ValidationConfig, ValidationError,
};
