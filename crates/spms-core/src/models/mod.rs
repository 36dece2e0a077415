//! Domain models for nurse and patient records.

mod gender;
mod nurse;
mod patient;
mod user;

pub use gender::Gender;
pub use nurse::{Nurse, NurseDraft};
pub use patient::{Patient, PatientDraft};
pub use user::{Role, User};
