pub mod appointment;
pub mod blood;
pub mod doctor;
pub mod enums;
pub mod patient;
pub mod prescription;

pub use appointment::*;
pub use blood::*;
pub use doctor::*;
pub use patient::*;
pub use prescription::*;
