pub mod appointment;
pub mod doctor;
pub mod patient;
pub mod role;
pub mod user;

pub use appointment::{
    slot_key, Appointment, AppointmentInput, AppointmentPatch, AppointmentStatus,
    AppointmentView, NewAppointment, StatusInput,
};
pub use doctor::{
    AvailableSlot, DayOfWeek, Doctor, DoctorInput, DoctorPatch, DoctorSummary, NewDoctor,
    SlotInput, Specialty, validate_slots,
};
pub use patient::{
    Gender, NewPatient, Patient, PatientInput, PatientPatch, PatientStatus, PatientSummary,
};
pub use role::Role;
pub use user::{Login, NewUser, User, UserInput, UserPatch, UserProfile};
