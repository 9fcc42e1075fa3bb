// Data models shared with the employee backend

pub mod employee;

pub use employee::{format_date_for_input, is_known_field, Employee, EmployeeInput, KNOWN_FIELD_NAMES};
