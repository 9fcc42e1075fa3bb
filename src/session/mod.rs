// Session module - per-dialog form state

pub mod form_session;

pub use form_session::{
    initial_values, EmployeeFormSession, EmployeeSubmission, FormMode, ModalState, OpenEdge,
};
