// Render module - schema-driven control descriptors

pub mod renderer;

pub use renderer::{
    render_field, render_form, Control, FieldChange, InputMode, RenderedField, RenderedForm,
    RenderedSection, SELECT_PLACEHOLDER, TEXTAREA_ROWS,
};
