pub mod email_composer;
pub mod pin_rotation;
pub mod template_render;

pub use email_composer::{EmailComposer, RenderedEmail};
pub use pin_rotation::{AssignedPin, PinRotation};
