pub mod template_variables;

pub use template_variables::AvailableVariables;
