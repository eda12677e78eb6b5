pub mod constants;
pub mod observation;
pub mod settings;
