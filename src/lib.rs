pub mod adjustment;
pub mod comparison;
pub mod constants;
pub mod inverse;
pub mod qa;
pub mod resampler;
pub mod survey;
pub mod wellpath;
pub mod wellpath_errors;
