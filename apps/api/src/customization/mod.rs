// Customization & validation: single-video substitutions, whole-path coverage
// checks, difficulty recalculation and progress tracking. All plan writes go
// through `service`, which owns the version-checked retry loop.

pub mod difficulty;
pub mod handlers;
pub mod path_validation;
pub mod progress;
pub mod service;
pub mod substitution;
