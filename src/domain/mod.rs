// Domain layer - Core workflow types and rules

pub mod errors;
pub mod model;
pub mod rules;
