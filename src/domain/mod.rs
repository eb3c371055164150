// Domain layer - Core types for a compression job

pub mod model;
