pub mod context;
pub mod pipeline;
pub mod report;
pub mod service;
pub mod steps;
