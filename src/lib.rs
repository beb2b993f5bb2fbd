pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod logistic_regression;
pub mod pipeline;
pub mod plot;
pub mod precision_recall;
pub mod report;
pub mod split;
pub mod synthetic;
