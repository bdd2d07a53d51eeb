mod common;
mod packaging_tests;
mod pipeline_tests;
