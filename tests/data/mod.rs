//! Tests for the data module

mod data_space_tests;
mod range_tests;
