//! Tests for the minimizers

mod dispatch_tests;
