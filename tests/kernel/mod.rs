//! Tests for the fit kernel

mod fitting_tests;
mod seeding_tests;
