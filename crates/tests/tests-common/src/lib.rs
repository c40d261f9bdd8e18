//! Fixtures shared by the test suites: a small schema of users with profiles and
//! photos, questions with categories, and an in-memory database seeded with it.

pub mod database;
pub mod fixtures;
