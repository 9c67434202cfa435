//! Pipeline tests against in-memory collaborators.

mod connect_tests;
mod disconnect_tests;
