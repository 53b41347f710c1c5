//! Unit tests for configuration loading and precedence.
//!
//! Tests are organised into modules by functional area:
//! - `helpers`: Shared test utilities
//! - `precedence`: Layer precedence tests
//! - `overrides`: Page value override tests
//! - `validation`: Configuration consistency validation tests

mod helpers;
