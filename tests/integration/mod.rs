//! Integration tests for the configuration container

mod env_layering;
mod logging_config;
mod test_utils;
