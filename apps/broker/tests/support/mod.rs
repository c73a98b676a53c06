#![allow(dead_code)]

pub mod app_builder;
pub mod auth;
pub mod stubs;

pub use app_builder::{create_test_app, proxy_request, test_state};
