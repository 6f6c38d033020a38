//! sectionspy: scroll-spy coordination for sectioned documents.
//!
//! The [`coordinator`] keeps a navigation sidebar's active item in step with a scrolling
//! page, arbitrating between user scrolling, programmatic scrolling after a click, and
//! content that renders late after a view switch. The remaining modules host it in a
//! terminal viewer over markdown documents.
#![allow(clippy::multiple_crate_versions)]

pub mod app_state;
pub mod config;
pub mod coordinator;
pub mod document;
pub mod error;
pub mod formats;
pub mod page;
pub mod scheduler;
pub mod section;
pub mod settle;
pub mod ui;
