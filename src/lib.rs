//! Presentation layer of the dtf test-result dashboard.
//!
//! Pure renderers ([`duration`], [`render`], [`badge`]) turn backend values
//! into [`html::Node`] trees; the [`form`] and [`results`] controllers hold
//! page state as explicit view-models and talk to the backend through the
//! [`client::Backend`] trait.
pub mod api;
pub mod badge;
pub mod cli;
pub mod client;
pub mod config;
pub mod diagnostics;
pub mod duration;
pub mod error;
pub mod form;
pub mod html;
pub mod render;
pub mod results;
pub mod toast;
pub mod value;
