//! Virtual machine image build pipeline.
//!
//! [`Builder`] validates a [`vmb_model::BuildConfig`], assembles the fixed
//! step sequence ([`pipeline::steps`]) and drives it with a basic or debug
//! runner. On success the exported machine is returned as an [`Artifact`].
mod artifact;
pub use artifact::Artifact;

mod builder;
pub use builder::Builder;

mod error;
pub use error::BuildError;

pub mod pipeline;
pub mod step;
