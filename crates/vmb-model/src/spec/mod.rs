mod build;
pub use build::BuildConfig;
