mod poll;
pub use poll::PollStrategy;
