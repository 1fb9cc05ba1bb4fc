pub mod low_pass_filter;

pub use low_pass_filter::LowPassFilter;
