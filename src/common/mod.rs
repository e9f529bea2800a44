mod interval;
pub mod units;

pub use interval::interval;
