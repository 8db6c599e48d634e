mod driver;
mod state;

pub use driver::SessionDriver;
pub use state::DownloadStep;
