pub mod upload;

pub use upload::UploadProcessor;
