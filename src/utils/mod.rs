pub mod color;
pub mod content_disposition;
pub mod downloads;
pub mod format;
