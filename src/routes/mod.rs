pub mod certificates;
pub mod download;

pub use certificates::{generate_certificate, health};
pub use download::download_file;
