//! HTTP transport implementation

mod transport;

pub use transport::HttpTransport;
