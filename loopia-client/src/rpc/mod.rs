//! XML-RPC plumbing: value model, wire codec and transport.

mod transport;
mod value;
pub mod xml;

pub use transport::{HttpTransport, RpcTransport};
pub use value::Value;
