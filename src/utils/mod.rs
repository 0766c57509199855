pub mod ip;

pub use ip::{ANONYMOUS_CLIENT, client_identifier};
