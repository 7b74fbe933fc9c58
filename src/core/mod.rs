pub mod extract;
pub mod http;
pub mod output;
pub mod search;
