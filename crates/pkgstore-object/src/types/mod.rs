//! Request and response types shared by every client.

mod get_response;
mod list_page;
mod put_response;

pub use get_response::{ByteStream, GetResponse};
pub use list_page::{ListEntry, ListPage, ListParams};
pub use put_response::{PutHeaders, PutResponse};
