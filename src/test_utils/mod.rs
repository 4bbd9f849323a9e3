#![allow(missing_docs)]

pub(crate) mod http;
pub(crate) mod store;

pub(crate) use http::{get_test_server, get_test_state};
pub(crate) use store::{FailingStore, get_test_store};
