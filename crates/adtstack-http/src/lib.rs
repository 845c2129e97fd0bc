//! Blocking HTTP [`Transport`](adtstack_core::Transport) for adtstack.
//!
//! [`AdtConnection`] talks to the ADT REST interface of one system with
//! basic authentication, a cookie-backed session, and CSRF token handling.

mod connection;

pub use connection::AdtConnection;
