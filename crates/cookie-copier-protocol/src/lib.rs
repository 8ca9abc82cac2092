//! Messaging protocol between panel instances and the privileged agent.
//!
//! Panels send `getCookieValue` requests; the agent's `RequestRouter`
//! answers each recognized request exactly once and ignores everything
//! else. Every request carries its own id and reply slot, so concurrent
//! calls never share a response.

pub mod client;
pub mod messages;
pub mod router;
pub mod transport;

pub use client::PanelClient;
pub use messages::{Envelope, Request, RequestId, Response, GET_COOKIE_VALUE};
pub use router::{Dispatch, RequestRouter};
pub use transport::{connect_local, ChannelTransport, Transport};
