//! Core type definition module
//!
//! Request, response, context and capability types shared by every provider and the manager.

pub mod capabilities;
pub mod context;
pub mod requests;
pub mod responses;

pub use capabilities::*;
pub use context::RequestContext;
pub use requests::*;
pub use responses::*;
