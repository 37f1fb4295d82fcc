//! Output flags controlling how responses are rendered.

/// Request line and request headers.
pub const REQ_HEAD: u32 = 1 << 0;
/// Request body.
pub const REQ_BODY: u32 = 1 << 1;
/// Status line and response headers.
pub const RESP_HEAD: u32 = 1 << 2;
/// Response body.
pub const RESP_BODY: u32 = 1 << 3;
/// Time spent on the request.
pub const COST: u32 = 1 << 4;
/// Heads and bodies of both request and response.
pub const STD_FLAGS: u32 = REQ_HEAD | REQ_BODY | RESP_HEAD | RESP_BODY;
