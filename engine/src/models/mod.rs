// Engine-internal data models. Wire-level request/response types live in
// `shared::models`.
pub mod frame;

pub use frame::{Frame, FrameRecord};
