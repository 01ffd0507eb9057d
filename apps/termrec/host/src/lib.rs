// termrec host library
// Window capture, frame channel, processing, GIF encoding and the session
// lifecycle that ties them together. The CLI drives everything through
// `lifecycle::Recorder`.

pub mod capture;
pub mod channel;
pub mod encoder;
pub mod error;
pub mod lifecycle;
pub mod platform;
pub mod processor;
pub mod session;
pub mod settings;
pub mod signal;

pub use error::RecordError;
