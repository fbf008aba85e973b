//! Internet radio: an external decoder turns a URL into raw PCM, and a feeder
//! thread moves it in fixed-size chunks into a single-slot stream channel.
//!
//! Nothing here touches the library or the file engine.

mod channel;
mod feeder;
mod process;
mod session;

pub use channel::{RodioChannel, StreamChannel};
pub use feeder::{FeedEnd, FeedStats, FeederConfig, run_feeder};
pub use process::DecoderProcess;
pub use session::RadioSession;
