mod hop;
pub use hop::{HopResponse, HopResult};

mod prober;
pub use prober::HopProber;

mod session;
pub use session::{TraceOutcome, TraceSession};

mod sink;
pub use sink::{FnSink, HopSink, StreamingSink};
