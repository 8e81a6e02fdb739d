use mockall::mock;
use pipesim_core::trace::{CycleRecord, TraceSink};

mock! {
    pub Sink {}
    impl TraceSink for Sink {
        fn emit(&mut self, record: &CycleRecord);
    }
}
