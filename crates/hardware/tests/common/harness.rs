use pipesim_core::common::SimError;
use pipesim_core::config::{BranchPredictorKind, Config, Preset};
use pipesim_core::sim::{Program, ReferenceInterpreter, Simulator, assemble};
use pipesim_core::trace::{CycleRecord, NullSink};
use pipesim_core::FinalState;

/// Installs a test-friendly tracing subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Holds a configuration and runs programs under it.
pub struct TestContext {
    pub config: Config,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Default configuration: hazard control on, no predictor.
    pub fn new() -> Self {
        init_tracing();
        Self {
            config: Config::default(),
        }
    }

    pub fn preset(preset: Preset) -> Self {
        init_tracing();
        Self {
            config: Config::preset(preset),
        }
    }

    pub fn with_predictor(mut self, kind: BranchPredictorKind) -> Self {
        self.config.pipeline.branch_predictor = kind;
        self
    }

    pub fn with_hazard_control(mut self, enabled: bool) -> Self {
        self.config.pipeline.hazard_control = enabled;
        self
    }

    pub fn with_max_cycles(mut self, cycles: u64) -> Self {
        self.config.general.max_cycles = Some(cycles);
        self
    }

    pub fn with_config(mut self, edit: impl FnOnce(&mut Config)) -> Self {
        edit(&mut self.config);
        self
    }

    /// Assembles `source` and builds a simulator for it.
    pub fn simulator(&self, source: &str) -> Simulator {
        let program = assemble(source).expect("test program should assemble");
        self.simulator_for(&program)
    }

    pub fn simulator_for(&self, program: &Program) -> Simulator {
        Simulator::new(program, &self.config).expect("simulator should build")
    }

    /// Runs `source` and returns the error, if any.
    pub fn try_run(&self, source: &str) -> Result<FinalState, SimError> {
        let program = assemble(source)?;
        Simulator::new(&program, &self.config)?.run(&mut NullSink)
    }

    /// Runs `source` to completion, panicking on any simulation error.
    pub fn run(&self, source: &str) -> FinalState {
        self.try_run(source)
            .unwrap_or_else(|e| panic!("simulation failed: {e}"))
    }

    /// Runs `source`, returning the final state and every cycle record.
    pub fn run_traced(&self, source: &str) -> (FinalState, Vec<CycleRecord>) {
        let mut records = Vec::new();
        let state = self
            .simulator(source)
            .run(&mut records)
            .unwrap_or_else(|e| panic!("simulation failed: {e}"));
        (state, records)
    }

    /// Runs `program` through the sequential reference interpreter.
    pub fn reference(&self, program: &Program) -> ReferenceInterpreter {
        let mut interp =
            ReferenceInterpreter::new(program, &self.config).expect("reference should build");
        interp
            .run(100_000)
            .unwrap_or_else(|e| panic!("reference run failed: {e}"));
        interp
    }
}

/// Register `idx` of a final state.
pub fn reg(state: &FinalState, idx: usize) -> i32 {
    state.registers[idx]
}
