//! The benchmark run: generate, multiply twice, compare, report.
//!
//! A run walks [`Stage`]s strictly in order. Any error jumps straight to
//! [`Stage::Failed`]; the device and every buffer are released as the run's
//! scope unwinds.

pub mod report;
pub mod timer;
pub mod verify;

use std::io::Write;

use log::{debug, error};

use crate::blocked::dgemm;
use crate::config::{BenchConfig, RESIDUAL_THRESHOLD};
use crate::dispatch::Device;
use crate::error::Result;
use crate::matrix::Matrix;
use crate::matrix::generate::MatrixGenerator;
use crate::naive::naive_gemm;
use report::{Header, NAIVE_LABEL, Outcome, PhaseLine, REFERENCE_LABEL, Report};
use timer::time_phase;
use verify::{classify, residual};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    Generate,
    Upload,
    ReferenceCompute,
    ReferenceTimed,
    NaiveCompute,
    NaiveTimed,
    Verify,
    Report,
    Teardown,
    Failed,
}

impl Stage {
    /// The only stage allowed to follow this one on the success path.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Init => Some(Stage::Generate),
            Stage::Generate => Some(Stage::Upload),
            Stage::Upload => Some(Stage::ReferenceCompute),
            Stage::ReferenceCompute => Some(Stage::ReferenceTimed),
            Stage::ReferenceTimed => Some(Stage::NaiveCompute),
            Stage::NaiveCompute => Some(Stage::NaiveTimed),
            Stage::NaiveTimed => Some(Stage::Verify),
            Stage::Verify => Some(Stage::Report),
            Stage::Report => Some(Stage::Teardown),
            Stage::Teardown | Stage::Failed => None,
        }
    }
}

pub struct Harness {
    config: BenchConfig,
    stage: Stage,
    trail: Vec<Stage>,
}

impl Harness {
    pub fn new(config: BenchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            stage: Stage::Init,
            trail: vec![Stage::Init],
        })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Every stage entered so far, in order.
    pub fn trail(&self) -> &[Stage] {
        &self.trail
    }

    /// Run the whole benchmark once, writing report lines to `out` as each
    /// phase completes. A FAIL verdict is a normal result, not an error.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<Report> {
        if self.stage != Stage::Init {
            debug!("harness reused, restarting from Init");
            self.stage = Stage::Init;
            self.trail = vec![Stage::Init];
        }
        self.run_stages(out).inspect_err(|e| {
            error!("benchmark aborted during {:?}: {e}", self.stage);
            self.stage = Stage::Failed;
            self.trail.push(Stage::Failed);
        })
    }

    fn run_stages<W: Write>(&mut self, out: &mut W) -> Result<Report> {
        let n = self.config.size;
        let tile = self.config.tile;

        let device = Device::new(self.config.threads)?;
        let header = Header {
            n,
            memory_mb: self.config.memory_mb(),
        };
        writeln!(out, "{header}")?;

        self.advance(Stage::Generate);
        let mut generator = MatrixGenerator::new(self.config.seed);
        let a = generator.generate(n)?;
        let b = generator.generate(n)?;

        self.advance(Stage::Upload);
        let d_a = device.upload(&a)?;
        let d_b = device.upload(&b)?;
        let mut d_c = Matrix::zeros(n)?;

        self.advance(Stage::ReferenceCompute);
        let ((), reference) = time_phase(&device, REFERENCE_LABEL, n, || {
            dgemm(&device, 1.0, &d_a, &d_b, 0.0, &mut d_c)
        })?;

        self.advance(Stage::ReferenceTimed);
        let mut c_ref = Matrix::zeros(n)?;
        device.download(&d_c, &mut c_ref)?;
        writeln!(
            out,
            "{}",
            PhaseLine {
                label: REFERENCE_LABEL,
                timing: reference,
            }
        )?;

        self.advance(Stage::NaiveCompute);
        // Poison the shared output so a cell the naive kernel misses shows
        // up as a NaN residual instead of a stale reference value.
        d_c.fill(f64::NAN);
        let ((), naive) = time_phase(&device, NAIVE_LABEL, n, || {
            naive_gemm(&device, &d_a, &d_b, &mut d_c, tile)
        })?;

        self.advance(Stage::NaiveTimed);
        let mut c_naive = Matrix::zeros(n)?;
        device.download(&d_c, &mut c_naive)?;
        writeln!(
            out,
            "{}",
            PhaseLine {
                label: NAIVE_LABEL,
                timing: naive,
            }
        )?;

        self.advance(Stage::Verify);
        let residual = residual(&c_ref, &c_naive)?;
        let outcome = Outcome {
            residual,
            verdict: classify(residual, RESIDUAL_THRESHOLD),
        };

        self.advance(Stage::Report);
        writeln!(out, "{outcome}")?;
        out.flush()?;

        self.advance(Stage::Teardown);
        drop(device);

        Ok(Report {
            header,
            reference,
            naive,
            outcome,
        })
    }

    fn advance(&mut self, next: Stage) {
        debug_assert_eq!(self.stage.next(), Some(next), "illegal transition");
        debug!("{:?} -> {next:?}", self.stage);
        self.stage = next;
        self.trail.push(next);
    }
}
