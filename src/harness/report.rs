//! The stdout report. Line order and wording are fixed so runs can be
//! compared by script.

use std::fmt;

use super::timer::Timing;
use super::verify::Verdict;

pub const REFERENCE_LABEL: &str = "GPU CUBLAS";
pub const NAIVE_LABEL: &str = "GPU NAIVE";

/// `Matrix size is ...` and `Total memory required is ...`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Header {
    pub n: usize,
    pub memory_mb: f64,
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Matrix size is {}", self.n)?;
        write!(f, "Total memory required is {:.6} MB", self.memory_mb)
    }
}

/// Time and throughput of one phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseLine<'a> {
    pub label: &'a str,
    pub timing: Timing,
}

impl fmt::Display for PhaseLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total time {} is {:.6} sec", self.label, self.timing.seconds())?;
        write!(f, "Performance is {:.6} GFlop/s", self.timing.gflops())
    }
}

/// Residual and verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub residual: f64,
    pub verdict: Verdict,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error is {:.6}", self.residual)?;
        write!(f, "{}", self.verdict)
    }
}

/// Everything one completed run measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub header: Header,
    pub reference: Timing,
    pub naive: Timing,
    pub outcome: Outcome,
}

impl Report {
    pub fn verdict(&self) -> Verdict {
        self.outcome.verdict
    }

    pub fn residual(&self) -> f64 {
        self.outcome.residual
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        writeln!(
            f,
            "{}",
            PhaseLine {
                label: REFERENCE_LABEL,
                timing: self.reference,
            }
        )?;
        writeln!(
            f,
            "{}",
            PhaseLine {
                label: NAIVE_LABEL,
                timing: self.naive,
            }
        )?;
        write!(f, "{}", self.outcome)
    }
}
