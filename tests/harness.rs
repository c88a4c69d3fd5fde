use std::io::{self, Write};

use gemmbench::harness::Stage;
use gemmbench::{BenchConfig, BenchError, Harness, TileDim, Verdict};

fn small(size: usize) -> BenchConfig {
    BenchConfig {
        size,
        tile: TileDim::square(16),
        seed: 17,
        threads: Some(2),
    }
}

#[test]
fn run_walks_every_stage_in_order() {
    let mut harness = Harness::new(small(40)).unwrap();
    let mut out = Vec::new();
    let report = harness.run(&mut out).unwrap();

    assert_eq!(report.verdict(), Verdict::Pass);
    assert_eq!(harness.stage(), Stage::Teardown);
    assert_eq!(
        harness.trail(),
        &[
            Stage::Init,
            Stage::Generate,
            Stage::Upload,
            Stage::ReferenceCompute,
            Stage::ReferenceTimed,
            Stage::NaiveCompute,
            Stage::NaiveTimed,
            Stage::Verify,
            Stage::Report,
            Stage::Teardown,
        ]
    );
}

#[test]
fn stdout_report_has_fixed_lines() {
    let mut out = Vec::new();
    let report = Harness::new(small(33)).unwrap().run(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 8, "{text}");
    assert_eq!(lines[0], "Matrix size is 33");
    assert_eq!(lines[1], "Total memory required is 0.026136 MB");
    assert!(lines[2].starts_with("Total time GPU CUBLAS is ") && lines[2].ends_with(" sec"));
    assert!(lines[3].starts_with("Performance is ") && lines[3].ends_with(" GFlop/s"));
    assert!(lines[4].starts_with("Total time GPU NAIVE is ") && lines[4].ends_with(" sec"));
    assert!(lines[5].starts_with("Performance is ") && lines[5].ends_with(" GFlop/s"));
    assert!(lines[6].starts_with("error is "));
    assert_eq!(lines[7], "PASS");

    // the streamed lines and the returned report agree
    assert_eq!(report.to_string(), text.trim_end());
}

#[test]
fn same_seed_same_residual() {
    let first = Harness::new(small(50)).unwrap().run(&mut io::sink()).unwrap();
    let second = Harness::new(small(50)).unwrap().run(&mut io::sink()).unwrap();
    assert_eq!(first.residual(), second.residual());
    assert!(first.residual() < 1e-20);
}

#[test]
fn ragged_sizes_pass() {
    for size in [1, 2, 17, 100] {
        let report = Harness::new(small(size)).unwrap().run(&mut io::sink()).unwrap();
        assert_eq!(report.verdict(), Verdict::Pass, "size {size}");
    }
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let err = Harness::new(small(0)).err().unwrap();
    assert!(matches!(err, BenchError::InvalidSize(0)));

    let mut config = small(8);
    config.tile = TileDim { rows: 0, cols: 4 };
    assert!(matches!(Harness::new(config), Err(BenchError::InvalidTile { .. })));
}

#[test]
fn allocation_failure_aborts_with_911() {
    let mut harness = Harness::new(small(usize::MAX / 2)).unwrap();
    let err = harness.run(&mut io::sink()).unwrap_err();

    assert!(matches!(err, BenchError::Allocation { .. }));
    assert_eq!(err.exit_code(), 911);
    assert_eq!(harness.stage(), Stage::Failed);
    assert_eq!(harness.trail(), &[Stage::Init, Stage::Generate, Stage::Failed]);
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn output_failure_skips_remaining_stages() {
    let mut harness = Harness::new(small(8)).unwrap();
    let err = harness.run(&mut BrokenPipe).unwrap_err();

    assert!(matches!(err, BenchError::Io(_)));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(harness.trail(), &[Stage::Init, Stage::Failed]);
}

#[test]
fn harness_can_run_twice() {
    let mut harness = Harness::new(small(12)).unwrap();
    harness.run(&mut io::sink()).unwrap();
    harness.run(&mut io::sink()).unwrap();
    assert_eq!(harness.trail().len(), 10);
}
