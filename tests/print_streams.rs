#![allow(non_snake_case)]

use splitqp::{algebra::*, io::ConfigurablePrintTarget, solver::*};
use std::io::{Read, Seek, SeekFrom, Write};

fn print_test_workspace(verbose: bool) -> Workspace<f64> {
    let P = CscMatrix::new(2, 2, vec![0, 1, 3], vec![0, 0, 1], vec![4., 1., 2.]);
    let A = CscMatrix::new(3, 2, vec![0, 2, 4], vec![0, 1, 0, 2], vec![1., 1., 1., 1.]);
    let settings = Settings {
        verbose,
        polish: true,
        ..Settings::default()
    };
    Workspace::setup(&P, &A, &[1., 1.], &[1., 0., 0.], &[1., 0.7, 0.7], settings).unwrap()
}

#[test]
fn test_print_to_buffer() {
    let mut workspace = print_test_workspace(true);
    workspace.print_to_buffer();
    workspace.solve().unwrap();

    let out = workspace.get_print_buffer().unwrap();
    assert!(out.contains("splitqp v"));
    assert!(out.contains("variables     = 2"));
    assert!(out.contains("linear system: direct"));
    assert!(out.contains("iter   objective"));
    assert!(out.contains("solution polishing: successful"));
    assert!(out.contains("status:               Solved"));

    // first iteration row and the footer iteration count
    assert!(out.lines().any(|line| line.starts_with("   1  ")));
    let iterations = workspace.info().unwrap().iterations;
    assert!(out.contains(&format!("number of iterations: {}", iterations)));
}

#[test]
fn test_print_silent() {
    let mut workspace = print_test_workspace(false);
    workspace.print_to_buffer();
    workspace.solve().unwrap();
    assert!(workspace.get_print_buffer().unwrap().is_empty());
}

#[test]
fn test_print_to_sink() {
    let mut workspace = print_test_workspace(true);
    workspace.print_to_sink();
    workspace.solve().unwrap();
    assert!(workspace.get_print_buffer().is_err());
}

#[test]
fn test_print_to_file() {
    let mut workspace = print_test_workspace(true);

    let mut file = tempfile::tempfile().unwrap();
    workspace.print_to_file(file.try_clone().unwrap());
    workspace.solve().unwrap();

    let mut out = String::new();
    file.seek(SeekFrom::Start(0)).unwrap();
    file.read_to_string(&mut out).unwrap();
    assert!(out.contains("status:"));
}

#[test]
fn test_print_to_stream() {
    let mut workspace = print_test_workspace(true);

    let file = tempfile::NamedTempFile::new().unwrap();
    let stream = file.reopen().unwrap();
    workspace.print_to_stream(Box::new(stream));
    workspace.solve().unwrap();
    workspace.cleanup().unwrap();

    let mut out = String::new();
    file.reopen().unwrap().read_to_string(&mut out).unwrap();
    assert!(out.contains("splitqp v"));
}

// accepts every write but cannot be flushed
struct Unflushable;

impl Write for Unflushable {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
    }
}

#[test]
fn test_print_flush_failure() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut workspace = print_test_workspace(true);
    workspace.print_to_stream(Box::new(Unflushable));

    // output errors are logged, not returned
    assert_eq!(workspace.solve().unwrap().status, SolverStatus::Solved);
    assert!(workspace.cleanup().is_ok());
    assert_eq!(workspace.state(), WorkspaceState::Cleaned);
}
