use hsum_core::create::create;
use hsum_core::verify::verify;
use hsum_core::{Algorithm, CancelToken, EngineConfig, HashsumError, InputMode, Job, VerificationOutcome};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::path::Path;

fn write_random(path: &Path, bytes: usize, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<u8> = (0..bytes).map(|_| rng.gen()).collect();
    std::fs::write(path, data).unwrap();
}

fn setup(n: usize) -> (tempfile::TempDir, Vec<String>) {
    let td = tempfile::tempdir().unwrap();
    std::fs::create_dir(td.path().join("sub")).unwrap();
    let names: Vec<String> = (0..n).map(|i| format!("sub/file {i}.bin")).collect();
    for (i, name) in names.iter().enumerate() {
        write_random(&td.path().join(name), 1000 + i * 517, i as u64);
    }
    (td, names)
}

fn job(root: &Path) -> Job {
    let cfg = EngineConfig { concurrency: 4, ..EngineConfig::default() };
    Job::new(&cfg).unwrap().with_base_dir(root)
}

#[test]
fn unmodified_files_all_match() {
    let (td, names) = setup(6);
    for algo in Algorithm::ALL {
        let job = job(td.path());
        let m = create(&names, algo, InputMode::Binary, &job).unwrap();
        let report = verify(&m, &job).unwrap();
        assert_eq!(report.len(), names.len());
        assert!(report.is_ok(), "{algo}: {report:?}");
        assert_eq!(report.algorithm, algo);
    }
}

#[test]
fn modified_file_is_the_only_mismatch() {
    let (td, names) = setup(8);
    let job = job(td.path());
    let m = create(&names, Algorithm::Sha256, InputMode::Text, &job).unwrap();

    write_random(&td.path().join(&names[3]), 1000, 999);
    let report = verify(&m, &job).unwrap();

    assert_eq!(report.len(), names.len());
    for (i, r) in report.results.iter().enumerate() {
        assert_eq!(r.entry.path(), names[i]);
        if i == 3 {
            assert!(matches!(r.outcome, VerificationOutcome::Mismatched { .. }));
        } else {
            assert_eq!(r.outcome, VerificationOutcome::Matched);
        }
    }
    assert_eq!((report.matched(), report.mismatched(), report.unreadable()), (7, 1, 0));
    assert!(!report.is_ok());
}

#[test]
fn deleted_file_is_unreadable_and_rest_still_checked() {
    let (td, names) = setup(5);
    let job = job(td.path());
    let m = create(&names, Algorithm::Blake2b, InputMode::Binary, &job).unwrap();

    std::fs::remove_file(td.path().join(&names[0])).unwrap();
    let report = verify(&m, &job).unwrap();

    assert_eq!(report.len(), 5);
    match &report.results[0].outcome {
        VerificationOutcome::Unreadable { reason } => assert!(reason.contains("file 0.bin")),
        other => panic!("expected unreadable, got {other:?}"),
    }
    assert_eq!(report.matched(), 4);
}

#[test]
fn uppercase_digests_still_match() {
    let (td, names) = setup(2);
    let job = job(td.path());
    let m = create(&names, Algorithm::Md5, InputMode::Binary, &job).unwrap();
    let upper = m.to_text().to_uppercase().replace("SUB/FILE", "sub/file").replace(".BIN", ".bin");
    let m2 = hsum_core::manifest::parse(&upper, Algorithm::Md5).unwrap();
    assert!(verify(&m2, &job).unwrap().is_ok());
}

#[test]
fn create_keeps_input_order_and_fails_fast() {
    let (td, mut names) = setup(10);
    names.reverse();
    let job = job(td.path());
    let m = create(&names, Algorithm::Sha512, InputMode::Binary, &job).unwrap();
    let got: Vec<&str> = m.entries().iter().map(|e| e.path()).collect();
    assert_eq!(got, names.iter().map(String::as_str).collect::<Vec<_>>());

    names.insert(4, "sub/missing.bin".to_string());
    let err = create(&names, Algorithm::Sha512, InputMode::Binary, &job).unwrap_err();
    match err {
        HashsumError::Io { path, .. } => assert!(path.ends_with("sub/missing.bin"), "{path:?}"),
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn cancelled_token_stops_batches() {
    let (td, names) = setup(3);
    let token = CancelToken::new();
    let job = job(td.path()).with_cancel(token.clone());
    let m = create(&names, Algorithm::Sha256, InputMode::Binary, &job).unwrap();

    token.cancel();
    assert!(matches!(verify(&m, &job), Err(HashsumError::Cancelled)));
    assert!(matches!(
        create(&names, Algorithm::Sha256, InputMode::Binary, &job),
        Err(HashsumError::Cancelled)
    ));
}

#[test]
fn report_serializes_with_status_tags() {
    let (td, names) = setup(2);
    let job = job(td.path());
    let m = create(&names, Algorithm::Md5, InputMode::Binary, &job).unwrap();
    std::fs::remove_file(td.path().join(&names[1])).unwrap();
    let report = verify(&m, &job).unwrap();

    let v = serde_json::to_value(&report).unwrap();
    assert_eq!(v["algorithm"], "md5");
    assert_eq!(v["results"][0]["outcome"]["status"], "matched");
    assert_eq!(v["results"][1]["outcome"]["status"], "unreadable");
    assert_eq!(v["results"][1]["entry"]["mode"], "binary");
}
