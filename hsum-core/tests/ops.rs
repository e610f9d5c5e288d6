use hsum_core::ops::{create_manifest, verify_manifest, verify_manifest_with};
use hsum_core::{Algorithm, EngineConfig, HashsumError, InputMode, ParseMode};
use std::fs;

#[test]
fn create_then_verify_through_manifest_file() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("a.txt"), b"alpha").unwrap();
    fs::write(td.path().join("b.txt"), b"beta").unwrap();

    let a = td.path().join("a.txt");
    let b = td.path().join("b.txt");
    let paths = [a.to_str().unwrap(), b.to_str().unwrap()];
    let cfg = EngineConfig { algorithm: Algorithm::Md5, ..EngineConfig::default() };
    let bytes = create_manifest(&paths, &cfg).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.lines().all(|l| l.contains(" *")));

    let mpath = td.path().join("sums.md5.txt");
    fs::write(&mpath, &text).unwrap();
    let report = verify_manifest(&mpath, &cfg).unwrap();
    assert!(report.is_ok(), "{report:?}");
}

#[test]
fn relative_entries_resolve_against_manifest_directory() {
    let td = tempfile::tempdir().unwrap();
    fs::create_dir(td.path().join("data")).unwrap();
    fs::write(td.path().join("data/x.bin"), b"").unwrap();
    let mpath = td.path().join("CHECKSUMS.sha256");
    fs::write(
        &mpath,
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855  data/x.bin\n",
    )
    .unwrap();

    let report = verify_manifest(&mpath, &EngineConfig::default()).unwrap();
    assert!(report.is_ok());
    assert_eq!(report.results[0].entry.mode(), InputMode::Text);
}

#[test]
fn uninferable_name_needs_explicit_algorithm() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("x"), b"abc").unwrap();
    let mpath = td.path().join("sums.sha512");
    fs::write(
        &mpath,
        "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
         2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f *x\n",
    )
    .unwrap();

    let cfg = EngineConfig::default();
    let err = verify_manifest(&mpath, &cfg).unwrap_err();
    assert!(matches!(err, HashsumError::AlgorithmInference { .. }));

    let report = verify_manifest_with(&mpath, Some(Algorithm::Sha512), &cfg, None).unwrap();
    assert!(report.is_ok());
}

#[test]
fn malformed_line_is_reported_unless_lenient() {
    let td = tempfile::tempdir().unwrap();
    fs::write(td.path().join("x"), b"").unwrap();
    let mpath = td.path().join("sums.md5");
    fs::write(&mpath, "d41d8cd98f00b204e9800998ecf8427e *x\nd41d8cd98f00b204e9800998ecf8427e\n")
        .unwrap();

    let err = verify_manifest(&mpath, &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, HashsumError::Format { line: 2, .. }), "{err}");

    let cfg = EngineConfig { parse_mode: ParseMode::Lenient, ..EngineConfig::default() };
    let report = verify_manifest(&mpath, &cfg).unwrap();
    assert_eq!(report.len(), 1);
    assert!(report.is_ok());
}
