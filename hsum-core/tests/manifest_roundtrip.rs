use hsum_core::manifest::{parse, serialize, ChecksumEntry, ChecksumManifest, InputMode};
use hsum_core::Algorithm;
use proptest::prelude::*;

fn algorithm() -> impl Strategy<Value = Algorithm> {
    prop::sample::select(Algorithm::ALL.to_vec())
}

fn mode() -> impl Strategy<Value = InputMode> {
    prop_oneof![Just(InputMode::Binary), Just(InputMode::Text)]
}

fn manifest() -> impl Strategy<Value = ChecksumManifest> {
    algorithm().prop_flat_map(|algo| {
        let hex = prop::string::string_regex(&format!("[0-9a-fA-F]{{{}}}", algo.hex_len())).unwrap();
        let path = "[^\r\n]{1,40}";
        prop::collection::vec((hex, mode(), path), 0..12).prop_map(move |rows| {
            let entries = rows
                .into_iter()
                .map(|(d, m, p)| ChecksumEntry::new(d, m, p).unwrap())
                .collect();
            ChecksumManifest::from_entries(algo, entries).unwrap()
        })
    })
}

proptest! {
    #[test]
    fn parse_inverts_serialize(m in manifest()) {
        let text = serialize(&m);
        let back = parse(&text, m.algorithm()).unwrap();
        prop_assert_eq!(back, m);
    }
}

#[test]
fn serialized_lines_follow_the_conventional_layout() {
    let d = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    let m = ChecksumManifest::from_entries(
        Algorithm::Sha256,
        vec![
            ChecksumEntry::new(d, InputMode::Binary, "a b.iso").unwrap(),
            ChecksumEntry::new(d, InputMode::Text, "notes.txt").unwrap(),
        ],
    )
    .unwrap();
    let text = serialize(&m);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec![format!("{d} *a b.iso"), format!("{d}  notes.txt")]);
}
