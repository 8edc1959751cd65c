mod common;

use common::{simple, ContainerBuilder, SectionSpec};
use proptest::prelude::*;
use tempfile::{tempdir, NamedTempFile};
use vusf::{decode, decode_with, DecodeError, DecodeOptions, VALID_SECTION_TYPES};

fn decode_bytes(bytes: &[u8]) -> Result<vusf::ContainerHeader, DecodeError> {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), bytes).unwrap();
    decode(file.path())
}

#[test]
fn test_decode_reports_every_field() {
    let builder = ContainerBuilder::new(54)
        .section(SectionSpec::new("HELLO", 60, b"hello\nworld\n"))
        .section(SectionSpec::new("ABCDEFGHIJKL", 95, b"x"));
    let header = decode_bytes(&builder.build()).unwrap();

    assert_eq!(header.version(), 54);
    assert_eq!(header.magic(), b"Vu");
    assert_eq!(header.header_size(), 4 + 1 + 2 * 21 + 2 + 2);
    let s = header.sections();
    assert_eq!(s.len(), 2);
    assert_eq!(s[0].name.to_string(), "HELLO");
    assert_eq!(s[0].section_type.value(), 60);
    assert_eq!((s[0].offset, s[0].size), (0, 12));
    assert_eq!(s[1].name.to_string(), "ABCDEFGHIJKL");
    assert_eq!((s[1].offset, s[1].size), (12, 1));
}

#[test]
fn test_bad_magic_wins_over_everything() {
    let bytes = ContainerBuilder::new(0).count(0).magic(*b"uV").build();
    assert!(matches!(decode_bytes(&bytes), Err(DecodeError::BadMagic(m)) if &m == b"uV"));

    let bytes = simple(3).magic(*b"VU").build();
    assert!(matches!(decode_bytes(&bytes), Err(DecodeError::BadMagic(_))));
}

#[test]
fn test_version_boundaries() {
    for (version, ok) in [(53, false), (54, true), (126, true), (127, false), (-54, false)] {
        let mut b = simple(2);
        b.version = version;
        match decode_bytes(&b.build()) {
            Ok(h) => {
                assert!(ok, "version {version} should fail");
                assert_eq!(h.version(), version);
            }
            Err(DecodeError::BadVersion(v)) => {
                assert!(!ok, "version {version} should pass");
                assert_eq!(v, version);
            }
            Err(e) => panic!("unexpected error for version {version}: {e}"),
        }
    }
}

#[test]
fn test_section_count_boundaries() {
    assert!(matches!(decode_bytes(&simple(1).build()), Err(DecodeError::BadSectionCount(1))));
    assert!(matches!(decode_bytes(&simple(13).build()), Err(DecodeError::BadSectionCount(13))));
    assert_eq!(decode_bytes(&simple(2).build()).unwrap().sections().len(), 2);
    assert_eq!(decode_bytes(&simple(12).build()).unwrap().sections().len(), 12);
}

#[test]
fn test_bad_section_type_aborts_decode() {
    let bytes = ContainerBuilder::new(70)
        .section(SectionSpec::new("ok", 86, b"a"))
        .section(SectionSpec::new("bad", 87, b"b"))
        .section(SectionSpec::new("later", 90, b"c"))
        .build();
    assert!(matches!(
        decode_bytes(&bytes),
        Err(DecodeError::BadSectionType { index: 1, section_type: 87 })
    ));
}

#[test]
fn test_every_valid_type_is_accepted() {
    let mut b = ContainerBuilder::new(100);
    for ty in VALID_SECTION_TYPES {
        b = b.section(SectionSpec::new("t", ty, b""));
    }
    let h = decode_bytes(&b.build()).unwrap();
    let types: Vec<u8> = h.sections().iter().map(|s| s.section_type.value()).collect();
    assert_eq!(types, VALID_SECTION_TYPES.to_vec());
}

#[test]
fn test_non_file_paths_are_invalid() {
    let dir = tempdir().unwrap();
    assert!(matches!(decode(dir.path()), Err(DecodeError::InvalidPath(_))));
    assert!(matches!(decode(dir.path().join("missing")), Err(DecodeError::InvalidPath(_))));
}

#[cfg(unix)]
#[test]
fn test_symlink_to_container_is_followed() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("real.bin");
    simple(2).write_to(&target);
    let link = dir.path().join("link.bin");
    std::os::unix::fs::symlink(&target, &link).unwrap();
    assert_eq!(decode(&link).unwrap(), decode(&target).unwrap());
}

#[test]
fn test_tiny_files_fail_with_io() {
    assert!(matches!(decode_bytes(b""), Err(DecodeError::Io(_))));
    assert!(matches!(decode_bytes(b"Vu"), Err(DecodeError::Io(_))));
}

#[test]
fn test_decode_is_idempotent() {
    let file = NamedTempFile::new().unwrap();
    simple(5).write_to(file.path());
    let first = decode(file.path()).unwrap();
    let second = decode(file.path()).unwrap();
    assert_eq!(first, second);
}

// header_size is trusted unless strict mode is requested.
#[test]
fn test_header_size_trust_is_configurable() {
    let mut bytes = simple(2).build();
    let n = bytes.len();
    let trailer = bytes.split_off(n - 4);
    bytes.extend_from_slice(&[0u8; 5]);
    let declared = u16::from_le_bytes([trailer[0], trailer[1]]) + 5;
    bytes.extend_from_slice(&declared.to_le_bytes());
    bytes.extend_from_slice(&trailer[2..]);

    let file = NamedTempFile::new().unwrap();
    std::fs::write(file.path(), &bytes).unwrap();

    assert_eq!(decode(file.path()).unwrap().header_size(), declared);

    let strict = DecodeOptions { verify_header_size: true };
    assert!(matches!(
        decode_with(file.path(), &strict),
        Err(DecodeError::InconsistentHeaderSize { .. })
    ));
}

proptest! {
    #[test]
    fn prop_decode_reconstructs_written_table(
        version in 54i32..=126,
        sections in prop::collection::vec(
            (prop::array::uniform12(any::<u8>()), prop::sample::select(VALID_SECTION_TYPES.to_vec()),
             prop::collection::vec(any::<u8>(), 0..64)),
            2..=12,
        ),
    ) {
        let mut b = ContainerBuilder::new(version);
        for (name, ty, body) in &sections {
            b = b.section(SectionSpec { name: *name, ty: *ty, body: body.clone(), size: None });
        }
        let h = decode_bytes(&b.build()).unwrap();

        prop_assert_eq!(h.version(), version);
        prop_assert_eq!(h.sections().len(), sections.len());
        let mut offset = 0u32;
        for (got, (name, ty, body)) in h.sections().iter().zip(&sections) {
            prop_assert_eq!(got.name.raw(), name);
            prop_assert_eq!(got.section_type.value(), *ty);
            prop_assert_eq!(got.offset, offset);
            prop_assert_eq!(got.size as usize, body.len());
            offset += body.len() as u32;
        }
    }
}
