//! Integration tests for wadfs
//!
//! These tests drive whole containers end-to-end: assembling WAD bytes on
//! disk, loading them, mutating through the library, and reloading to
//! verify that the rewritten container matches the in-memory state.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use wadfs::{Wad, WadError};

/// Assemble container bytes from (name, payload) pairs. Payloads are laid
/// out after the header in lump order; zero-length lumps get the
/// declared-but-unmaterialized `offset == 0, size == 0` encoding.
fn container_bytes(lumps: &[(&str, &[u8])]) -> Vec<u8> {
    let mut payload = Vec::new();
    let mut records = Vec::new();
    for (name, data) in lumps {
        let offset = if data.is_empty() {
            0u32
        } else {
            12 + payload.len() as u32
        };
        records.push((offset, data.len() as u32, *name));
        payload.extend_from_slice(data);
    }

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"IWAD");
    bytes.extend_from_slice(&(lumps.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&(12 + payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&payload);
    for (offset, size, name) in records {
        bytes.extend_from_slice(&offset.to_le_bytes());
        bytes.extend_from_slice(&size.to_le_bytes());
        let mut field = [0u8; 8];
        field[..name.len()].copy_from_slice(name.as_bytes());
        bytes.extend_from_slice(&field);
    }
    bytes
}

fn write_container(dir: &Path, lumps: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join("test.wad");
    fs::write(&path, container_bytes(lumps)).unwrap();
    path
}

/// Decode the descriptor-table names of a container file, in table order.
fn table_names(path: &Path) -> Vec<String> {
    let bytes = fs::read(path).unwrap();
    let count = u32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
    let offset = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;

    (0..count)
        .map(|i| {
            let record = &bytes[offset + i * 16..offset + (i + 1) * 16];
            let name = &record[8..16];
            let end = name.iter().position(|&b| b == 0).unwrap_or(8);
            String::from_utf8_lossy(&name[..end]).into_owned()
        })
        .collect()
}

/// The ten lumps a conventional map carries.
const MAP_LUMPS: [&str; 10] = [
    "THINGS", "LINEDEFS", "SIDEDEFS", "VERTEXES", "SEGS", "SSECTORS", "NODES", "SECTORS",
    "REJECT", "BLOCKMAP",
];

#[test]
fn test_conventional_map_layout() {
    let dir = TempDir::new().unwrap();
    let mut lumps: Vec<(&str, &[u8])> = vec![("MAPS_START", b"")];
    lumps.push(("E1M1", b""));
    for name in MAP_LUMPS {
        lumps.push((name, b"data"));
    }
    lumps.push(("MAPS_END", b""));
    let path = write_container(dir.path(), &lumps);

    let wad = Wad::load(&path).unwrap();
    assert_eq!(wad.magic(), "IWAD");

    assert_eq!(wad.list_dir("/").unwrap(), vec!["MAPS"]);
    assert_eq!(wad.list_dir("/MAPS").unwrap(), vec!["E1M1"]);
    assert_eq!(wad.list_dir("/MAPS/E1M1").unwrap(), MAP_LUMPS);

    assert!(wad.is_directory("/MAPS/E1M1"));
    assert!(wad.is_content("/MAPS/E1M1/THINGS"));
    assert_eq!(wad.size("/MAPS/E1M1/THINGS").unwrap(), 4);

    let mut buf = [0u8; 4];
    assert_eq!(wad.read("/MAPS/E1M1/THINGS", &mut buf, 0).unwrap(), 4);
    assert_eq!(&buf, b"data");

    // Exactly ten lumps were consumed, so the closing marker survived.
    assert!(matches!(
        wad.list_dir("/MAPS/E1M1/THINGS"),
        Err(WadError::NotADirectory { .. })
    ));
}

#[test]
fn test_listing_preserves_table_order() {
    let dir = TempDir::new().unwrap();
    let path = write_container(
        dir.path(),
        &[("ZULU", b"z"), ("ALPHA", b"a"), ("MIKE", b"m")],
    );

    let wad = Wad::load(&path).unwrap();
    assert_eq!(wad.list_dir("/").unwrap(), vec!["ZULU", "ALPHA", "MIKE"]);
}

#[test]
fn test_map_directory_caps_at_ten_children() {
    let dir = TempDir::new().unwrap();
    let extra: Vec<String> = (0..12).map(|i| format!("L{:02}", i)).collect();
    let mut lumps: Vec<(&str, &[u8])> = vec![("E3M7", b"")];
    for name in &extra {
        lumps.push((name.as_str(), b"x"));
    }
    let path = write_container(dir.path(), &lumps);

    let wad = Wad::load(&path).unwrap();
    let children = wad.list_dir("/E3M7").unwrap();
    assert_eq!(children.len(), 10);
    assert_eq!(children[0], "L00");
    assert_eq!(children[9], "L09");

    // The overflow lumps land beside the map, not inside it.
    assert_eq!(wad.list_dir("/").unwrap(), vec!["E3M7", "L10", "L11"]);
}

#[test]
fn test_create_write_reload_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = write_container(dir.path(), &[]);

    let mut wad = Wad::load(&path).unwrap();
    wad.create_directory("/AA").unwrap();
    wad.create_directory("/AA/BB").unwrap();
    wad.create_file("/AA/BB/DEEP").unwrap();
    wad.create_file("/ROOTFILE").unwrap();
    assert_eq!(wad.write("/AA/BB/DEEP", b"deep payload", 0).unwrap(), 12);
    assert_eq!(wad.write("/ROOTFILE", b"top", 0).unwrap(), 3);
    drop(wad);

    // New subtrees nest inside their parent brackets.
    assert_eq!(
        table_names(&path),
        vec![
            "AA_START", "BB_START", "DEEP", "BB_END", "AA_END", "ROOTFILE"
        ]
    );

    let wad = Wad::load(&path).unwrap();
    assert_eq!(wad.list_dir("/").unwrap(), vec!["AA", "ROOTFILE"]);
    assert_eq!(wad.list_dir("/AA").unwrap(), vec!["BB"]);
    assert_eq!(wad.list_dir("/AA/BB").unwrap(), vec!["DEEP"]);

    assert_eq!(wad.size("/AA/BB/DEEP").unwrap(), 12);
    let mut buf = [0u8; 12];
    wad.read("/AA/BB/DEEP", &mut buf, 0).unwrap();
    assert_eq!(&buf, b"deep payload");

    let mut buf = [0u8; 3];
    wad.read("/ROOTFILE", &mut buf, 0).unwrap();
    assert_eq!(&buf, b"top");
}

#[test]
fn test_duplicate_create_is_a_byte_level_noop() {
    let dir = TempDir::new().unwrap();
    let path = write_container(dir.path(), &[("DATA", b"payload")]);

    let mut wad = Wad::load(&path).unwrap();
    wad.create_directory("/XY").unwrap();
    let before = fs::read(&path).unwrap();

    assert!(matches!(
        wad.create_file("/DATA"),
        Err(WadError::AlreadyExists { .. })
    ));
    assert!(matches!(
        wad.create_directory("/XY"),
        Err(WadError::AlreadyExists { .. })
    ));

    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_second_write_is_rejected_and_preserves_bytes() {
    let dir = TempDir::new().unwrap();
    let path = write_container(dir.path(), &[]);

    let mut wad = Wad::load(&path).unwrap();
    wad.create_file("/NOTE").unwrap();

    // An unmaterialized file reads as empty.
    let mut buf = [0u8; 8];
    assert_eq!(wad.read("/NOTE", &mut buf, 0).unwrap(), 0);

    assert_eq!(wad.write("/NOTE", b"hello", 0).unwrap(), 5);
    let before = fs::read(&path).unwrap();

    assert!(matches!(
        wad.write("/NOTE", b"world", 0),
        Err(WadError::AlreadyMaterialized { .. })
    ));
    assert_eq!(fs::read(&path).unwrap(), before);

    assert_eq!(wad.read("/NOTE", &mut buf, 0).unwrap(), 5);
    assert_eq!(&buf[..5], b"hello");
}

#[test]
fn test_writes_append_sequentially() {
    let dir = TempDir::new().unwrap();
    let path = write_container(dir.path(), &[]);

    let mut wad = Wad::load(&path).unwrap();
    wad.create_file("/ONE").unwrap();
    wad.create_file("/TWO").unwrap();
    wad.write("/ONE", b"first", 0).unwrap();
    wad.write("/TWO", b"second", 0).unwrap();
    drop(wad);

    let wad = Wad::load(&path).unwrap();
    let mut one = [0u8; 5];
    let mut two = [0u8; 6];
    wad.read("/ONE", &mut one, 0).unwrap();
    wad.read("/TWO", &mut two, 0).unwrap();
    assert_eq!(&one, b"first");
    assert_eq!(&two, b"second");

    // Payloads were laid out back to back from the original table offset.
    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[12..23], b"firstsecond");
}

#[test]
fn test_write_with_explicit_offset() {
    let dir = TempDir::new().unwrap();
    let path = write_container(dir.path(), &[]);

    let mut wad = Wad::load(&path).unwrap();
    wad.create_file("/FAR").unwrap();
    assert_eq!(wad.write("/FAR", b"away", 64).unwrap(), 4);
    drop(wad);

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[64..68], b"away");

    let wad = Wad::load(&path).unwrap();
    let mut buf = [0u8; 4];
    wad.read("/FAR", &mut buf, 0).unwrap();
    assert_eq!(&buf, b"away");
}

#[test]
fn test_load_missing_container_fails() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Wad::load(dir.path().join("absent.wad")),
        Err(WadError::Io(_))
    ));
}

#[test]
fn test_magic_is_returned_verbatim() {
    let dir = TempDir::new().unwrap();
    let mut bytes = container_bytes(&[]);
    bytes[0..4].copy_from_slice(b"PWAD");
    let path = dir.path().join("pwad.wad");
    fs::write(&path, bytes).unwrap();

    let wad = Wad::load(&path).unwrap();
    assert_eq!(wad.magic(), "PWAD");
}
