use std::path::PathBuf;

use delve_core::layout::DirectionSet;
use delve_core::settings::{RoomList, RoomTemplate};
use delve_core::{generate_level, GridCoord, LevelSettings};
use delve_save::{
    list_exports, load_header, load_layout, load_settings, save_layout, save_layout_compact, save_layout_gz,
    save_settings, SaveError,
};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("delve_test_{}_{}", std::process::id(), name))
}

fn settings() -> LevelSettings {
    LevelSettings {
        seed: Some(2024),
        grid_size: GridCoord::new(10, 10, 1),
        basic_rooms: vec![RoomList {
            weight: 1.0,
            rooms: vec![RoomTemplate::single("cell", DirectionSet::all())],
        }],
        basic_rooms_min: 3,
        basic_rooms_max: 5,
        ..Default::default()
    }
}

#[test]
fn test_layout_survives_every_format() {
    let layout = generate_level(&settings());
    let paths = [temp_path("pretty.json"), temp_path("compact.json"), temp_path("packed.json.gz")];
    save_layout(&layout, &paths[0]).unwrap();
    save_layout_compact(&layout, &paths[1]).unwrap();
    save_layout_gz(&layout, &paths[2]).unwrap();

    for path in &paths {
        let file = load_layout(path).unwrap();
        assert_eq!(file.header.seed, 2024);
        assert_eq!(file.header.rooms, layout.rooms());
        assert_eq!(file.header.corridors, layout.corridors());
        assert_eq!(file.layout.tiles(), layout.tiles());
        assert_eq!(file.layout.path_tiles(), layout.path_tiles());
        assert_eq!(file.layout.connections(), layout.connections());
        assert_eq!(load_header(path).unwrap(), file.header);
        std::fs::remove_file(path).ok();
    }
}

#[test]
fn test_compressed_export_is_gzip() {
    let layout = generate_level(&settings());
    let path = temp_path("magic.json.gz");
    save_layout_gz(&layout, &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes[..2], [0x1f_u8, 0x8b]);
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_settings_roundtrip_and_validation() {
    let path = temp_path("settings.json");
    save_settings(&settings(), &path).unwrap();
    assert_eq!(load_settings(&path).unwrap(), settings());

    let broken = LevelSettings {
        grid_size: GridCoord::new(0, 10, 1),
        ..settings()
    };
    save_settings(&broken, &path).unwrap();
    assert!(matches!(load_settings(&path), Err(SaveError::Settings(_))));
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_partial_settings_take_defaults() {
    let path = temp_path("partial.json");
    std::fs::write(&path, r#"{ "seed": 9, "grid_size": { "x": 6, "y": 6, "z": 2 } }"#).unwrap();
    let loaded = load_settings(&path).unwrap();
    assert_eq!(loaded.seed, Some(9));
    assert_eq!(loaded.grid_size, GridCoord::new(6, 6, 2));
    assert_eq!(loaded.room_buffer, LevelSettings::default().room_buffer);
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_garbage_is_rejected() {
    let path = temp_path("garbage.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(load_layout(&path), Err(SaveError::Serialization(_))));
    std::fs::write(&path, r#"{ "header": { "magic": "NOPE", "version": 1, "seed": 0,
        "grid_size": { "x": 1, "y": 1, "z": 1 }, "rooms": 0, "corridors": 0, "timestamp": 0 } }"#)
        .unwrap();
    assert!(matches!(load_header(&path), Err(SaveError::InvalidHeader)));
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_list_exports_reads_headers() {
    let dir = temp_path("exports");
    std::fs::create_dir_all(&dir).unwrap();
    let layout = generate_level(&settings());
    save_layout(&layout, dir.join("a.json")).unwrap();
    save_layout_gz(&layout, dir.join("b.json.gz")).unwrap();
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let exports = list_exports(&dir).unwrap();
    assert_eq!(exports.len(), 2);
    assert!(exports.iter().all(|(_, header)| header.seed == 2024));
    std::fs::remove_dir_all(&dir).ok();
    assert!(list_exports(&dir).unwrap().is_empty());
}
