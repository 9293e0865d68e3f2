//! Integration tests for level files
//!
//! These tests verify the editor's level round trip:
//! 1. Saved geometry and tiles come back identical
//! 2. A broken or mismatched level never half-loads
//! 3. Scenes load from RON files on disk

use slab2d_level::{
    load_level, save_level, ActiveScene, EditorCore, LevelError, LevelPaths, Scene,
    TileCoordinates, TileMap,
};
use slab2d_math::Vec2;
use slab2d_physics::{persist, CollisionLayer, PersistError, StaticBodyStore};

fn build_level(editor: &mut EditorCore, statics: &mut StaticBodyStore) {
    let corners = [
        (Vec2::new(0.0, 0.0), Vec2::new(200.0, 20.0)),
        (Vec2::new(300.0, 40.0), Vec2::new(340.0, 60.0)),
        (Vec2::new(-100.0, 100.0), Vec2::new(-60.0, 300.0)),
    ];
    for (i, (from, to)) in corners.into_iter().enumerate() {
        editor.selected_tile = TileCoordinates::new(1, i as i32);
        editor.begin_shape(statics, from);
        editor.drag_shape(statics, to);
        editor.end_shape();
    }
}

#[test]
fn test_level_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LevelPaths::in_dir(dir.path());

    let mut statics = StaticBodyStore::new();
    let mut editor = EditorCore::new();
    build_level(&mut editor, &mut statics);
    editor.save(&statics, &paths).unwrap();

    let mut loaded_statics = StaticBodyStore::new();
    let mut loaded_editor = EditorCore::new();
    loaded_editor.load(&mut loaded_statics, &paths).unwrap();

    assert_eq!(loaded_statics, statics);
    assert_eq!(loaded_editor.tiles(), editor.tiles());
    assert_eq!(loaded_editor.active_body(), None);
}

#[test]
fn test_removal_then_save_keeps_tiles_aligned() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LevelPaths::in_dir(dir.path());

    let mut statics = StaticBodyStore::new();
    let mut editor = EditorCore::new();
    build_level(&mut editor, &mut statics);

    // Select and delete the middle platform
    editor.begin_move(&statics, Vec2::new(320.0, 50.0));
    editor.end_move();
    editor.remove_active(&mut statics).unwrap();
    editor.save(&statics, &paths).unwrap();

    let mut loaded = StaticBodyStore::new();
    let mut tiles = TileMap::new();
    load_level(&mut loaded, &mut tiles, &paths).unwrap();

    assert_eq!(loaded.count(), 2);
    assert_eq!(tiles.tile_for(0), Some(TileCoordinates::new(1, 0)));
    assert_eq!(tiles.tile_for(1), Some(TileCoordinates::new(1, 2)));
}

#[test]
fn test_missing_tiles_file_loads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LevelPaths::in_dir(dir.path());

    let mut source = StaticBodyStore::new();
    source.create(Vec2::ZERO, Vec2::splat(10.0), CollisionLayer::TERRAIN);
    source.dump(&paths.static_bodies).unwrap();

    let mut statics = StaticBodyStore::new();
    statics.create(Vec2::new(5.0, 5.0), Vec2::splat(1.0), CollisionLayer::ENEMY);
    let before = statics.clone();
    let mut tiles = TileMap::new();
    tiles.attach(TileCoordinates::new(7, 7), 0);

    let err = load_level(&mut statics, &mut tiles, &paths).unwrap_err();
    assert!(matches!(err, LevelError::Io(_)));
    assert_eq!(statics, before);
    assert_eq!(tiles.tile_for(0), Some(TileCoordinates::new(7, 7)));
}

#[test]
fn test_dangling_tile_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LevelPaths::in_dir(dir.path());

    let mut source = StaticBodyStore::new();
    source.create(Vec2::ZERO, Vec2::splat(10.0), CollisionLayer::TERRAIN);
    source.dump(&paths.static_bodies).unwrap();
    std::fs::write(
        &paths.tiles,
        "TileMap(tiles: [(tile: (row: 0, column: 0), static_body: 4)])",
    )
    .unwrap();

    let mut statics = StaticBodyStore::new();
    let mut tiles = TileMap::new();
    let err = load_level(&mut statics, &mut tiles, &paths).unwrap_err();

    assert!(matches!(err, LevelError::DanglingTile { static_body: 4, count: 1 }));
    assert!(statics.is_empty());
    assert!(tiles.is_empty());
}

#[test]
fn test_corrupt_geometry_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LevelPaths::in_dir(dir.path());
    std::fs::write(&paths.static_bodies, b"SLAB2DSB\x09\x00\x00\x00").unwrap();
    std::fs::write(&paths.tiles, "TileMap(tiles: [])").unwrap();

    let mut statics = StaticBodyStore::new();
    let mut tiles = TileMap::new();
    let err = load_level(&mut statics, &mut tiles, &paths).unwrap_err();
    assert!(matches!(err, LevelError::Persist(PersistError::Truncated { .. })));
}

#[test]
fn test_save_refuses_dangling_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LevelPaths::in_dir(dir.path());

    let statics = StaticBodyStore::new();
    let mut tiles = TileMap::new();
    tiles.attach(TileCoordinates::default(), 0);

    assert!(save_level(&statics, &tiles, &paths).is_err());
    assert!(!paths.static_bodies.exists());
    assert!(!paths.tiles.exists());
}

#[test]
fn test_failed_tile_write_keeps_previous_level() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LevelPaths::in_dir(dir.path());

    let mut statics = StaticBodyStore::new();
    statics.create(Vec2::ZERO, Vec2::splat(10.0), CollisionLayer::TERRAIN);
    save_level(&statics, &TileMap::new(), &paths).unwrap();

    // A non-empty directory where the tile list should go cannot be replaced
    let blocked = dir.path().join("blocked");
    std::fs::create_dir(&blocked).unwrap();
    std::fs::write(blocked.join("keep"), "x").unwrap();
    let bad_paths = LevelPaths::new(&paths.static_bodies, &blocked);

    statics.create(Vec2::new(50.0, 0.0), Vec2::splat(10.0), CollisionLayer::TERRAIN);
    statics.create(Vec2::new(100.0, 0.0), Vec2::splat(10.0), CollisionLayer::TERRAIN);
    assert!(save_level(&statics, &TileMap::new(), &bad_paths).is_err());

    let on_disk = persist::read_file(&paths.static_bodies).unwrap();
    assert_eq!(on_disk.len(), 1);
    assert!(blocked.join("keep").exists());
    assert!(!dir.path().join("static-bodies.bin.tmp").exists());
    assert!(!dir.path().join("blocked.tmp").exists());
}

#[test]
fn test_scene_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.ron");

    let mut scene = Scene::new("Arena").with_gravity(Vec2::new(0.0, -50.0));
    scene.add_static(Vec2::new(0.0, -10.0), Vec2::new(500.0, 20.0), CollisionLayer::TERRAIN);
    scene.save(&path).unwrap();

    let loaded = Scene::load(&path).unwrap();
    assert_eq!(loaded, scene);

    let active = ActiveScene::from_template(&loaded, None);
    assert_eq!(active.world.statics().count(), 1);
    assert_eq!(active.world.config.gravity, Vec2::new(0.0, -50.0));
}
