use super::*;
use crate::core::{EngineError, ObstacleSet, SeededRandom};

fn settings(columns: i32, rows: i32) -> SimulationSettings {
    SimulationSettings {
        chunk_size: 4,
        layout: ChunkLayout {
            origin: ChunkPos::new(0, 0),
            columns,
            rows,
            extra: Vec::new(),
        },
        ..SimulationSettings::default()
    }
}

fn engine_with(settings: SimulationSettings, obstacles: ObstacleSet) -> SimulationEngine {
    SimulationEngine::with_sources(settings, Box::new(obstacles), Box::new(SeededRandom::new(7))).unwrap()
}

fn kind_at(engine: &SimulationEngine, x: i32, y: i32) -> Option<ElementKind> {
    engine.element_at(WorldPos::new(x, y)).map(|e| e.kind)
}

fn run(engine: &mut SimulationEngine, ticks: u32) {
    for _ in 0..ticks {
        engine.step();
    }
}

fn assert_slots_consistent(engine: &SimulationEngine) {
    let mut occupied = 0;
    for chunk in engine.chunks.iter() {
        for (local, key) in chunk.occupied_keys() {
            occupied += 1;
            let el = engine.elements.get(key).expect("slot points at a dead element");
            assert_eq!(el.cell, CellPos::new(chunk.pos(), local));
        }
    }
    assert_eq!(occupied, engine.elements.len());
}

fn line_template(width: usize) -> ShapeTemplate {
    let row = "#".repeat(width);
    ShapeTemplate::from_mask(&[row.as_str()]).unwrap()
}

#[test]
fn sand_sinks_below_water_in_a_well() {
    for ordering in [ChunkOrdering::Sequential, ChunkOrdering::FourSample] {
        let mut obstacles = ObstacleSet::new();
        for y in 0..12 {
            for x in [0, 2, 3] {
                obstacles.insert(WorldPos::new(x, y));
            }
        }
        let mut engine = engine_with(SimulationSettings { ordering, ..settings(1, 3) }, obstacles);
        engine.spawn_element(WorldPos::new(1, 0), ElementKind::Water).unwrap();
        engine.spawn_element(WorldPos::new(1, 1), ElementKind::Sand).unwrap();

        run(&mut engine, 300);

        assert_eq!(kind_at(&engine, 1, 0), Some(ElementKind::Sand), "{:?}", ordering);
        assert_eq!(kind_at(&engine, 1, 1), Some(ElementKind::Water), "{:?}", ordering);
    }
}

#[test]
fn inactive_chunk_is_not_stepped() {
    let mut engine = engine_with(settings(1, 2), ObstacleSet::new());
    let key = engine.spawn_element(WorldPos::new(1, 6), ElementKind::Sand).unwrap();
    let pos = ChunkPos::new(0, 1);
    {
        let chunk = engine.chunks.chunk_mut(pos).unwrap();
        chunk.is_active = false;
        chunk.is_active_next_frame = false;
    }

    engine.step();
    let el = engine.element(key).unwrap();
    assert_eq!(el.cell.to_world(4), WorldPos::new(1, 6));
    assert_eq!(el.fall_velocity, 0.0);

    engine.chunks.activate_chunk(pos);
    engine.step();
    assert_eq!(engine.element(key).unwrap().cell.to_world(4), WorldPos::new(1, 5));
}

#[test]
fn mixed_elements_never_share_a_slot() {
    let mut engine = engine_with(settings(3, 3), ObstacleSet::new());
    let kinds = [ElementKind::Sand, ElementKind::Water, ElementKind::SawDust, ElementKind::Flour];
    for x in 0..12 {
        for y in 6..12 {
            let kind = kinds[((x + y) % 4) as usize];
            engine.spawn_element(WorldPos::new(x, y), kind).unwrap();
        }
    }
    let spawned = engine.element_count();

    for _ in 0..40 {
        run(&mut engine, 5);
        assert_slots_consistent(&engine);
    }
    assert_eq!(engine.element_count(), spawned);
}

#[test]
fn both_orderings_settle_a_column_into_a_supported_pile() {
    for ordering in [ChunkOrdering::Sequential, ChunkOrdering::FourSample] {
        let mut engine = engine_with(SimulationSettings { ordering, ..settings(3, 4) }, ObstacleSet::new());
        for y in 4..14 {
            engine.spawn_element(WorldPos::new(5, y), ElementKind::Sand).unwrap();
        }

        run(&mut engine, 400);

        assert_eq!(engine.element_count(), 10);
        for (_, el) in engine.elements().iter() {
            let pos = el.cell.to_world(4);
            assert!(
                pos.y == 0 || engine.element_at(pos.offset(0, -1)).is_some(),
                "{:?} left sand floating at {:?}",
                ordering,
                pos
            );
        }
        assert_slots_consistent(&engine);
    }
}

#[test]
fn spawn_element_reports_conflicts() {
    let mut obstacles = ObstacleSet::new();
    obstacles.insert(WorldPos::new(2, 2));
    let mut engine = engine_with(settings(1, 1), obstacles);

    assert!(engine.spawn_element(WorldPos::new(1, 1), ElementKind::Sand).is_ok());
    assert!(matches!(
        engine.spawn_element(WorldPos::new(1, 1), ElementKind::Sand),
        Err(EngineError::Occupied { .. })
    ));
    assert!(matches!(
        engine.spawn_element(WorldPos::new(2, 2), ElementKind::Sand),
        Err(EngineError::Occupied { .. })
    ));
    assert!(matches!(
        engine.spawn_element(WorldPos::new(9, 0), ElementKind::Sand),
        Err(EngineError::OutOfWorld { x: 9, y: 0 })
    ));
    assert!(engine.remove_element(WorldPos::new(1, 1)));
    assert!(!engine.remove_element(WorldPos::new(1, 1)));
}

#[test]
fn landed_block_granularizes_then_signals_spawn() {
    let mut engine = engine_with(SimulationSettings { spawn_delay_ticks: 2, ..settings(3, 4) }, ObstacleSet::new());
    let id = engine.spawn_block((5.5, 8.5), line_template(3), Rgba::opaque(200, 40, 40), ElementKind::Sand);
    assert_eq!(engine.block(id).unwrap().members().len(), 3);

    // Members cannot be removed while the block owns them.
    assert!(!engine.remove_element(WorldPos::new(5, 8)));

    let mut ticks = 0;
    while engine.block_count() > 0 && ticks < 40 {
        engine.step();
        ticks += 1;
    }
    assert_eq!(engine.block_count(), 0);

    let events = engine.drain_events();
    assert!(events.contains(&EngineEvent::BlockGranularized { block: id }));
    assert!(!events.contains(&EngineEvent::GameOver));
    assert!(!engine.is_game_over());
    assert!((4..=6).all(|x| kind_at(&engine, x, 0) == Some(ElementKind::Sand)));
    assert!(engine.elements().iter().all(|(_, el)| el.block.is_none()));

    run(&mut engine, 2);
    assert!(engine.drain_events().contains(&EngineEvent::SpawnDue));
}

#[test]
fn fast_forward_does_not_jump_over_obstacles() {
    let mut obstacles = ObstacleSet::new();
    obstacles.insert(WorldPos::new(5, 7));
    let mut engine = engine_with(settings(3, 4), obstacles);
    engine.spawn_block((5.5, 8.5), line_template(1), Rgba::WHITE, ElementKind::Bricks);
    engine.set_fast_forward(true);

    engine.step();

    assert_eq!(engine.block_count(), 0);
    assert_eq!(kind_at(&engine, 5, 8), Some(ElementKind::Bricks));
    assert_eq!(kind_at(&engine, 5, 6), None);
    assert_slots_consistent(&engine);
}

#[test]
fn four_sample_pass_order_is_fixed() {
    let mut engine = engine_with(settings(2, 2), ObstacleSet::new());
    let keys: Vec<ElementKey> = [(1, 2), (5, 2), (1, 6), (5, 6)]
        .into_iter()
        .map(|(x, y)| engine.spawn_element(WorldPos::new(x, y), ElementKind::Sand).unwrap())
        .collect();

    let active = engine.chunks.active_positions();
    assert_eq!(
        chunk_processing::sweep_order(&active, ChunkOrdering::FourSample),
        vec![ChunkPos::new(1, 1), ChunkPos::new(0, 0), ChunkPos::new(1, 0), ChunkPos::new(0, 1)]
    );
    assert_eq!(
        chunk_processing::sweep_order(&active, ChunkOrdering::Sequential),
        vec![ChunkPos::new(0, 0), ChunkPos::new(1, 0), ChunkPos::new(0, 1), ChunkPos::new(1, 1)]
    );

    // Parity uses Euclidean modulo for negative chunk coordinates.
    let negative = [ChunkPos::new(-2, -1), ChunkPos::new(-1, -1), ChunkPos::new(0, 0), ChunkPos::new(-1, 0)];
    assert_eq!(
        chunk_processing::sweep_order(&negative, ChunkOrdering::FourSample),
        vec![ChunkPos::new(-1, -1), ChunkPos::new(0, 0), ChunkPos::new(-1, 0), ChunkPos::new(-2, -1)]
    );

    engine.step();
    for key in keys {
        assert_eq!(engine.element(key).unwrap().last_step, engine.tick());
    }
}

#[test]
fn rotate_turns_the_current_block() {
    let mut engine = engine_with(settings(3, 4), ObstacleSet::new());
    assert!(!engine.rotate());

    let id = engine.spawn_block((5.5, 8.5), line_template(3), Rgba::WHITE, ElementKind::Bricks);
    assert!(engine.rotate());
    assert_eq!(engine.block(id).unwrap().rotation(), 1);
    assert_eq!(kind_at(&engine, 5, 9), Some(ElementKind::Bricks));
    assert_eq!(kind_at(&engine, 5, 7), Some(ElementKind::Bricks));
    assert_eq!(kind_at(&engine, 4, 8), None);
}

#[test]
fn full_line_is_cleared_and_scored() {
    let settings = SimulationSettings {
        game_over_lifetime_ticks: 0,
        scan_interval_ticks: 1,
        points_per_cell: 10,
        ..settings(3, 2)
    };
    let mut engine = engine_with(settings, ObstacleSet::new());
    engine.spawn_block((6.5, 0.5), line_template(12), Rgba::opaque(40, 200, 40), ElementKind::Sand);
    assert_eq!(engine.element_count(), 12);

    run(&mut engine, 1);
    assert_eq!(engine.block_count(), 0);
    assert_eq!(engine.element_count(), 12);

    run(&mut engine, 1);
    assert_eq!(engine.element_count(), 0);
    assert_eq!(engine.score(), 120);
    assert!(engine.chunks().is_active(ChunkPos::new(0, 0)));

    let events = engine.drain_events();
    assert!(events.contains(&EngineEvent::CellsCleared { count: 12 }));
    assert!(events.contains(&EngineEvent::Score { delta: 120 }));
}

#[test]
fn explicit_scan_finds_the_line_without_clearing() {
    let mut engine = engine_with(settings(3, 1), ObstacleSet::new());
    let red = Rgba::opaque(220, 30, 30);
    engine.spawn_block((6.5, 0.5), line_template(12), red, ElementKind::Sand);

    // Still owned by the block.
    assert!(engine.scan(None, &[red], ScanMode::All).is_empty());

    let id = engine.blocks.ids()[0];
    let mut ctx = sim_context!(engine, false);
    engine.blocks.granularize(&mut ctx, id, &BlockConfig::default());

    let found = engine.scan(Some(ElementKind::Sand), &[red], ScanMode::FirstMatch);
    assert_eq!(found.len(), 12);
    assert!(engine.scan(Some(ElementKind::Water), &[red], ScanMode::All).is_empty());
    assert_eq!(engine.element_count(), 12);

    assert_eq!(engine.clear_cells(&found), 12);
    assert_eq!(engine.score(), 12);
}

#[test]
fn temporary_elements_expire() {
    let mut engine = engine_with(settings(1, 1), ObstacleSet::new());
    let key = engine.spawn_temporary(WorldPos::new(1, 0), ElementKind::Sand, 3).unwrap();

    run(&mut engine, 2);
    assert!(engine.element(key).is_some());
    run(&mut engine, 1);
    assert!(engine.element(key).is_none());
    assert_eq!(engine.drain_events(), vec![EngineEvent::ElementExpired]);
}

#[test]
fn expiry_never_hits_a_reused_slot() {
    let mut engine = engine_with(settings(1, 1), ObstacleSet::new());
    engine.spawn_temporary(WorldPos::new(1, 0), ElementKind::Sand, 3).unwrap();
    assert!(engine.remove_element(WorldPos::new(1, 0)));
    let replacement = engine.spawn_element(WorldPos::new(1, 0), ElementKind::Sand).unwrap();

    run(&mut engine, 5);
    assert!(engine.element(replacement).is_some());
    assert!(engine.drain_events().is_empty());
}

#[test]
fn expiry_skips_block_owned_elements() {
    let mut engine = engine_with(settings(1, 1), ObstacleSet::new());
    let key = engine.spawn_temporary(WorldPos::new(1, 0), ElementKind::Sand, 1).unwrap();
    engine.elements.get_mut(key).unwrap().block = Some(BlockId(42));

    run(&mut engine, 2);
    assert!(engine.element(key).is_some());
}

#[test]
fn quick_granularization_is_game_over_and_evacuates() {
    let mut obstacles = ObstacleSet::new();
    obstacles.insert(WorldPos::new(1, 13));
    let settings = SimulationSettings {
        evacuation_zone: Some(CellRect::new(0, 0, 12, 4)),
        ..settings(3, 4)
    };
    let mut engine = engine_with(settings, obstacles);
    engine.spawn_element(WorldPos::new(9, 10), ElementKind::Water).unwrap();
    engine.spawn_block((1.5, 14.5), line_template(3), Rgba::WHITE, ElementKind::Sand);

    engine.step();
    assert!(engine.is_game_over());
    assert_eq!(engine.block_count(), 0);

    let mut events = engine.drain_events();
    for _ in 0..100 {
        engine.step();
        events.extend(engine.drain_events());
    }

    assert_eq!(events.iter().filter(|e| **e == EngineEvent::GameOver).count(), 1);
    assert_eq!(events.iter().filter(|e| **e == EngineEvent::EvacuationFinished).count(), 1);
    assert!(!events.contains(&EngineEvent::SpawnDue));
    assert!(engine.element_count() > 0);
    for (_, el) in engine.elements().iter() {
        assert!(el.cell.to_world(4).y < 4);
    }
}

#[test]
fn evacuation_finishes_when_particles_fall_out_of_the_zone() {
    let mut obstacles = ObstacleSet::new();
    obstacles.insert(WorldPos::new(1, 13));
    // The zone floats mid-air: evacuated particles drop straight through it.
    let settings = SimulationSettings {
        evacuation_zone: Some(CellRect::new(0, 8, 12, 2)),
        ..settings(3, 4)
    };
    let mut engine = engine_with(settings, obstacles);
    engine.spawn_element(WorldPos::new(9, 14), ElementKind::Sand).unwrap();
    engine.spawn_block((1.5, 14.5), line_template(3), Rgba::WHITE, ElementKind::Sand);

    let mut events = Vec::new();
    for _ in 0..100 {
        engine.step();
        events.extend(engine.drain_events());
    }

    assert!(engine.is_game_over());
    assert_eq!(events.iter().filter(|e| **e == EngineEvent::EvacuationFinished).count(), 1);
    assert!(engine.elements().iter().all(|(_, el)| el.cell.to_world(4).y < 8));
}

#[test]
fn evacuation_without_zone_removes_particles() {
    let mut engine = engine_with(settings(3, 2), ObstacleSet::new());
    engine.spawn_element(WorldPos::new(8, 5), ElementKind::Sand).unwrap();
    engine.spawn_block((5.5, 0.5), line_template(3), Rgba::WHITE, ElementKind::Sand);

    engine.step();
    assert!(engine.is_game_over());
    run(&mut engine, 10);

    assert_eq!(engine.element_count(), 0);
    assert!(engine.drain_events().contains(&EngineEvent::EvacuationFinished));
}

#[test]
fn reset_starts_over() {
    let mut engine = engine_with(settings(2, 2), ObstacleSet::new());
    engine.spawn_element(WorldPos::new(1, 5), ElementKind::Sand).unwrap();
    engine.spawn_block((4.5, 6.5), line_template(2), Rgba::WHITE, ElementKind::Sand);
    run(&mut engine, 3);

    engine.reset();
    assert_eq!(engine.tick(), 0);
    assert_eq!(engine.element_count(), 0);
    assert_eq!(engine.block_count(), 0);
    assert_eq!(engine.active_chunk_count(), 0);
}

#[test]
fn intents_map_to_block_control() {
    let mut engine = engine_with(settings(1, 1), ObstacleSet::new());
    engine.set_horizontal_intent(HorizontalIntent::Left);
    assert_eq!(engine.control.horizontal(), -1);
    engine.set_move_right(true);
    assert_eq!(engine.control.horizontal(), 0);
    engine.set_horizontal_intent(HorizontalIntent::None);
    engine.set_fast_forward(true);
    assert_eq!(engine.control, BlockControl { move_left: false, move_right: false, fast_forward: true });
}

#[test]
fn perf_stats_are_collected_only_when_enabled() {
    let mut engine = engine_with(settings(1, 1), ObstacleSet::new());
    engine.spawn_element(WorldPos::new(1, 3), ElementKind::Sand).unwrap();

    engine.step();
    assert_eq!(engine.get_perf_stats().elements_simulated(), 0);

    engine.enable_perf_metrics(true);
    engine.step();
    let stats = engine.get_perf_stats();
    assert_eq!(stats.elements_simulated(), 1);
    assert_eq!(stats.element_count(), 1);
    assert!(stats.step_ms() >= 0.0);
}

#[test]
fn element_overrides_reach_the_table() {
    let mut settings = settings(1, 1);
    settings
        .element_overrides
        .insert(ElementKind::Water, serde_json::json!({ "flow_speed": 0.25 }));
    let engine = engine_with(settings, ObstacleSet::new());
    assert_eq!(engine.element_table().props(ElementKind::Water).flow_speed, 0.25);
}
