use std::collections::BTreeMap;

use proptest::prelude::*;

use dg_core::partition::{Completion, PartitionParams, RoomPartitioner};
use dg_core::{AutoGenerate, Dungeon, DungeonRng, Generator, GeneratorConfig, Rect, Size};

fn config_strategy() -> impl Strategy<Value = GeneratorConfig> {
    (
        any::<u64>(),
        (12i32..80, 12i32..80),
        (3i32..12, 3i32..12),
        0.0f32..=1.0,
        0.0f32..=0.5,
        (1i32..4, 0i32..4),
        0i32..3,
        0.0f32..=1.0,
    )
        .prop_map(
            |(seed, (w, h), (min_w, min_h), bias, large, (door_min, door_extra), wall, ratio)| {
                GeneratorConfig {
                    seed,
                    dungeon_size: Size::new(w, h),
                    room_min_size: Size::new(min_w, min_h),
                    room_max_size: Size::new(min_w * 3, min_h * 3),
                    split_direction_bias: bias,
                    large_room_chance: large,
                    door_min_size: door_min,
                    door_max_size: door_min + door_extra,
                    min_distance_from_walls: wall,
                    remove_ratio: ratio,
                    ..Default::default()
                }
            },
        )
}

fn doors_done(config: &GeneratorConfig) -> Generator {
    let mut generator = Generator::headless(GeneratorConfig {
        auto_generate: AutoGenerate {
            connections: false,
            ..Default::default()
        },
        ..config.clone()
    })
    .unwrap();
    generator.run_to_completion();
    generator
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_generation_is_deterministic(config in config_strategy()) {
        let run = |config: &GeneratorConfig| {
            let mut generator = Generator::headless(config.clone()).unwrap();
            generator.run_to_completion();
            serde_json::to_string(generator.dungeon()).unwrap()
        };
        prop_assert_eq!(run(&config), run(&config));
    }

    #[test]
    fn prop_partition_is_complete_and_bounded(config in config_strategy()) {
        let mut rng = DungeonRng::new(config.seed);
        let mut dungeon = Dungeon::new();
        let tree = RoomPartitioner::new(config.dungeon_size, PartitionParams::from(&config))
            .run(&mut rng, &mut dungeon);

        prop_assert!(tree.is_complete());
        for (_, node) in tree.nodes() {
            prop_assert_eq!(node.status, Completion::Complete);
            prop_assert_eq!(node.left.is_some(), node.right.is_some());
        }

        let min = config.room_min_size;
        let max = config.room_max_size;
        let size = config.dungeon_size;
        let cap = (size.width / min.width).max(1) * (size.height / min.height).max(1);
        prop_assert!(dungeon.room_count() as i32 <= cap);
        prop_assert_eq!(tree.leaves().count(), dungeon.room_count());

        for room in dungeon.rooms() {
            let leaf = room.interior();
            prop_assert!(leaf.width >= min.width && leaf.height >= min.height);
            let small = leaf.width < 2 * min.width && leaf.height < 2 * min.height;
            let within_max = leaf.width < max.width && leaf.height < max.height;
            prop_assert!(small || within_max, "{:?} too large", leaf);
            prop_assert!(Rect::new(0, 0, size.width, size.height).contains(&leaf));
        }
    }

    #[test]
    fn prop_doors_fit_their_rooms(config in config_strategy()) {
        let generator = doors_done(&config);
        let dungeon = generator.dungeon();

        for door in dungeon.doors() {
            let (a, b) = door.rooms;
            prop_assert_ne!(a, b);
            let overlap = dungeon.room(a).unwrap().rect.intersect(&dungeon.room(b).unwrap().rect);
            prop_assert!(overlap.contains(&door.rect));
            let along = if overlap.width > overlap.height { door.rect.width } else { door.rect.height };
            prop_assert!(along >= config.door_min_size && along <= config.door_max_size);
        }
        prop_assert!(dungeon.check_invariants().is_empty());
    }

    #[test]
    fn prop_pruning_keeps_every_linked_room_linked(config in config_strategy()) {
        let mut generator = doors_done(&config);
        let before: BTreeMap<_, _> = generator
            .dungeon()
            .rooms()
            .map(|r| (r.id, r.doors.len()))
            .collect();

        generator.trigger_connections().unwrap();
        generator.run_to_completion();
        let dungeon = generator.dungeon();

        for room in dungeon.rooms() {
            if before[&room.id] > 0 {
                prop_assert!(!room.doors.is_empty(), "{} stranded", room.id);
            }
        }
        prop_assert!(dungeon.check_invariants().is_empty());
    }
}
