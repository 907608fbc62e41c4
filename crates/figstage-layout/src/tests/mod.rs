//! Unit and behaviour tests for the placement engine.

mod support;

mod engine_tests {
    use glam::DVec3;
    use rstest::rstest;

    use super::support::{SlideStrategy, unit_box};
    use crate::{Aabb, GridStrategy, PlacementEngine, PlacementError};

    #[rstest]
    fn always_colliding_search_stops_after_every_value() {
        let mut engine = PlacementEngine::new(SlideStrategy::new(0.0, 3.0, 1.0), 0.1);
        let mut seen = Vec::new();
        let result = engine.place_with(&unit_box(), |candidate| {
            seen.push(candidate.center().x);
            true
        });

        assert_eq!(result, Err(PlacementError::Exhausted { evaluations: 4 }));
        assert_eq!(seen, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(engine.parameters().value(0), Some(0.0));
    }

    #[rstest]
    fn first_free_candidate_is_accepted() {
        let mut engine = PlacementEngine::new(SlideStrategy::new(0.0, 10.0, 1.0), 0.0);
        let obstacle = Aabb::new(DVec3::ZERO, DVec3::splat(0.5));

        let outcome = engine
            .place(&unit_box(), &[obstacle])
            .expect("a free slot exists");

        // x = 1 touches the obstacle, so x = 2 is the first gap.
        assert_eq!(outcome.evaluations, 3);
        assert_eq!(outcome.placement.translation.x, 2.0);
        assert!(!outcome.bounds.intersects(&obstacle));
    }

    #[rstest]
    fn margin_widens_the_gap() {
        let obstacle = Aabb::new(DVec3::ZERO, DVec3::splat(0.5));
        let mut tight = PlacementEngine::new(SlideStrategy::new(0.0, 10.0, 0.25), 0.0);
        let mut loose = PlacementEngine::new(SlideStrategy::new(0.0, 10.0, 0.25), 1.0);

        let tight_x = tight
            .place(&unit_box(), &[obstacle])
            .expect("tight placement")
            .placement
            .translation
            .x;
        let loose_x = loose
            .place(&unit_box(), &[obstacle])
            .expect("loose placement")
            .placement
            .translation
            .x;
        assert!(loose_x > tight_x);
    }

    #[rstest]
    fn grid_separates_consecutive_scenes() {
        let mut engine = PlacementEngine::new(GridStrategy::new(DVec3::new(0.0, 1.2, 0.0)), 0.1);
        let scene = Aabb::new(DVec3::new(0.28, 0.21, 0.0), DVec3::new(0.28, 0.21, 0.02));

        let mut placed: Vec<Aabb> = Vec::new();
        for _ in 0..4 {
            let outcome = engine.place(&scene, &placed).expect("grid is unbounded");
            assert!(placed.iter().all(|other| !other.intersects(&outcome.bounds)));
            placed.push(outcome.bounds);
        }
    }

    #[rstest]
    fn search_resumes_within_a_pass() {
        let mut engine = PlacementEngine::new(SlideStrategy::new(0.0, 10.0, 1.0), 0.0);
        let first = engine.place(&unit_box(), &[]).expect("empty stage");
        let second = engine
            .place(&unit_box(), &[first.bounds])
            .expect("slot after first");
        assert_eq!(first.evaluations, 1);
        assert_eq!(second.placement.translation.x, 2.0);

        engine.reset();
        assert_eq!(engine.parameters().value(0), Some(0.0));
    }
}
