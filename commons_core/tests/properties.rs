//! Property tests: engine invariants under arbitrary (including hostile) actions.

use commons_core::{
    allocate, EngineConfig, PoolMode, RegenerationLaw, ResourceDynamics, StepEngine,
};
use commons_env::Action;
use proptest::prelude::*;

/// Raw action components, including values no sane policy would emit.
fn raw_value() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -1.0e6..1.0e6f64,
        2 => 0.0..50.0f64,
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

/// Harvest requests, occasionally large enough that their sum overflows.
fn request() -> impl Strategy<Value = f64> {
    prop_oneof![
        9 => 0.0..1.0e4f64,
        1 => 1.0e306..f64::MAX,
    ]
}

fn raw_action() -> impl Strategy<Value = Action> {
    (raw_value(), raw_value()).prop_map(|(h, c)| Action::new(h, c))
}

fn pool_mode() -> impl Strategy<Value = PoolMode> {
    prop_oneof![Just(PoolMode::PerStep), Just(PoolMode::Accumulating)]
}

fn regeneration() -> impl Strategy<Value = RegenerationLaw> {
    prop_oneof![Just(RegenerationLaw::Logistic), Just(RegenerationLaw::Linear)]
}

prop_compose! {
    fn engine_config()(
        num_agents in 1usize..6,
        capacity in 1.0..500.0f64,
        stock_frac in 0.0..=1.0f64,
        max_harvest in 0.0..100.0f64,
        regen_rate in -2.0..2.0f64,
        regeneration in regeneration(),
        governance_enabled in any::<bool>(),
        pool_mode in pool_mode(),
        pool_decay in 0.0..=1.0f64,
        bonus_coefficient in 0.0..3.0f64,
        initial_wealth in 0.0..20.0f64,
    ) -> EngineConfig {
        EngineConfig {
            num_agents,
            capacity,
            initial_stock: capacity * stock_frac,
            max_harvest,
            regen_rate,
            regeneration,
            governance_enabled,
            pool_mode,
            pool_decay,
            bonus_coefficient,
            initial_wealth,
            horizon: 30,
            ..Default::default()
        }
    }
}

proptest! {
    #[test]
    fn prop_allocation_matches_min_of_stock_and_demand(
        requests in prop::collection::vec(request(), 0..12),
        stock in 0.0..1.0e4f64,
    ) {
        let out = allocate(&requests, stock);
        let demand: f64 = requests.iter().sum();
        // An overflowed demand is still larger than any stock
        let expected = stock.min(demand);
        let granted: f64 = out.realized.iter().sum();

        prop_assert!((granted - expected).abs() <= 1e-9 * expected.max(1.0));
        prop_assert!(out.total <= stock);
        prop_assert!((0.0..=1.0).contains(&out.scale));
        for (got, asked) in out.realized.iter().zip(&requests) {
            prop_assert!(*got <= *asked);
            prop_assert!(*got >= 0.0);
        }
    }

    #[test]
    fn prop_stock_and_wealth_stay_in_bounds(
        config in engine_config(),
        steps in prop::collection::vec(prop::collection::vec(raw_action(), 0..8), 1..30),
    ) {
        let capacity = config.capacity;
        let mut engine = StepEngine::new(config).unwrap();

        for actions in &steps {
            if engine.is_terminated() {
                break;
            }
            let out = engine.step(actions).unwrap();
            prop_assert!(out.state.stock >= 0.0 && out.state.stock <= capacity);
            prop_assert!(out.state.wealth.iter().all(|w| *w >= 0.0 && w.is_finite()));
            if let Some(pool) = out.state.pool {
                prop_assert!(pool >= 0.0);
            }
            for (realized, requested) in out.record.realized.iter().zip(&out.record.requested) {
                prop_assert!(realized <= requested);
            }
            prop_assert!(out.record.total_harvest <= out.record.stock_before);
        }
    }

    #[test]
    fn prop_governance_disabled_means_no_pool(
        config in engine_config(),
        steps in prop::collection::vec(prop::collection::vec(raw_action(), 0..8), 1..15),
    ) {
        let config = EngineConfig { governance_enabled: false, ..config };
        let mut engine = StepEngine::new(config).unwrap();

        for actions in &steps {
            let out = engine.step(actions).unwrap();
            prop_assert_eq!(out.state.pool, None);
            prop_assert_eq!(out.record.bonus, 0.0);
            prop_assert!(out.record.contributions.iter().all(|c| *c == 0.0));
        }
    }

    #[test]
    fn prop_logistic_growth_strictly_increases(
        capacity in 10.0..1000.0f64,
        frac in 0.01..0.99f64,
        rate in 0.01..1.0f64,
    ) {
        let dynamics = ResourceDynamics::new(RegenerationLaw::Logistic, rate, capacity);
        let stock = capacity * frac;
        let next = dynamics.next_stock(stock, 0.0, 0.0).next;
        prop_assert!(next > stock);
        prop_assert!(next <= capacity);
    }

    #[test]
    fn prop_identical_inputs_replay_identically(
        config in engine_config(),
        steps in prop::collection::vec(prop::collection::vec(raw_action(), 0..8), 1..20),
    ) {
        let mut a = StepEngine::new(config.clone()).unwrap();
        let mut b = StepEngine::new(config).unwrap();

        for actions in &steps {
            let oa = a.step(actions).unwrap();
            let ob = b.step(actions).unwrap();
            prop_assert_eq!(oa.state, ob.state);
            prop_assert_eq!(oa.observations, ob.observations);
        }
    }
}
