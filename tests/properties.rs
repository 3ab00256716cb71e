//! Scheduling properties over seeded random instances.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use u_timeline::duration::VolumeDuration;
use u_timeline::ga::{Chromosome, ChromosomeEvaluator, EvaluatorConfig};
use u_timeline::models::{GraphInput, ResourcePool, TaskGraph, WorkerCount};
use u_timeline::validation::validate_schedule;
use u_timeline::{evaluate, Placement, INFEASIBLE};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Instance {
    graph: TaskGraph,
    pool: ResourcePool,
    durations: VolumeDuration,
}

/// Random DAG: parents are drawn from lower indices and chains are runs of
/// consecutive works, so the block graph is acyclic.
fn random_instance(rng: &mut StdRng) -> Instance {
    let works = rng.random_range(1..=25);
    let worker_types = rng.random_range(1..=3);
    let contractors = rng.random_range(1..=3);

    let mut parents = Vec::with_capacity(works);
    for w in 0..works {
        let mut ps = Vec::new();
        for p in 0..w {
            if rng.random_bool(0.15) {
                ps.push(p);
            }
        }
        parents.push(ps);
    }

    let mut inseparables = Vec::new();
    let mut w = 0;
    while w < works {
        if rng.random_bool(0.2) {
            let len = rng.random_range(2..=3).min(works - w);
            inseparables.push((w..w + len).collect::<Vec<_>>());
            w += len;
        } else {
            w += 1;
        }
    }

    let mut capacities = Vec::with_capacity(contractors);
    for _ in 0..contractors {
        let row: Vec<WorkerCount> =
            (0..worker_types).map(|_| rng.random_range(1..=10)).collect();
        capacities.push(row);
    }

    let mut volumes = Vec::with_capacity(works);
    for _ in 0..works {
        let row: Vec<f64> = (0..worker_types)
            .map(|_| f64::from(rng.random_range(0..=20u32)))
            .collect();
        volumes.push(row);
    }

    Instance {
        graph: TaskGraph::new(parents, inseparables).unwrap(),
        pool: ResourcePool::new(capacities).unwrap(),
        durations: VolumeDuration::new(volumes),
    }
}

/// Random chromosome whose requests fit the (possibly bordered) capacities.
fn random_chromosome(rng: &mut StdRng, instance: &Instance) -> Chromosome {
    let pool = &instance.pool;
    let mut order: Vec<usize> = (0..instance.graph.len()).collect();
    order.shuffle(rng);

    let borders = if rng.random_bool(0.3) {
        let mut borders = Vec::with_capacity(pool.contractor_count());
        for row in pool.capacities() {
            let border: Vec<WorkerCount> =
                row.iter().map(|&c| rng.random_range(1..=c)).collect();
            borders.push(border);
        }
        Some(borders)
    } else {
        None
    };
    let effective = pool.effective_capacities(borders.as_deref());

    let mut resources = Vec::with_capacity(order.len());
    for _ in 0..order.len() {
        let contractor = rng.random_range(0..pool.contractor_count());
        let mut row: Vec<WorkerCount> = effective[contractor]
            .iter()
            .map(|&c| rng.random_range(1..=c))
            .collect();
        row.push(contractor as WorkerCount);
        resources.push(row);
    }

    let chromosome = Chromosome::new(order, resources);
    match borders {
        Some(borders) => chromosome.with_contractor_borders(borders),
        None => chromosome,
    }
}

#[test]
fn test_random_schedules_are_feasible() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..200 {
        let instance = random_instance(&mut rng);
        let evaluator =
            ChromosomeEvaluator::new(&instance.graph, &instance.pool, &instance.durations);
        let chromosome = random_chromosome(&mut rng, &instance);

        let outcome = evaluator.simulate(&chromosome).unwrap();
        let schedule = outcome.schedule().expect("requests fit capacity");
        assert_eq!(schedule.len(), instance.graph.len());
        assert!(outcome.fitness() >= 0);

        if let Err(violations) =
            validate_schedule(&instance.graph, &instance.pool, &chromosome, schedule)
        {
            panic!("violations: {violations:?}");
        }
    }
}

#[test]
fn test_random_window_schedules_are_feasible() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(43);
    let config = EvaluatorConfig::default().with_placement(Placement::EarliestWindow);

    for _ in 0..200 {
        let instance = random_instance(&mut rng);
        let evaluator =
            ChromosomeEvaluator::new(&instance.graph, &instance.pool, &instance.durations)
                .with_config(config.clone())
                .unwrap();
        let chromosome = random_chromosome(&mut rng, &instance);

        let outcome = evaluator.simulate(&chromosome).unwrap();
        let schedule = outcome.schedule().expect("requests fit capacity");
        assert_eq!(schedule.len(), instance.graph.len());

        if let Err(violations) =
            validate_schedule(&instance.graph, &instance.pool, &chromosome, schedule)
        {
            panic!("violations: {violations:?}");
        }
    }
}

#[test]
fn test_more_capacity_never_slower_random() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(17);

    for _ in 0..300 {
        let instance = random_instance(&mut rng);
        let chromosome = random_chromosome(&mut rng, &instance);
        let before = ChromosomeEvaluator::new(&instance.graph, &instance.pool, &instance.durations)
            .evaluate(std::slice::from_ref(&chromosome))
            .unwrap()[0];
        assert_ne!(before, INFEASIBLE);

        let contractor = rng.random_range(0..instance.pool.contractor_count());
        let worker_type = rng.random_range(0..instance.pool.worker_type_count());
        let raised_to = instance.pool.capacity(contractor, worker_type) + rng.random_range(1..=5);
        let raised = instance.pool.clone().with_capacity(contractor, worker_type, raised_to);

        let after = ChromosomeEvaluator::new(&instance.graph, &raised, &instance.durations)
            .evaluate(std::slice::from_ref(&chromosome))
            .unwrap()[0];
        assert!(
            after <= before,
            "capacity {contractor}/{worker_type} raised to {raised_to}: {before} -> {after}"
        );
    }
}

#[test]
fn test_evaluation_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(7);
    let instance = random_instance(&mut rng);
    let batch: Vec<Chromosome> =
        (0..30).map(|_| random_chromosome(&mut rng, &instance)).collect();

    let first = evaluate(&instance.graph, &instance.pool, &instance.durations, &batch).unwrap();
    let second = evaluate(&instance.graph, &instance.pool, &instance.durations, &batch).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_batch_order_independence() {
    let mut rng = StdRng::seed_from_u64(11);
    let instance = random_instance(&mut rng);
    let batch: Vec<Chromosome> =
        (0..30).map(|_| random_chromosome(&mut rng, &instance)).collect();
    let fitness = evaluate(&instance.graph, &instance.pool, &instance.durations, &batch).unwrap();

    let mut permutation: Vec<usize> = (0..batch.len()).collect();
    permutation.shuffle(&mut rng);
    let shuffled: Vec<Chromosome> = permutation.iter().map(|&i| batch[i].clone()).collect();
    let shuffled_fitness =
        evaluate(&instance.graph, &instance.pool, &instance.durations, &shuffled).unwrap();

    for (pos, &i) in permutation.iter().enumerate() {
        assert_eq!(shuffled_fitness[pos], fitness[i]);
    }
}

#[test]
fn test_parallel_matches_sequential() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..10 {
        let instance = random_instance(&mut rng);
        let batch: Vec<Chromosome> =
            (0..40).map(|_| random_chromosome(&mut rng, &instance)).collect();

        let sequential =
            ChromosomeEvaluator::new(&instance.graph, &instance.pool, &instance.durations)
                .evaluate(&batch)
                .unwrap();
        let parallel =
            ChromosomeEvaluator::new(&instance.graph, &instance.pool, &instance.durations)
                .with_config(EvaluatorConfig::default().with_threads(4))
                .unwrap()
                .evaluate(&batch)
                .unwrap();
        assert_eq!(sequential, parallel);
    }
}

#[test]
fn test_over_capacity_is_sentinel() {
    let mut rng = StdRng::seed_from_u64(3);
    let instance = random_instance(&mut rng);
    let mut chromosome = random_chromosome(&mut rng, &instance);

    // Only a chain head's row is read.
    let work = instance.graph.chain_head(chromosome.order[0]);
    let contractor = *chromosome.resources[work].last().unwrap() as usize;
    let capacity = instance.pool.capacity(contractor, 0);
    chromosome.resources[work][0] = capacity + 1;

    let fitness =
        evaluate(&instance.graph, &instance.pool, &instance.durations, &[chromosome]).unwrap();
    assert_eq!(fitness, vec![INFEASIBLE]);
}

#[test]
fn test_more_capacity_not_slower() {
    // Two independent works, 30 workers each.
    let graph = TaskGraph::new(vec![vec![], vec![]], vec![]).unwrap();
    let pool = ResourcePool::new(vec![vec![60]]).unwrap();
    let durations = VolumeDuration::uniform(2, 1, 60.0);
    let chromosome = Chromosome::new(vec![0, 1], vec![vec![30, 0], vec![30, 0]]);

    let tight = chromosome.clone().with_contractor_borders(vec![vec![50]]);
    let fitness = evaluate(&graph, &pool, &durations, &[tight, chromosome]).unwrap();
    assert_eq!(fitness, vec![4, 2]);
}

#[test]
fn test_json_fixture() {
    let graph: TaskGraph = serde_json::from_str(
        r#"{
            "parents": [[], [0], [1], [2], [2], [4]],
            "inseparables": [[0], [1], [2], [3], [4], [5]]
        }"#,
    )
    .unwrap();
    let pool: ResourcePool = serde_json::from_str("[[50, 50, 50, 50, 50, 50]]").unwrap();
    let chromosome: Chromosome = serde_json::from_str(
        r#"{
            "order": [0, 1, 2, 3, 4, 5],
            "resources": [
                [49, 49, 49, 49, 49, 49, 0],
                [49, 49, 49, 49, 49, 49, 0],
                [49, 49, 49, 49, 49, 49, 0],
                [49, 49, 49, 49, 49, 49, 0],
                [49, 49, 49, 49, 49, 49, 0],
                [49, 49, 49, 49, 49, 49, 0]
            ]
        }"#,
    )
    .unwrap();
    let durations = VolumeDuration::uniform(6, 6, 100.0);

    let fitness = evaluate(&graph, &pool, &durations, &[chromosome]).unwrap();
    assert!(fitness[0] > 0);
    assert_eq!(fitness, vec![18]);
}

#[test]
fn test_cyclic_graph_rejected() {
    let input = GraphInput {
        parents: vec![vec![1], vec![0]],
        inseparables: vec![],
    };
    assert!(TaskGraph::try_from(input).is_err());
}
