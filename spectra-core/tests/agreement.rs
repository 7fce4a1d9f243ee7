//! Cross-checks of the three back-ends against the direct DFT and each other.

use std::thread;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use spectra_core::collective::{Collective, channel_group};
use spectra_core::distributed::run_rank;
use spectra_core::signal::{constant, impulse, random, sine_wave};
use spectra_core::{
    Backend, ComplexSample, DistributedFft, FftConfig, FftEngine, FftError, SequentialFft,
    SpectrumBuffer, TaskParallelFft, direct_dft, partition, planned_fft,
};

const SIZES: [usize; 7] = [1, 2, 4, 8, 16, 64, 256];

fn tolerance(n: usize) -> f64 {
    1e-9 * n.max(1) as f64
}

fn engines() -> Vec<Box<dyn FftEngine>> {
    vec![
        Box::new(SequentialFft::new()),
        Box::new(TaskParallelFft::new(2)),
        Box::new(DistributedFft::new(3)),
    ]
}

fn assert_close(got: &SpectrumBuffer, expected: &SpectrumBuffer, n: usize, what: &str) {
    let diff = got
        .max_abs_diff(expected)
        .unwrap_or_else(|| panic!("{what}: length {} vs {}", got.len(), expected.len()));
    assert!(diff <= tolerance(n), "{what}: deviation {diff:e} for n = {n}");
}

#[test]
fn every_backend_agrees_with_direct_dft() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for n in SIZES {
        let x = random(n, &mut rng);
        let expected = direct_dft(&x);
        for engine in engines() {
            let got = engine.transform(&x).unwrap();
            assert_close(&got, &expected, n, engine.name());
        }
    }
}

#[test]
fn sequential_and_task_parallel_are_bit_identical() {
    let mut rng = StdRng::seed_from_u64(11);
    let x = random(1024, &mut rng);
    let sequential = SequentialFft::new().transform(&x).unwrap();
    for threshold in [0, 1, 4, 64, 512, 4096] {
        let parallel = TaskParallelFft::new(threshold).transform(&x).unwrap();
        assert_eq!(parallel, sequential, "threshold = {threshold}");
    }
}

#[test]
fn distributed_is_bit_identical_to_direct_dft() {
    let mut rng = StdRng::seed_from_u64(12);
    let x = random(64, &mut rng);
    assert_eq!(DistributedFft::new(5).transform(&x).unwrap(), direct_dft(&x));
}

#[test]
fn matches_rustfft_reference() {
    let mut rng = StdRng::seed_from_u64(13);
    let x = random(512, &mut rng);
    let reference = planned_fft(&x);
    let got = TaskParallelFft::new(16).transform(&x).unwrap();
    assert_close(&got, &reference, 512, "task-parallel vs rustfft");
}

#[test]
fn transform_is_linear() {
    let mut rng = StdRng::seed_from_u64(21);
    let n = 64;
    let x = random(n, &mut rng);
    let y = random(n, &mut rng);
    let a = ComplexSample::new(0.5, -1.5);
    let b = ComplexSample::new(-2.0, 0.25);

    let mixed = x.scale(a).add(&y.scale(b)).unwrap();
    for engine in engines() {
        let lhs = engine.transform(&mixed).unwrap();
        let rhs = engine
            .transform(&x)
            .unwrap()
            .scale(a)
            .add(&engine.transform(&y).unwrap().scale(b))
            .unwrap();
        assert_close(&lhs, &rhs, n, engine.name());
    }
}

#[test]
fn all_ones_concentrates_in_bin_zero() {
    for n in [4, 16, 128] {
        let x = constant(n, ComplexSample::new(1.0, 0.0));
        for engine in engines() {
            let spectrum = engine.transform(&x).unwrap();
            let mut expected = SpectrumBuffer::zeros(n).into_inner();
            expected[0] = ComplexSample::new(n as f64, 0.0);
            assert_close(&spectrum, &SpectrumBuffer::new(expected), n, engine.name());
        }
    }
}

#[test]
fn impulse_transforms_to_all_ones() {
    for n in [1, 8, 64] {
        let ones = constant(n, ComplexSample::new(1.0, 0.0));
        for engine in engines() {
            let spectrum = engine.transform(&impulse(n)).unwrap();
            assert_close(&spectrum, &ones, n, engine.name());
        }
    }
}

#[test]
fn sine_demo_energy_sits_in_bins_one_and_seven() {
    let x = sine_wave(8, 1.0);
    let oracle = direct_dft(&x);
    for engine in engines() {
        let spectrum = engine.transform(&x).unwrap();
        assert_close(&spectrum, &oracle, 8, engine.name());

        let magnitudes = spectrum.magnitudes();
        for (k, &m) in magnitudes.iter().enumerate() {
            if k == 1 || k == 7 {
                assert!((m - 4.0).abs() < 1e-9, "{}: bin {k} = {m}", engine.name());
            } else {
                assert!(m < 1e-9, "{}: bin {k} = {m}", engine.name());
            }
        }
        // sin = (e^{iθ} - e^{-iθ}) / 2i puts -4i in bin 1 and +4i in bin 7.
        assert!((spectrum[1].im + 4.0).abs() < 1e-9);
        assert!((spectrum[7].im - 4.0).abs() < 1e-9);
    }
}

#[test]
fn partition_covers_all_bins_exactly_once() {
    for n in 1..=64 {
        for workers in 1..=n {
            let slices = partition(n, workers).unwrap();
            assert_eq!(slices.len(), workers);
            assert_eq!(slices[0].start_bin, 0);
            for pair in slices.windows(2) {
                assert_eq!(pair[0].end_bin, pair[1].start_bin, "n = {n}, p = {workers}");
            }
            assert_eq!(slices[workers - 1].end_bin, n);
            for slice in &slices[..workers - 1] {
                assert_eq!(slice.len(), n / workers);
            }
        }
    }
}

#[test]
fn single_sample_is_returned_unchanged() {
    let x = SpectrumBuffer::new(vec![ComplexSample::new(-2.5, 0.75)]);
    for engine in engines() {
        assert_eq!(engine.transform(&x).unwrap(), x, "{}", engine.name());
    }
}

#[test]
fn one_worker_group_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(31);
    let x = random(128, &mut rng);
    let distributed = DistributedFft::new(1).transform(&x).unwrap();
    let sequential = SequentialFft::new().transform(&x).unwrap();
    assert_close(&distributed, &sequential, 128, "p = 1");
}

#[test]
fn invalid_lengths_fail_before_any_work() {
    for n in [0, 3, 12, 100] {
        for engine in engines() {
            let err = engine.transform(&SpectrumBuffer::zeros(n)).unwrap_err();
            assert!(
                matches!(err, FftError::InvalidInput(_)),
                "{}: n = {n} gave {err:?}",
                engine.name()
            );
        }
    }
}

#[test]
fn input_is_never_mutated() {
    let mut rng = StdRng::seed_from_u64(41);
    let x = random(32, &mut rng);
    let snapshot = x.clone();
    for engine in engines() {
        let _ = engine.transform(&x).unwrap();
        assert_eq!(x, snapshot, "{}", engine.name());
    }
}

#[test]
fn engines_can_be_shared_across_threads() {
    let config = FftConfig {
        parallel_threshold: 8,
        workers: 2,
        ..FftConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(51);
    let inputs: Vec<SpectrumBuffer> = (0..4).map(|_| random(64, &mut rng)).collect();

    for backend in Backend::ALL {
        let engine = backend.build(&config).unwrap();
        let engine = engine.as_ref();
        thread::scope(|s| {
            for x in &inputs {
                s.spawn(move || {
                    let got = engine.transform(x).unwrap();
                    assert_close(&got, &direct_dft(x), 64, engine.name());
                });
            }
        });
    }
}

#[test]
fn lost_worker_fails_the_whole_round() {
    let mut group = channel_group(3, Duration::from_secs(10)).unwrap();
    drop(group.pop());
    let x = sine_wave(8, 1.0);

    let (coordinator, worker) = thread::scope(|s| {
        let peer = &group[1];
        let worker = s.spawn(move || {
            run_rank(peer, None).inspect_err(|e| peer.abort(&e.to_string()))
        });
        let root = &group[0];
        let coordinator =
            run_rank(root, Some(x.as_slice())).inspect_err(|e| root.abort(&e.to_string()));
        (coordinator, worker.join().unwrap())
    });

    // Rank 1 already holds its copy of the input, but no spectrum comes back.
    assert!(matches!(
        coordinator,
        Err(FftError::CollectiveFailure { op: "broadcast", .. })
    ));
    assert!(matches!(worker, Err(FftError::CollectiveFailure { .. })));
}

#[test]
fn silent_worker_fails_every_rank() {
    let mut group = channel_group(3, Duration::from_millis(300)).unwrap();
    let silent = group.pop().unwrap();
    let x = sine_wave(8, 1.0);

    let (coordinator, worker) = thread::scope(|s| {
        // Rank 2 takes its copy of the input and leaves without contributing.
        s.spawn(move || silent.broadcast(0, None).map(drop));
        let peer = &group[1];
        let worker = s.spawn(move || {
            run_rank(peer, None).inspect_err(|e| peer.abort(&e.to_string()))
        });
        let root = &group[0];
        let coordinator =
            run_rank(root, Some(x.as_slice())).inspect_err(|e| root.abort(&e.to_string()));
        (coordinator, worker.join().unwrap())
    });

    assert!(matches!(
        coordinator,
        Err(FftError::CollectiveFailure { op: "gather", .. })
    ));
    assert!(worker.is_err(), "rank 1 reported {worker:?} for a failed round");
}

#[test]
fn non_finite_samples_propagate() {
    let mut samples = vec![ComplexSample::new(0.25, -0.5); 8];
    samples[0] = ComplexSample::new(f64::NAN, 0.0);
    samples[3] = ComplexSample::new(f64::INFINITY, 1.0);
    let x = SpectrumBuffer::new(samples);

    for engine in engines() {
        let spectrum = engine.transform(&x).unwrap();
        assert_eq!(spectrum.len(), 8);
        // x[0] enters every bin with weight one.
        assert!(
            spectrum.iter().all(|c| c.re.is_nan()),
            "{}: {spectrum:?}",
            engine.name()
        );
    }
}
