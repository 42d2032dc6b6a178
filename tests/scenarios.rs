//! Behavioral properties of the full pipeline: determinism, bounds, idempotence.

use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;

use zenkmeans::convergence::IterationState;
use zenkmeans::{Color, Colorspace, KMeansConfig, Observer, Termination};

const RED: rgb::RGB<u8> = rgb::RGB { r: 255, g: 0, b: 0 };
const BLUE: rgb::RGB<u8> = rgb::RGB { r: 0, g: 0, b: 255 };

fn noisy_image(width: usize, height: usize) -> Vec<rgb::RGB<u8>> {
    // Pseudo-random noise via simple hash
    let mut pixels = Vec::with_capacity(width * height);
    for i in 0..(width * height) {
        let h = (i as u32).wrapping_mul(2654435761); // Knuth's multiplicative hash
        pixels.push(rgb::RGB {
            r: (h >> 24) as u8,
            g: (h >> 16) as u8,
            b: (h >> 8) as u8,
        });
    }
    pixels
}

fn distinct(pixels: &[rgb::RGB<u8>]) -> BTreeSet<[u8; 3]> {
    pixels.iter().map(|p| [p.r, p.g, p.b]).collect()
}

#[derive(Default)]
struct Progress {
    lines: Vec<(u32, f64)>,
}

impl Observer for Progress {
    fn iteration(&mut self, state: &IterationState) {
        self.lines.push((state.iteration, state.rmse));
    }
}

#[test]
fn red_blue_scenario_stops_after_first_iteration() {
    let pixels = vec![RED, RED, BLUE, BLUE];
    let config = KMeansConfig::new().numcolors(2).seed_colors("red blue");
    let mut progress = Progress::default();

    let result = zenkmeans::segment_with(&pixels, 2, 2, &config, &mut progress, None).unwrap();

    assert_eq!(progress.lines, vec![(1, 0.0)]);
    assert_eq!(result.iterations(), 1);
    assert_eq!(result.rmse(), 0.0);
    assert_eq!(result.termination(), Termination::Converged);
    assert_eq!(result.cluster_counts(), &[2, 2]);
    assert_eq!(result.pixels(), &pixels[..]);
}

#[test]
fn single_color_image_keeps_its_color() {
    let gray = rgb::RGB {
        r: 90,
        g: 120,
        b: 30,
    };
    let pixels = vec![gray; 25];
    let config = KMeansConfig::new().numcolors(3);
    let result = zenkmeans::segment(&pixels, 5, 5, &config).unwrap();

    assert!(result.k() >= 2);
    let nonempty = result.cluster_counts().iter().filter(|&&c| c > 0).count();
    assert_eq!(nonempty, 1);
    assert!(result.pixels().iter().all(|&p| p == gray));
}

#[test]
fn single_color_image_with_explicit_seeds() {
    let pixels = vec![RED; 16];
    let config = KMeansConfig::new().seed_colors("red green blue");
    let result = zenkmeans::segment(&pixels, 4, 4, &config).unwrap();

    assert_eq!(result.cluster_counts(), &[16, 0, 0]);
    // Empty clusters keep their seeds
    assert_eq!(result.clusters()[1], Color::new(0.0, 128.0 / 255.0, 0.0));
    assert_eq!(result.clusters()[2], Color::new(0.0, 0.0, 1.0));
    assert!(result.pixels().iter().all(|&p| p == RED));
}

#[test]
fn output_has_at_most_k_colors() {
    let pixels = noisy_image(40, 30);
    for cs in Colorspace::ALL {
        for k in [2, 3, 7, 12] {
            let config = KMeansConfig::new().numcolors(k).colorspace(cs);
            let result = zenkmeans::segment(&pixels, 40, 30, &config).unwrap();
            assert!(
                distinct(result.pixels()).len() <= k,
                "{cs} k={k}: {} colors",
                distinct(result.pixels()).len()
            );
        }
    }
}

#[test]
fn terminates_within_maxiters() {
    let pixels = noisy_image(32, 32);
    for cap in [1, 2, 5] {
        let config = KMeansConfig::new()
            .numcolors(8)
            .max_iters(cap)
            .convergence(0.0);
        let mut progress = Progress::default();
        let result = zenkmeans::segment_with(&pixels, 32, 32, &config, &mut progress, None).unwrap();
        assert!(result.iterations() <= cap);
        assert_eq!(progress.lines.len(), result.iterations() as usize);
        if result.termination() == Termination::MaxItersReached {
            assert_eq!(result.iterations(), cap);
        }
    }
}

#[test]
fn zero_convergence_runs_until_fixed_point_or_cap() {
    let pixels = noisy_image(24, 24);
    let config = KMeansConfig::new()
        .numcolors(4)
        .max_iters(200)
        .convergence(0.0);
    let mut progress = Progress::default();
    let result = zenkmeans::segment_with(&pixels, 24, 24, &config, &mut progress, None).unwrap();

    match result.termination() {
        // Only a fixed point stops the loop at threshold 0
        Termination::Converged => assert_eq!(result.rmse(), 0.0),
        Termination::MaxItersReached => assert_eq!(result.iterations(), 200),
        Termination::Cancelled => panic!("not cancelled"),
    }
    let (last, earlier) = progress.lines.split_last().unwrap();
    assert_eq!(last.0, result.iterations());
    assert!(earlier.iter().all(|&(_, rmse)| rmse > 0.0));
}

#[test]
fn zero_convergence_stops_when_colors_stop_changing() {
    let pixels = vec![RED, RED, BLUE, BLUE];
    let config = KMeansConfig::new()
        .seed_colors("red blue")
        .convergence(0.0);
    let result = zenkmeans::segment(&pixels, 2, 2, &config).unwrap();

    assert_eq!(result.termination(), Termination::Converged);
    assert_eq!(result.iterations(), 1);
    assert_eq!(result.rmse(), 0.0);
}

#[test]
fn deterministic_across_runs() {
    let pixels = noisy_image(50, 40);
    let config = KMeansConfig::new().numcolors(6).colorspace(Colorspace::OkLab);
    let a = zenkmeans::segment(&pixels, 50, 40, &config).unwrap();
    let b = zenkmeans::segment(&pixels, 50, 40, &config).unwrap();
    assert_eq!(a.clusters(), b.clusters());
    assert_eq!(a.pixels(), b.pixels());
    assert_eq!(a.iterations(), b.iterations());
}

#[test]
fn rerun_on_output_is_idempotent() {
    let pixels = noisy_image(30, 30);
    for cs in Colorspace::ALL {
        let config = KMeansConfig::new().numcolors(5).colorspace(cs);
        let first = zenkmeans::segment(&pixels, 30, 30, &config).unwrap();

        let mut seen = BTreeSet::new();
        let seeds: Vec<String> = first
            .pixels()
            .iter()
            .filter(|p| seen.insert([p.r, p.g, p.b]))
            .map(|p| format!("#{:02x}{:02x}{:02x}", p.r, p.g, p.b))
            .collect();
        assert!(seeds.len() >= 2, "{cs}");

        let again = KMeansConfig::new().seed_color_list(seeds).colorspace(cs);
        let mut progress = Progress::default();
        let second =
            zenkmeans::segment_with(first.pixels(), 30, 30, &again, &mut progress, None).unwrap();

        assert_eq!(progress.lines, vec![(1, 0.0)], "{cs}");
        assert_eq!(second.termination(), Termination::Converged, "{cs}");
        assert_eq!(second.pixels(), first.pixels(), "{cs}");
    }
}

#[test]
fn result_does_not_depend_on_thread_count() {
    // Larger than one parallel partition so the reduction spans several chunks
    let (width, height) = (200, 150);
    let pixels = noisy_image(width, height);
    let config = KMeansConfig::new().numcolors(6).colorspace(Colorspace::Lab);

    let run_on = |threads: usize| {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();
        pool.install(|| zenkmeans::segment(&pixels, width, height, &config).unwrap())
    };
    let single = run_on(1);
    let multi = run_on(4);

    let bits = |r: &zenkmeans::SegmentResult| -> Vec<[u32; 3]> {
        r.clusters()
            .iter()
            .map(|c| c.channels.map(f32::to_bits))
            .collect()
    };
    assert_eq!(bits(&single), bits(&multi));
    assert_eq!(single.cluster_counts(), multi.cluster_counts());
    assert_eq!(single.iterations(), multi.iterations());
    assert_eq!(single.pixels(), multi.pixels());
}

#[test]
fn equidistant_pixel_goes_to_lower_index() {
    // Black is exactly as far from red as from lime
    let black = rgb::RGB { r: 0, g: 0, b: 0 };
    let lime = rgb::RGB { r: 0, g: 255, b: 0 };
    let pixels = vec![black, black, RED, lime];

    let config = KMeansConfig::new().seed_colors("red lime").max_iters(1);
    for _ in 0..5 {
        let result = zenkmeans::segment(&pixels, 2, 2, &config).unwrap();
        assert_eq!(result.cluster_counts(), &[3, 1]);
    }

    let swapped = KMeansConfig::new().seed_colors("lime red").max_iters(1);
    let result = zenkmeans::segment(&pixels, 2, 2, &swapped).unwrap();
    assert_eq!(result.cluster_counts(), &[3, 1]);
}

#[test]
fn cancellation_renders_last_assignment() {
    let pixels = noisy_image(20, 20);
    let flag = AtomicBool::new(true);
    let config = KMeansConfig::new().seed_colors("black white");
    let result = zenkmeans::segment_with(&pixels, 20, 20, &config, &mut (), Some(&flag)).unwrap();

    assert_eq!(result.termination(), Termination::Cancelled);
    assert_eq!(result.iterations(), 0);
    assert_eq!(result.cluster_counts().iter().sum::<u64>(), 400);
    assert!(
        result
            .pixels()
            .iter()
            .all(|p| [p.r, p.g, p.b] == [0, 0, 0] || [p.r, p.g, p.b] == [255, 255, 255])
    );
}
