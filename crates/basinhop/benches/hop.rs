use basinhop::{HopBuilder, BASINHOP_LOG};
use criterion::{criterion_group, criterion_main, Criterion};
use env_logger::{Builder, Env};
use ndarray::{array, ArrayView1};

/// Ackley test function: min f(x)=0 at x=(0, 0, 0)
fn ackley(x: &ArrayView1<f64>) -> f64 {
    argmin_testfunctions::ackley(&x.to_vec())
}

fn criterion_hop(c: &mut Criterion) {
    let xlimits = array![[-32.768, 32.768], [-32.768, 32.768], [-32.768, 32.768]];
    let mut group = c.benchmark_group("hop");
    group.sample_size(20);
    group.bench_function("hop ackley", |b| {
        let env = Env::new().filter_or(BASINHOP_LOG, "error");
        let mut builder = Builder::from_env(env);
        let builder = builder.target(env_logger::Target::Stdout);
        builder.try_init().ok();

        b.iter(|| {
            std::hint::black_box(
                HopBuilder::optimize(ackley)
                    .configure(|config| {
                        config
                            .initial(&array![10., -10., 5.])
                            .step_noise(&array![2., 2., 2.])
                            .agreement_tol(1e-3)
                            .max_iters(50)
                            .seed(42)
                    })
                    .min_within(&xlimits)
                    .expect("Hop configured")
                    .run()
                    .expect("Minimization"),
            )
        });
    });

    group.finish();
}

criterion_group!(benches, criterion_hop);
criterion_main!(benches);
