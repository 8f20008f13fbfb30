use criterion::{black_box, criterion_group, criterion_main, Criterion};
use vitals_triage::dataset;
use vitals_triage::diagnosis::{PatientObservation, RiskScorer};

fn bench_score(c: &mut Criterion) {
    let scorer = RiskScorer::new();
    let observation = PatientObservation {
        age: 65.0,
        temperature: 101.0,
        heart_rate: 104.0,
        spo2: 94.0,
        cough: true,
        fever: true,
        breathing_issue: false,
    };

    c.bench_function("score_single", |b| {
        b.iter(|| scorer.score(black_box(&observation)))
    });

    let records = dataset::generate(500, 42);
    c.bench_function("evaluate_500", |b| {
        b.iter(|| dataset::evaluate(black_box(&records), &scorer))
    });
}

criterion_group!(benches, bench_score);
criterion_main!(benches);
