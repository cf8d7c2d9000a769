use agent_test_runner::accumulator::ResultAccumulator;
use agent_test_runner::models::{Step, StepStatus, TestCase};
use agent_test_runner::{generate_markdown_summary, generate_report};
use chrono::{Duration, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn sample_accumulator(cases: usize, steps: usize) -> ResultAccumulator {
    let mut acc = ResultAccumulator::new();
    let start = Utc::now();
    for c in 0..cases {
        let steps = (0..steps)
            .map(|s| {
                let mut step = Step::new(s.to_string(), format!("Step {s} of case {c}"));
                step.status = if (c + s) % 7 == 0 {
                    step.error = Some("element not found".into());
                    StepStatus::Failed
                } else {
                    StepStatus::Passed
                };
                step
            })
            .collect();
        let case = TestCase::new(format!("case-{c}"), format!("Generated case {c}"), steps);
        acc.record(case, start, start + Duration::milliseconds(1500));
    }
    acc
}

fn bench_reports(c: &mut Criterion) {
    let acc = sample_accumulator(200, 10);

    c.bench_function("generate_report", |b| {
        b.iter(|| generate_report(black_box(&acc)));
    });
    c.bench_function("generate_markdown_summary", |b| {
        b.iter(|| generate_markdown_summary(black_box(&acc)));
    });
}

criterion_group!(benches, bench_reports);
criterion_main!(benches);
