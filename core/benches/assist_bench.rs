use criterion::{Criterion, criterion_group, criterion_main};
use rfx_core::assist::{AssistContext, CyclingAggregator, PositionLocator, compute_proposals};
use rfx_core::model::SuiteDocument;
use rfx_core::validation::validate_document;
use rfx_core::version::RobotVersion;
use std::hint::black_box;

/// A suite with `cases` test cases and as many keywords, each a few rows long.
fn generated_suite(cases: usize) -> SuiteDocument {
    let mut text = String::from("*** Settings ***\nLibrary    Collections\nResource    common.robot\n\n");
    text.push_str("*** Variables ***\n");
    for i in 0..cases {
        text.push_str(&format!("${{value_{i}}}    {i}\n"));
    }
    text.push_str("\n*** Test Cases ***\n");
    for i in 0..cases {
        text.push_str(&format!("Case {i}\n    [Tags]    generated\n    Step {i}    ${{value_{i}}}\n    Log    done\n"));
    }
    text.push_str("\n*** Keywords ***\n");
    for i in 0..cases {
        text.push_str(&format!("Step {i}\n    [Arguments]    ${{arg}}\n    Log    ${{arg}}\n"));
    }
    text.push_str("Last\n    Lo");
    SuiteDocument::new("suite.robot", text)
}

fn assist_bench(c: &mut Criterion) {
    let document = generated_suite(200);
    let context = AssistContext::standalone();
    let end = document.text.len();

    c.bench_function("parse_suite_200", |b| {
        b.iter(|| black_box(SuiteDocument::new("suite.robot", document.text.clone())))
    });

    c.bench_function("locate_every_offset", |b| {
        b.iter(|| {
            for offset in (0..end).step_by(97) {
                black_box(PositionLocator::locate(&document, offset));
            }
        })
    });

    c.bench_function("aggregate_keyword_call", |b| {
        b.iter(|| black_box(compute_proposals(&document, end, &context)))
    });

    c.bench_function("cycle_three_groups", |b| {
        b.iter(|| {
            let mut cycling = CyclingAggregator::default();
            for _ in 0..3 {
                black_box(cycling.compute(&document, end, &context));
            }
        })
    });

    c.bench_function("validate_suite_200", |b| {
        b.iter(|| black_box(validate_document(&document, RobotVersion::new(7, 0))))
    });
}

criterion_group!(benches, assist_bench);
criterion_main!(benches);
