use std::collections::HashMap;

use ckg_core::config::SourceWeights;
use ckg_core::models::Insight;
use ckg_retrieval::rrf;
use criterion::{criterion_group, criterion_main, Criterion};

fn make_insights(n: usize) -> HashMap<String, Insight> {
    let mut map = HashMap::new();
    for i in 0..n {
        let mut insight = Insight::new(format!("benchmark insight number {i}"), vec![]);
        insight.id = format!("insight-{i}");
        map.insert(insight.id.clone(), insight);
    }
    map
}

fn bench_rrf_fusion(c: &mut Criterion, n: usize, label: &str) {
    let insights = make_insights(n);
    let semantic: Vec<(String, usize)> = (0..n).map(|i| (format!("insight-{i}"), i)).collect();
    let lexical: Vec<(String, usize)> = (0..n).rev().map(|i| (format!("insight-{i}"), n - 1 - i)).collect();
    let weights = SourceWeights { semantic: 0.6, lexical: 0.2, graph: 0.2 };

    c.bench_function(label, |b| {
        b.iter(|| rrf::fuse(Some(&semantic), Some(&lexical), None, &insights, weights, 60));
    });
}

fn rrf_fusion_100(c: &mut Criterion) {
    bench_rrf_fusion(c, 100, "rrf_fusion_100");
}

fn rrf_fusion_10k(c: &mut Criterion) {
    bench_rrf_fusion(c, 10_000, "rrf_fusion_10k");
}

criterion_group!(benches, rrf_fusion_100, rrf_fusion_10k);
criterion_main!(benches);
