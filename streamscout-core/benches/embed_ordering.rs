use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use streamscout_core::provider::{EmbedDescriptor, ScraperKind, ScraperMeta};
use streamscout_core::resolver::resolution_order;

fn embeds(count: usize) -> Vec<EmbedDescriptor> {
    (0..count)
        .map(|i| EmbedDescriptor {
            embed_id: format!("embed-{i}"),
            url: format!("https://embed.example.com/{i}"),
        })
        .collect()
}

fn metas(count: usize) -> Vec<ScraperMeta> {
    // Every third embed is unranked.
    (0..count)
        .filter(|i| i % 3 != 0)
        .map(|i| ScraperMeta {
            id: format!("embed-{i}"),
            name: format!("Embed {i}"),
            rank: ((i * 7919) % 500) as i64,
            kind: ScraperKind::Embed,
            media_types: None,
        })
        .collect()
}

fn bench_resolution_order(c: &mut Criterion) {
    let input = embeds(64);
    let ranks = metas(64);

    c.bench_function("resolution_order_64_embeds", |b| {
        b.iter(|| resolution_order(black_box(input.clone()), black_box(&ranks)));
    });
}

criterion_group!(benches, bench_resolution_order);
criterion_main!(benches);
