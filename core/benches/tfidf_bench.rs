use criterion::{criterion_group, criterion_main, Criterion};
use recsys_core::{content, Catalog, CatalogSnapshot, Category, Product};

fn catalog(n: u32) -> Catalog {
    let words = ["red", "blue", "shoes", "shirt", "cotton", "leather", "sport", "office", "summer", "winter"];
    let products = (0..n)
        .map(|i| Product {
            id: i,
            name: format!("{} {}", words[(i % 10) as usize], words[((i / 10) % 10) as usize]),
            description: format!("{} {} size {}", words[((i * 7) % 10) as usize], words[((i * 3) % 10) as usize], i),
            image: None,
            keywords: vec![],
        })
        .collect();
    Catalog { categories: vec![Category { name: "apparel".into(), products }] }
}

fn bench_vectorize(c: &mut Criterion) {
    let cat = catalog(1_000);
    c.bench_function("vectorize_1k", |b| b.iter(|| CatalogSnapshot::build(cat.clone())));
    let snapshot = CatalogSnapshot::build(cat);
    c.bench_function("content_recommend_1k", |b| b.iter(|| content::recommend(&snapshot, &[1, 2, 3], 10)));
}

criterion_group!(benches, bench_vectorize);
criterion_main!(benches);
