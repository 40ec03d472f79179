use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::Value;
use spanson::{parse_object_into, Entity, NoopBuilder};

fn make_large(json: &str) -> String {
    let mut large = String::from("{");
    for i in 0..10000 {
        if large.len() > 1 {
            large.push(',');
        }
        large.push_str(&format!(r#""{}":"#, i));
        large.push_str(json);
    }
    large.push('}');
    large
}

const RECORD: &str = r#"{"first_name":"Elvis","last_name":"Presley","age":42,"alive":false,"albums":["Elvis Presley","Elvis","His Hand in Mine"],"address":{"street":"Graceland","city":"Memphis"}}"#;

/// Syntax-only validation with the no-op builder (nothing is allocated)
fn validate_large(c: &mut Criterion) {
    let json = make_large(RECORD);
    c.bench_function("validate_large", |b| {
        b.iter(|| {
            parse_object_into(&mut NoopBuilder, &json, &mut (), 0).unwrap();
        })
    });
}

/// Decoding into the owned entity tree
fn entity_large(c: &mut Criterion) {
    let json = make_large(RECORD);
    c.bench_function("entity_large", |b| {
        b.iter(|| Entity::decode(&json).unwrap())
    });
}

/// Serde JSON as a baseline
fn serde_large(c: &mut Criterion) {
    let json = make_large(RECORD);
    c.bench_function("serde_large", |b| {
        b.iter(|| serde_json::from_str::<Value>(&json).unwrap())
    });
}

/// Re-encoding a decoded tree
fn encode_large(c: &mut Criterion) {
    let json = make_large(RECORD);
    let tree = Entity::decode(&json).unwrap();
    c.bench_function("encode_large", |b| b.iter(|| tree.encode()));
}

criterion_group!(benches, validate_large, entity_large, serde_large, encode_large);
criterion_main!(benches);
