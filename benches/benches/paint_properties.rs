// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `understory_paint_property` dense vs sparse storage.

use std::rc::Rc;
use std::sync::Once;

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use understory_paint_property::{
    AnimationState, DenseStorage, EffectPaintPropertyNode, EffectSlot, EffectState,
    ObjectPaintProperties, PaintPropertyStorage, SparseStorage, TransformAndOrigin,
    TransformPaintPropertyNode, TransformSlot, TransformState,
};
use understory_sparse_vec::{FieldId, SparseVector};

struct Roots {
    transform: Rc<TransformPaintPropertyNode>,
    effect: Rc<EffectPaintPropertyNode>,
}

impl Roots {
    fn new() -> Self {
        Self {
            transform: TransformPaintPropertyNode::root(TransformState::default()),
            effect: EffectPaintPropertyNode::root(EffectState::default()),
        }
    }
}

/// The common case: a paint offset translation and nothing else.
fn populate_typical<B: PaintPropertyStorage>(
    properties: &mut ObjectPaintProperties<B>,
    roots: &Roots,
    x: f64,
) {
    let state = TransformState::new(TransformAndOrigin::translation(x, 0.0));
    properties
        .update_transform(
            TransformSlot::PaintOffsetTranslation,
            &roots.transform,
            state,
            AnimationState::empty(),
        )
        .expect("mutable object");
}

/// A heavily decorated object: transforms plus an opacity effect.
fn populate_heavy<B: PaintPropertyStorage>(
    properties: &mut ObjectPaintProperties<B>,
    roots: &Roots,
    x: f64,
) {
    populate_typical(properties, roots, x);
    for slot in [
        TransformSlot::Translate,
        TransformSlot::Rotate,
        TransformSlot::Scale,
        TransformSlot::Transform,
    ] {
        let state = TransformState::new(TransformAndOrigin::translation(0.0, x));
        properties
            .update_transform(slot, &roots.transform, state, AnimationState::empty())
            .expect("mutable object");
    }
    properties
        .update_effect(
            EffectSlot::Effect,
            &roots.effect,
            EffectState::with_opacity(0.5),
            AnimationState::empty(),
        )
        .expect("mutable object");
}

fn bench_backend<B: PaintPropertyStorage>(c: &mut Criterion, name: &str) {
    let roots = Roots::new();
    let mut group = c.benchmark_group(format!("paint_properties/{name}"));

    group.bench_function("create_typical", |b| {
        b.iter(|| {
            let mut properties = ObjectPaintProperties::<B>::default();
            populate_typical(&mut properties, &roots, 1.0);
            black_box(properties)
        });
    });

    group.bench_function("create_heavy", |b| {
        b.iter(|| {
            let mut properties = ObjectPaintProperties::<B>::default();
            populate_heavy(&mut properties, &roots, 1.0);
            black_box(properties)
        });
    });

    group.bench_function("update_value", |b| {
        let mut properties = ObjectPaintProperties::<B>::default();
        populate_heavy(&mut properties, &roots, 0.0);
        let mut x = 0.0;
        b.iter(|| {
            x += 1.0;
            populate_typical(&mut properties, &roots, x);
        });
    });

    group.bench_function("lookup", |b| {
        let mut properties = ObjectPaintProperties::<B>::default();
        populate_heavy(&mut properties, &roots, 0.0);
        b.iter(|| {
            black_box(properties.transform(TransformSlot::Scale).is_some());
            black_box(properties.effect(EffectSlot::Effect).is_some());
            black_box(properties.has_clip_node());
        });
    });

    group.bench_function("clear_all", |b| {
        b.iter_batched(
            || {
                let mut properties = ObjectPaintProperties::<B>::default();
                populate_heavy(&mut properties, &roots, 0.0);
                properties
            },
            |mut properties| {
                for slot in [
                    TransformSlot::PaintOffsetTranslation,
                    TransformSlot::Translate,
                    TransformSlot::Rotate,
                    TransformSlot::Scale,
                    TransformSlot::Transform,
                ] {
                    black_box(properties.clear_transform(slot).expect("mutable object"));
                }
                black_box(properties.clear_effect(EffectSlot::Effect).expect("mutable object"));
                properties
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn bench_paint_properties(c: &mut Criterion) {
    static PRINT_SIZES: Once = Once::new();
    PRINT_SIZES.call_once(|| {
        eprintln!(
            "sizes: dense={} sparse={}",
            size_of::<ObjectPaintProperties<DenseStorage>>(),
            size_of::<ObjectPaintProperties<SparseStorage>>(),
        );
    });

    bench_backend::<DenseStorage>(c, "dense");
    bench_backend::<SparseStorage>(c, "sparse");
}

#[derive(Copy, Clone)]
struct Field(usize);

impl FieldId for Field {
    const NUM_FIELDS: usize = 32;

    fn index(self) -> usize {
        self.0
    }
}

fn bench_sparse_vector(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_vector");
    for populated in [1_usize, 4, 16, 32] {
        let mut fields = SparseVector::<Field, u64>::new();
        for i in 0..populated {
            fields.set_field(Field(i * 32 / populated), i as u64);
        }
        group.bench_with_input(BenchmarkId::new("field", populated), &fields, |b, fields| {
            b.iter(|| black_box(fields.field(Field(31))));
        });
        group.bench_with_input(BenchmarkId::new("set_clear", populated), &populated, |b, _| {
            b.iter_batched(
                || fields.clone(),
                |mut fields| {
                    fields.set_field(Field(7), 7);
                    black_box(fields.clear_field(Field(0)))
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_paint_properties, bench_sparse_vector);
criterion_main!(benches);
