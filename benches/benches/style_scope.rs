// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `understory_style_scope` frame lookups and activations.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use understory_style_scope::{
    ScopeHandle, ScopeTree, StyleScopeData, StyleScopeFrame, StyleSheetCache,
    calculate_activations,
};

/// A single chain `0 <- 1 <- ... <- depth - 1`, every element a `div.card`.
struct Chain {
    data: Vec<Option<StyleScopeData>>,
}

impl ScopeTree for Chain {
    type Element = usize;

    fn parent_or_shadow_host(&self, element: usize) -> Option<usize> {
        element.checked_sub(1)
    }

    fn style_scope_data(&self, element: usize) -> Option<&StyleScopeData> {
        self.data[element].as_ref()
    }

    fn local_name(&self, _: usize) -> &str {
        "div"
    }

    fn id(&self, _: usize) -> Option<&str> {
        None
    }

    fn has_class(&self, _: usize, class: &str) -> bool {
        class == "card"
    }
}

/// A chain whose elements at `owners` each own the same implicit scope sheet.
fn chain(depth: usize, owners: &[usize], cache: &mut StyleSheetCache) -> (Chain, ScopeHandle) {
    let contents = cache.get_or_parse("@scope { p { color: green } }");
    let mut data: Vec<Option<StyleScopeData>> = (0..depth).map(|_| None).collect();
    for &owner in owners {
        data[owner]
            .get_or_insert_with(StyleScopeData::new)
            .attach_sheet(&contents);
    }
    let scope = contents
        .implicit_scopes()
        .next()
        .expect("sheet has an implicit scope");
    (Chain { data }, scope)
}

/// Visits the chain depth-first with a frame per element, calling `f` at the
/// leaf.
fn recalc<R>(
    tree: &Chain,
    element: usize,
    parent: Option<&StyleScopeFrame<'_, usize>>,
    f: &mut impl FnMut(&StyleScopeFrame<'_, usize>) -> R,
) -> R {
    let frame = StyleScopeFrame::new(element, parent);
    if element + 1 == tree.data.len() {
        f(&frame)
    } else {
        recalc(tree, element + 1, Some(&frame), f)
    }
}

fn bench_seen_scopes(c: &mut Criterion) {
    let mut cache = StyleSheetCache::new();
    let mut group = c.benchmark_group("style_scope/has_seen_implicit_scope");
    for depth in [8_usize, 64, 256] {
        let (tree, scope) = chain(depth, &[1], &mut cache);

        group.bench_with_input(BenchmarkId::new("frame_stack", depth), &depth, |b, _| {
            b.iter(|| {
                recalc(&tree, 0, None, &mut |frame| {
                    black_box(frame.has_seen_implicit_scope(&tree, &scope))
                })
            });
        });

        group.bench_with_input(BenchmarkId::new("ancestor_walk", depth), &depth, |b, _| {
            b.iter(|| {
                let frame = StyleScopeFrame::new(depth - 1, None);
                black_box(frame.has_seen_implicit_scope(&tree, &scope))
            });
        });
    }
    group.finish();
}

fn bench_activations(c: &mut Criterion) {
    let mut cache = StyleSheetCache::new();
    let contents = cache.get_or_parse("@scope (.card) to (.content) { p { margin: 0 } }");
    let scope = contents.all_scopes().next().expect("sheet has a scope");

    let mut group = c.benchmark_group("style_scope/calculate_activations");
    for depth in [8_usize, 64] {
        let (tree, _) = chain(depth, &[], &mut cache);

        group.bench_with_input(BenchmarkId::new("with_frames", depth), &depth, |b, _| {
            b.iter(|| {
                recalc(&tree, 0, None, &mut |frame| {
                    black_box(calculate_activations(&tree, frame.element(), &scope, Some(frame)))
                })
            });
        });

        group.bench_with_input(BenchmarkId::new("uncached", depth), &depth, |b, _| {
            b.iter(|| black_box(calculate_activations(&tree, depth - 1, &scope, None)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_seen_scopes, bench_activations);
criterion_main!(benches);
