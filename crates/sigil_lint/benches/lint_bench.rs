//! Benchmark for the sigil_lint analyzer.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use sigil_lint::{apply_fixes, Linter};

fn bench_lint_component(c: &mut Criterion) {
    let source = r#"
import { signal, computed, effect } from '@preact/signals';

const countSignal = signal(0);
const doubledSignal = computed(() => countSignal.value * 2);

effect(() => {
    console.log(countSignal.value, doubledSignal.value);
});

function Counter() {
    return <div class="counter">
        <span>{countSignal.value}</span>
        <span>{doubledSignal}</span>
        <button onClick={() => countSignal.value++}>+</button>
    </div>;
}
"#;

    let linter = Linter::new();

    let mut group = c.benchmark_group("component");
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("lint_small", |b| {
        b.iter(|| linter.lint_source(black_box(source), "counter.jsx"))
    });

    group.finish();
}

fn bench_lint_large_component(c: &mut Criterion) {
    // Generate a larger file with many handles and components
    let mut source = String::from("import { signal, effect } from '@preact/signals';\n");
    for i in 0..100 {
        source.push_str(&format!(
            "const s{i}Signal = signal({i});\n\
             effect(() => {{ console.log(s{i}Signal.value); }});\n\
             function Widget{i}() {{\n\
               return <div title={{s{i}Signal.value}}>\n\
                 <span>{{s{i}Signal}}</span>\n\
                 <button onClick={{() => {{ s{i}Signal.value = {i}; }}}}>go</button>\n\
               </div>;\n\
             }}\n",
        ));
    }

    let linter = Linter::new();

    let mut group = c.benchmark_group("component");
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("lint_large", |b| {
        b.iter(|| linter.lint_source(black_box(&source), "widgets.jsx"))
    });

    group.finish();
}

fn bench_fix_pass(c: &mut Criterion) {
    let mut source = String::from("import { signal, effect } from 'signals';\n");
    for i in 0..50 {
        source.push_str(&format!(
            "const v{i}Signal = signal(0);\n\
             effect(() => {{ console.log(v{i}Signal.value); }});\n",
        ));
    }

    let linter = Linter::new();
    let result = linter.lint_source(&source, "effects.jsx").unwrap();

    let mut group = c.benchmark_group("fixer");
    group.throughput(Throughput::Bytes(source.len() as u64));

    group.bench_function("apply_fixes", |b| {
        b.iter(|| apply_fixes(black_box(&source), black_box(&result.diagnostics)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_lint_component,
    bench_lint_large_component,
    bench_fix_pass
);
criterion_main!(benches);
