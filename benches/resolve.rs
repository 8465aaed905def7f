use actionroute::config::{parse_packages, ConfigFormat};
use actionroute::registry::ConfigurationRegistry;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn example_config() -> String {
    let mut yaml = String::from(
        r#"packages:
  - name: base
    abstract: true
    result-types:
      - { name: dispatcher, class: DispatcherResult }
    interceptors:
      - { name: timer, class: TimerInterceptor }
      - { name: params, class: ParamsInterceptor }
    interceptor-stacks:
      - { name: defaultStack, interceptor-refs: [timer, params] }
    default-result-type: dispatcher
    default-interceptor-ref: defaultStack
  - name: root
    extends: base
    actions:
      - { name: home, class: Home, results: [ {} ] }
  - name: any
    extends: base
    namespace: "/*"
    actions:
      - { name: "edit_*", class: "{1}Editor", results: [ {} ] }
      - { name: "view_*_*", class: Viewer, results: [ {} ] }
"#,
    );
    for i in 0..50 {
        yaml.push_str(&format!(
            r#"  - name: module{i}
    extends: base
    namespace: /module{i}
    default-action-ref: index
    actions:
      - {{ name: index, class: Index{i}, results: [ {{}} ] }}
      - {{ name: list, class: List{i}, results: [ {{}} ] }}
      - {{ name: "item_*", class: Item{i}, results: [ {{}} ] }}
"#
        ));
    }
    yaml
}

fn registry() -> ConfigurationRegistry {
    let packages = parse_packages(&example_config(), ConfigFormat::Yaml, "bench").unwrap();
    let registry = ConfigurationRegistry::default();
    registry.rebuild(packages).unwrap();
    registry
}

fn bench_resolve(c: &mut Criterion) {
    let registry = registry();
    let requests = [
        ("/module7", "list"),
        ("/module42", "item_17"),
        ("/module3", "missing"),
        ("/users", "edit_profile"),
        ("/users", "view_a_b"),
        ("/nowhere", "home"),
    ];

    c.bench_function("resolve_mixed", |b| {
        b.iter(|| {
            for (namespace, name) in &requests {
                black_box(registry.resolve(black_box(namespace), black_box(name)));
            }
        })
    });

    c.bench_function("resolve_exact", |b| {
        b.iter(|| black_box(registry.resolve(black_box("/module7"), black_box("list"))))
    });

    c.bench_function("resolve_wildcard", |b| {
        b.iter(|| black_box(registry.resolve(black_box("/users"), black_box("edit_profile"))))
    });
}

fn bench_rebuild(c: &mut Criterion) {
    let packages = parse_packages(&example_config(), ConfigFormat::Yaml, "bench").unwrap();
    let registry = ConfigurationRegistry::default();

    c.bench_function("rebuild_52_packages", |b| {
        b.iter(|| black_box(registry.rebuild(packages.clone()).unwrap()))
    });
}

criterion_group!(benches, bench_resolve, bench_rebuild);
criterion_main!(benches);
