use prompt_tags::catalog::{Source, TagCatalog, TagPath};
use prompt_tags::splice;
use prompt_tags::template::{Expander, RoundRobin};
use std::time::{Duration, Instant};

/// Performance benchmark suite for catalog loading and prompt splicing
///
/// Run with: cargo test --release --bench performance -- --nocapture
///
/// This measures:
/// - YAML parsing of tag files
/// - Flattening catalogs into entries
/// - Inserting and removing tags in long prompts
/// - Placeholder expansion, random and round robin
const SMALL_CATALOG_GROUPS: usize = 10;
const LARGE_CATALOG_GROUPS: usize = 200;
const TAGS_PER_GROUP: usize = 25;

const ITERATIONS: usize = 100;

/// Create a tag file with nested groups of sequences
fn create_tag_file(groups: usize, tags_per_group: usize) -> String {
    let mut out = String::new();
    for group in 0..groups {
        out.push_str(&format!("group{group}:\n"));
        out.push_str("  plain:\n");
        for tag in 0..tags_per_group {
            out.push_str(&format!("    - tag {group} {tag}\n"));
        }
        out.push_str("  named:\n");
        for tag in 0..tags_per_group {
            out.push_str(&format!("    key{tag}: value {group} {tag}\n"));
        }
    }
    out
}

/// Create a prompt of `count` comma separated tags
fn create_prompt(count: usize) -> String {
    (0..count)
        .map(|idx| format!("tag{idx}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    iterations: usize,
    total_duration: Duration,
    avg_duration: Duration,
    min_duration: Duration,
    max_duration: Duration,
}

impl BenchmarkResult {
    fn print(&self) {
        println!("\n{}", "=".repeat(70));
        println!("Benchmark: {}", self.name);
        println!("{}", "=".repeat(70));
        println!("Iterations:     {}", self.iterations);
        println!("Total time:     {:?}", self.total_duration);
        println!("Average:        {:?}", self.avg_duration);
        println!("Min:            {:?}", self.min_duration);
        println!("Max:            {:?}", self.max_duration);

        if self.avg_duration.as_millis() > 16 {
            println!("\nWARNING: Average duration > 16ms (may drop frames)");
        }
    }
}

fn benchmark<F>(name: &str, iterations: usize, mut f: F) -> BenchmarkResult
where
    F: FnMut(),
{
    let mut durations = Vec::with_capacity(iterations);

    // Warmup
    for _ in 0..10 {
        f();
    }

    for _ in 0..iterations {
        let start = Instant::now();
        f();
        durations.push(start.elapsed());
    }

    let total_duration: Duration = durations.iter().sum();
    let avg_duration = total_duration / iterations as u32;
    let min_duration = *durations.iter().min().unwrap();
    let max_duration = *durations.iter().max().unwrap();

    BenchmarkResult {
        name: name.to_string(),
        iterations,
        total_duration,
        avg_duration,
        min_duration,
        max_duration,
    }
}

#[test]
fn bench_catalog_loading() {
    for (name, groups) in [
        ("Small", SMALL_CATALOG_GROUPS),
        ("Large", LARGE_CATALOG_GROUPS),
    ] {
        let content = create_tag_file(groups, TAGS_PER_GROUP);
        let result = benchmark(&format!("load - {name} ({groups} groups)"), ITERATIONS, || {
            let report = TagCatalog::load(vec![Source::new("bench.yml", content.clone())]);
            assert!(report.warnings.is_empty());
        });
        result.print();
    }
}

#[test]
fn bench_flatten() {
    let content = create_tag_file(LARGE_CATALOG_GROUPS, TAGS_PER_GROUP);
    let catalog = TagCatalog::load(vec![Source::new("bench.yml", content)]).catalog;
    let result = benchmark("render_entries - Large", ITERATIONS, || {
        let entries = catalog.render_entries("bench").unwrap();
        assert!(!entries.is_empty());
    });
    result.print();
}

#[test]
fn bench_splicing_long_prompts() {
    for count in [10, 1_000] {
        let prompt = create_prompt(count);
        let middle = prompt.chars().count() / 2;

        let result = benchmark(&format!("insert - {count} tags"), ITERATIONS, || {
            let splice = splice::insert(&prompt, middle, middle, "masterpiece", true);
            assert!(splice.cursor > middle);
        });
        result.print();

        let last = format!("tag{}", count - 1);
        let result = benchmark(&format!("remove - {count} tags"), ITERATIONS, || {
            let removed = splice::remove(&prompt, &last);
            assert!(removed.len() < prompt.len());
        });
        result.print();
    }
}

#[test]
fn bench_placeholder_expansion() {
    let content = create_tag_file(LARGE_CATALOG_GROUPS, TAGS_PER_GROUP);
    let catalog = TagCatalog::load(vec![Source::new("bench.yml", content)]).catalog;
    let token = TagPath::root("bench").child("group0").token();
    let prompt = format!("1girl, {token}, @3-5$$bench@, smile");

    let mut expander = Expander::with_seed(&catalog, 1);
    let result = benchmark("expand - mixed placeholders", ITERATIONS, || {
        let expanded = expander.expand(&prompt).unwrap();
        assert!(!expanded.contains('@'));
    });
    result.print();
}

#[test]
fn bench_round_robin_cycle() {
    let content = create_tag_file(SMALL_CATALOG_GROUPS, TAGS_PER_GROUP);
    let catalog = TagCatalog::load(vec![Source::new("bench.yml", content)]).catalog;
    let prompt = "@bench:group0:plain@, @bench:group1:plain@";

    let result = benchmark("round robin - rebuild and step", ITERATIONS, || {
        let mut cycle = RoundRobin::new();
        let expanded = cycle.expand(&catalog, prompt).unwrap();
        assert!(!expanded.contains('@'));
        assert_eq!(cycle.len(), TAGS_PER_GROUP * TAGS_PER_GROUP);
    });
    result.print();
}
