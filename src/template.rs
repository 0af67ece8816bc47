//! Expansion of `@path@` placeholders into snippets.
//!
//! A placeholder may carry a count: `@3$$path@` picks three snippets and
//! `@1-3$$path@` picks between one and three. Picks are drawn with
//! replacement and joined with `", "`. Only references to a loaded catalog
//! count as placeholders; anything else between two `@` stays as typed.
//!
//! [`Expander`] picks at random. [`RoundRobin`] steps through every
//! combination of a prompt's placeholders, one per call.

use std::ops::Range;

use clap::ValueEnum;
use once_cell::sync::Lazy;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::catalog::{CatalogError, TagCatalog, TagPath};
use crate::splice::SEPARATOR;

/// Snippets may contain placeholders themselves; expansion stops after this
/// many substitutions.
const MAX_ROUNDS: usize = 100;

/// Upper bound for the count of a single placeholder.
pub const MAX_PICKS: usize = 64;

/// Upper bound for the combinations a round-robin cycle may enumerate.
pub const MAX_COMBINATIONS: usize = 10_000;

static TEMPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@(?:(?P<min>\d+)(?:-(?P<max>\d+))?\$\$)?(?P<ref>(?:\\.|[^@\\])+)@")
        .expect("template pattern is valid")
});

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SelectionMode {
    #[default]
    Random,
    RoundRobin,
}

impl SelectionMode {
    pub fn toggle(self) -> Self {
        match self {
            SelectionMode::Random => SelectionMode::RoundRobin,
            SelectionMode::RoundRobin => SelectionMode::Random,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SelectionMode::Random => "random",
            SelectionMode::RoundRobin => "round robin",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    pub range: Range<usize>,
    pub path: TagPath,
    pub min: usize,
    pub max: usize,
}

impl Template {
    fn from_captures(captures: &Captures<'_>) -> Option<Self> {
        let whole = captures.get(0)?;
        let reference = captures.name("ref")?.as_str();
        let (min, max) = match captures.name("min") {
            Some(min) => {
                let first = parse_count(min.as_str());
                let second = captures
                    .name("max")
                    .map(|max| parse_count(max.as_str()))
                    .unwrap_or(first);
                (first.min(second), first.max(second))
            }
            None => (1, 1),
        };
        Some(Self {
            range: whole.range(),
            path: TagPath::parse(reference),
            min,
            max,
        })
    }
}

// Digits only; overflow saturates before the cap applies.
fn parse_count(digits: &str) -> usize {
    digits.parse::<usize>().unwrap_or(usize::MAX).min(MAX_PICKS)
}

/// Every `@...@` span in `prompt`, in order, whether or not it resolves.
pub fn templates(prompt: &str) -> Vec<Template> {
    TEMPLATE
        .captures_iter(prompt)
        .filter_map(|captures| Template::from_captures(&captures))
        .collect()
}

/// The first placeholder at or after byte `from` whose catalog is loaded.
///
/// A span naming an unknown catalog is skipped one byte at a time, so in
/// `a@b.com, @hair@` the second `@` can still open a placeholder.
fn next_placeholder(catalog: &TagCatalog, text: &str, mut from: usize) -> Option<Template> {
    while let Some(captures) = TEMPLATE.captures_at(text, from) {
        let template = Template::from_captures(&captures)?;
        if template.path.catalog().is_some_and(|name| catalog.contains(name)) {
            return Some(template);
        }
        from = template.range.start + 1;
    }
    None
}

/// Non-overlapping placeholders of `prompt` that refer to loaded catalogs.
pub fn placeholders(catalog: &TagCatalog, prompt: &str) -> Vec<Template> {
    let mut found = Vec::new();
    let mut from = 0;
    while let Some(template) = next_placeholder(catalog, prompt, from) {
        from = template.range.end;
        found.push(template);
    }
    found
}

pub struct Expander<'a> {
    catalog: &'a TagCatalog,
    rng: StdRng,
}

impl<'a> Expander<'a> {
    pub fn new(catalog: &'a TagCatalog) -> Self {
        Self {
            catalog,
            rng: StdRng::from_entropy(),
        }
    }

    /// Same seed, same catalog and same prompt give the same expansion.
    pub fn with_seed(catalog: &'a TagCatalog, seed: u64) -> Self {
        Self {
            catalog,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn expand(&mut self, prompt: &str) -> Result<String, CatalogError> {
        let mut text = prompt.to_string();
        for _ in 0..MAX_ROUNDS {
            let Some(template) = next_placeholder(self.catalog, &text, 0) else {
                return Ok(text);
            };
            let replacement = self.pick(&template)?;
            debug!(path = %template.path, %replacement, "expanded placeholder");
            text.replace_range(template.range, &replacement);
        }
        if next_placeholder(self.catalog, &text, 0).is_some() {
            warn!("Stopped expanding placeholders after {} rounds", MAX_ROUNDS);
        }
        Ok(text)
    }

    fn pick(&mut self, template: &Template) -> Result<String, CatalogError> {
        let options = self.catalog.options_at(&template.path)?;
        let count = self.rng.gen_range(template.min..=template.max);
        let picks: Vec<&str> = (0..count)
            .filter_map(|_| options.choose(&mut self.rng).map(String::as_str))
            .collect();
        Ok(picks.join(SEPARATOR))
    }
}

/// Cycles through all combinations of the placeholders in a prompt.
///
/// The cycle is rebuilt whenever the prompt text differs from the previous
/// call, and must be [`reset`](Self::reset) when the catalog changes.
/// Picks are substituted once; placeholders inside picked snippets are left
/// for a later pass.
#[derive(Debug, Default)]
pub struct RoundRobin {
    prompt: Option<String>,
    combinations: Vec<Vec<String>>,
    next: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Size of the current cycle; zero before the first expansion.
    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    pub fn expand(&mut self, catalog: &TagCatalog, prompt: &str) -> Result<String, CatalogError> {
        let found = placeholders(catalog, prompt);
        if found.is_empty() {
            return Ok(prompt.to_string());
        }

        if self.prompt.as_deref() != Some(prompt) || self.combinations.is_empty() {
            self.combinations = combinations(catalog, &found)?;
            self.prompt = Some(prompt.to_string());
            self.next = 0;
            debug!(combinations = self.combinations.len(), "rebuilt round-robin cycle");
        }
        if self.next >= self.combinations.len() {
            self.next = 0;
        }
        let Some(picks) = self.combinations.get(self.next) else {
            return Ok(prompt.to_string());
        };
        self.next += 1;

        let mut text = prompt.to_string();
        for (template, pick) in found.iter().zip(picks).rev() {
            text.replace_range(template.range.clone(), pick);
        }
        Ok(text)
    }
}

/// Cartesian product of every placeholder's choices, first placeholder
/// varying slowest.
fn combinations(
    catalog: &TagCatalog,
    found: &[Template],
) -> Result<Vec<Vec<String>>, CatalogError> {
    let mut options = Vec::with_capacity(found.len());
    let mut total: usize = 1;
    for template in found {
        let choices = catalog.options_at(&template.path)?;
        total = total.saturating_mul(choice_count(choices.len(), template.min, template.max));
        if total > MAX_COMBINATIONS {
            return Err(CatalogError::TooManyCombinations(MAX_COMBINATIONS));
        }
        options.push(choices_of(&choices, template.min, template.max));
    }

    let mut rows: Vec<Vec<String>> = vec![Vec::new()];
    for choices in &options {
        rows = rows
            .into_iter()
            .flat_map(|row| {
                choices.iter().map(move |choice| {
                    let mut next = row.clone();
                    next.push(choice.clone());
                    next
                })
            })
            .collect();
    }
    Ok(rows)
}

fn choice_count(options: usize, min: usize, max: usize) -> usize {
    (min..=max).fold(0usize, |acc, count| {
        let sequences = u32::try_from(count)
            .ok()
            .and_then(|count| options.checked_pow(count))
            .unwrap_or(usize::MAX);
        acc.saturating_add(sequences)
    })
}

/// Every ordered pick of `min..=max` options, with replacement, joined.
fn choices_of(options: &[String], min: usize, max: usize) -> Vec<String> {
    let mut out = Vec::new();
    for count in min..=max {
        let mut sequences: Vec<Vec<&str>> = vec![Vec::new()];
        for _ in 0..count {
            sequences = sequences
                .into_iter()
                .flat_map(|sequence| {
                    options.iter().map(move |option| {
                        let mut next = sequence.clone();
                        next.push(option.as_str());
                        next
                    })
                })
                .collect();
        }
        out.extend(sequences.into_iter().map(|sequence| sequence.join(SEPARATOR)));
    }
    out
}
