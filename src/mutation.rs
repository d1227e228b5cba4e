use std::collections::HashSet;

use crate::error::LineInfo;
use crate::tokenizer::{is_identifier, strip_comment, token_is_comment, MAX_NAME_LENGTH};
use crate::{ParseError, RewriteError};

/// Active-mutator masks are `u64`, one bit per mutator
pub const MAX_MUTATORS: usize = 64;

/// One compile-time variation axis: a name and the values it can take
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Mutator {
    name: String,
    /// Sorted, no duplicates
    values: Vec<i32>,
}

impl Mutator {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn has_value(&self, value: i32) -> bool {
        mutator_has_value(self, value)
    }
}

pub fn mutator_has_value(mutator: &Mutator, value: i32) -> bool {
    mutator.values.iter().any(|&v| v == value)
}

/// Partial mutation; `None` slots match anything. Slots past the end belong to
/// mutators declared after the rule and are wildcards too.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct MutationSkip {
    partial_mutation: Vec<Option<i32>>,
}

impl MutationSkip {
    fn matches(&self, mutation: &[i32]) -> bool {
        self.partial_mutation
            .iter()
            .zip(mutation)
            .all(|(slot, &value)| slot.map_or(true, |v| v == value))
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct RewriteRecord {
    pub mutator_index: usize,
    pub value_from: i32,
    pub value_to: i32,
}

/// Records are sorted by mutator index, each mutator at most once.
#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) struct MutationRewrite {
    records: Vec<RewriteRecord>,
}

impl MutationRewrite {
    fn matches(&self, mutation: &[i32]) -> bool {
        self.records
            .iter()
            .all(|rec| mutation[rec.mutator_index] == rec.value_from)
    }

    fn same_pattern(&self, other: &MutationRewrite) -> bool {
        self.records.len() == other.records.len()
            && self.records.iter().zip(&other.records).all(|(a, b)| {
                a.mutator_index == b.mutator_index && a.value_from == b.value_from
            })
    }
}

/// Declared mutators plus the skip and rewrite rules over them.
#[derive(Clone, Default, Debug)]
pub struct MutationSpace {
    mutators: Vec<Mutator>,
    skips: Vec<MutationSkip>,
    rewrites: Vec<MutationRewrite>,
}

impl MutationSpace {
    pub fn mutators(&self) -> &[Mutator] {
        &self.mutators
    }

    pub fn mutator_index(&self, name: &str) -> Option<usize> {
        self.mutators.iter().position(|m| m.name == name)
    }

    pub(crate) fn skip_rule_count(&self) -> usize {
        self.skips.len()
    }

    pub(crate) fn rewrite_rule_count(&self) -> usize {
        self.rewrites.len()
    }

    /// Number of mutations in the full Cartesian product, skipped ones included.
    /// A program without mutators has exactly one (empty) mutation. `None` when the
    /// count doesn't fit in a `usize`.
    pub fn mutation_count(&self) -> Option<usize> {
        self.mutators
            .iter()
            .try_fold(1usize, |count, m| count.checked_mul(m.values.len()))
    }

    /// Iterate every mutation in the space, last mutator spinning fastest
    pub fn mutations(&self) -> MutationIter<'_> {
        MutationIter {
            mutators: &self.mutators,
            dials: vec![0; self.mutators.len()],
            done: false,
        }
    }

    /// Right length, and every value legal for its mutator
    pub fn is_valid_mutation(&self, mutation: &[i32]) -> bool {
        mutation.len() == self.mutators.len()
            && self
                .mutators
                .iter()
                .zip(mutation)
                .all(|(m, &v)| mutator_has_value(m, v))
    }

    /// Whether any skip rule marks `mutation` as not to be built.
    pub fn skip_mutation(&self, mutation: &[i32]) -> bool {
        assert_eq!(mutation.len(), self.mutators.len(), "mutation size mismatch");
        self.skips.iter().any(|skip| skip.matches(mutation))
    }

    /// Apply the first matching rewrite rule in place. Only one rule is applied per call.
    pub fn rewrite_mutation(&self, mutation: &mut [i32]) -> bool {
        assert_eq!(mutation.len(), self.mutators.len(), "mutation size mismatch");

        match self.rewrites.iter().find(|rewrite| rewrite.matches(mutation)) {
            Some(rewrite) => {
                for rec in &rewrite.records {
                    mutation[rec.mutator_index] = rec.value_to;
                }
                true
            }
            None => false,
        }
    }

    /// Apply rewrite rules until none fires. Returns whether the mutation changed.
    pub fn canonicalize_mutation(&self, mutation: &mut [i32]) -> Result<bool, RewriteError> {
        let mut seen: HashSet<Vec<i32>> = HashSet::new();
        seen.insert(mutation.to_vec());

        let mut changed = false;
        while self.rewrite_mutation(mutation) {
            if !seen.insert(mutation.to_vec()) {
                return Err(RewriteError::Cycle {
                    mutation: mutation.to_vec(),
                });
            }
            changed = true;
        }

        Ok(changed)
    }

    /// `#pragma anki mutator NAME V0 V1 ...`
    pub(crate) fn parse_mutator(&mut self, args: &[&str], at: &LineInfo<'_>) -> Result<(), ParseError> {
        let (name, values) = match args.split_first() {
            Some((name, values)) if !token_is_comment(name) => (*name, values),
            _ => return Err(at.malformed("mutator needs a name")),
        };

        if self.mutator_index(name).is_some() {
            return Err(at.duplicate_mutator(name));
        }

        if name.len() > MAX_NAME_LENGTH {
            return Err(at.malformed("mutator name too long"));
        }

        if !is_identifier(name) {
            return Err(at.malformed("mutator name is not an identifier"));
        }

        if self.mutators.len() == MAX_MUTATORS {
            return Err(at.malformed("too many mutators"));
        }

        let mut parsed = Vec::with_capacity(values.len());
        for token in values.iter().take_while(|t| !token_is_comment(t)) {
            let value = token
                .parse::<i32>()
                .map_err(|_| at.malformed("mutator value is not an integer"))?;
            parsed.push(value);
        }

        if parsed.len() < 2 {
            return Err(at.malformed("mutator needs at least two values"));
        }

        parsed.sort_unstable();
        if let Some(pair) = parsed.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(at.duplicate_mutator_value(name, pair[0]));
        }

        self.mutators.push(Mutator {
            name: name.to_owned(),
            values: parsed,
        });

        Ok(())
    }

    /// `#pragma anki skip_mutation NAME0 VALUE0 NAME1 VALUE1 ...`
    pub(crate) fn parse_skip_mutation(&mut self, args: &[&str], at: &LineInfo<'_>) -> Result<(), ParseError> {
        let args = strip_comment(args);

        // One pair doesn't make sense: NAME0 VALUE0 NAME1 VALUE1 at least
        if args.len() < 4 || args.len() % 2 != 0 {
            return Err(at.malformed("skip_mutation needs two or more mutator/value pairs"));
        }

        let mut partial_mutation = vec![None; self.mutators.len()];
        for pair in args.chunks(2) {
            let (index, value) = self.resolve_pair(pair[0], pair[1], at)?;
            partial_mutation[index] = Some(value);
        }

        self.skips.push(MutationSkip { partial_mutation });
        Ok(())
    }

    /// `#pragma anki rewrite_mutation NAME0 FROM0 ... to NAME0 TO0 ...`
    pub(crate) fn parse_rewrite_mutation(&mut self, args: &[&str], at: &LineInfo<'_>) -> Result<(), ParseError> {
        let args = strip_comment(args);

        let to_pos = match args.iter().position(|t| *t == "to") {
            Some(pos) => pos,
            None => return Err(at.malformed("rewrite_mutation is missing \"to\"")),
        };
        let (from_side, to_side) = (&args[..to_pos], &args[to_pos + 1..]);

        if from_side.is_empty() || from_side.len() % 2 != 0 {
            return Err(at.malformed("rewrite_mutation needs mutator/value pairs before \"to\""));
        }

        if to_side.len() != from_side.len() {
            return Err(at.malformed("rewrite_mutation sides differ in size"));
        }

        let mut records: Vec<RewriteRecord> = Vec::with_capacity(from_side.len() / 2);
        for pair in from_side.chunks(2) {
            let (mutator_index, value_from) = self.resolve_pair(pair[0], pair[1], at)?;
            if records.iter().any(|rec| rec.mutator_index == mutator_index) {
                return Err(at.malformed("mutator appeared more than once"));
            }
            records.push(RewriteRecord {
                mutator_index,
                value_from,
                value_to: value_from,
            });
        }

        let mut assigned: Vec<usize> = Vec::with_capacity(records.len());
        for pair in to_side.chunks(2) {
            let (mutator_index, value_to) = self.resolve_pair(pair[0], pair[1], at)?;
            if assigned.contains(&mutator_index) {
                return Err(at.malformed("mutator appeared more than once"));
            }

            let rec = records
                .iter_mut()
                .find(|rec| rec.mutator_index == mutator_index)
                .ok_or_else(|| at.malformed("rewrite target is not on the left of \"to\""))?;
            rec.value_to = value_to;
            assigned.push(mutator_index);
        }

        records.sort_by_key(|rec| rec.mutator_index);
        let rewrite = MutationRewrite { records };

        if self.rewrites.iter().any(|other| other.same_pattern(&rewrite)) {
            return Err(at.duplicate_rewrite());
        }

        self.rewrites.push(rewrite);
        Ok(())
    }

    /// Resolve a `NAME VALUE` pair to (mutator index, legal value)
    fn resolve_pair(&self, name: &str, value: &str, at: &LineInfo<'_>) -> Result<(usize, i32), ParseError> {
        let index = self
            .mutator_index(name)
            .ok_or_else(|| at.mutator_not_found(name))?;

        let value = value
            .parse::<i32>()
            .map_err(|_| at.malformed("malformed mutator value"))?;

        if !mutator_has_value(&self.mutators[index], value) {
            return Err(at.malformed("mutator value incorrect"));
        }

        Ok((index, value))
    }

    /// Mutators, skip rules and rewrite rules in a stable byte form for hashing
    pub(crate) fn digest_into(&self, bytes: &mut Vec<u8>) {
        for m in &self.mutators {
            bytes.extend_from_slice(m.name.as_bytes());
            bytes.push(0);
            for v in &m.values {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
        }

        for skip in &self.skips {
            bytes.push(b's');
            for slot in &skip.partial_mutation {
                match slot {
                    Some(v) => {
                        bytes.push(1);
                        bytes.extend_from_slice(&v.to_le_bytes());
                    }
                    None => bytes.push(0),
                }
            }
        }

        for rewrite in &self.rewrites {
            bytes.push(b'r');
            for rec in &rewrite.records {
                bytes.extend_from_slice(&(rec.mutator_index as u32).to_le_bytes());
                bytes.extend_from_slice(&rec.value_from.to_le_bytes());
                bytes.extend_from_slice(&rec.value_to.to_le_bytes());
            }
        }
    }
}

/// Odometer over every combination of mutator values
pub struct MutationIter<'a> {
    mutators: &'a [Mutator],
    dials: Vec<usize>,
    done: bool,
}

impl<'a> Iterator for MutationIter<'a> {
    type Item = Vec<i32>;

    fn next(&mut self) -> Option<Vec<i32>> {
        if self.done {
            return None;
        }

        let mutation = self
            .mutators
            .iter()
            .zip(&self.dials)
            .map(|(m, &dial)| m.values[dial])
            .collect();

        // Spin the dials, carrying towards the first mutator
        self.done = true;
        for i in (0..self.dials.len()).rev() {
            self.dials[i] += 1;
            if self.dials[i] < self.mutators[i].values.len() {
                self.done = false;
                break;
            }
            self.dials[i] = 0;
        }

        Some(mutation)
    }
}
