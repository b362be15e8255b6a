//! Source Map v3 construction, serialization, and lookup.
//!
//! The stitcher correlates whole lines, never columns, so every encoded
//! segment carries a zero generated and original column. Sources keep their
//! registration order: the map's `sources` table must list files in the same
//! order they appear in the bundle.

use std::hash::BuildHasherDefault;

use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// A single line-granular mapping entry. Lines are 1-based on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    /// Index into the sources table.
    pub source: u32,
    /// Line in the original file.
    pub original_line: u32,
    /// Line in the generated bundle.
    pub generated_line: u32,
}

/// Accumulates mappings and embedded source contents for one bundle.
#[derive(Debug, Default)]
pub struct SourceMapBuilder {
    /// Source reference to embedded content, in registration order.
    sources: FxIndexMap<String, Option<String>>,
    mappings: Vec<Mapping>,
}

impl SourceMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `source` in the sources table, registering it on first use.
    pub fn add_source(&mut self, source: &str) -> u32 {
        if let Some(index) = self.sources.get_index_of(source) {
            return index as u32;
        }
        let (index, _) = self.sources.insert_full(source.to_string(), None);
        index as u32
    }

    /// Record that line `original_line` of `source` lands on line
    /// `generated_line` of the bundle.
    pub fn add_mapping(&mut self, source: &str, original_line: u32, generated_line: u32) {
        debug_assert!(
            original_line >= 1 && generated_line >= 1,
            "mapping lines are 1-based"
        );
        let source = self.add_source(source);
        self.mappings.push(Mapping {
            source,
            original_line,
            generated_line,
        });
    }

    /// Embed the full original text of `source` for debugger display.
    pub fn set_source_content(&mut self, source: &str, content: &str) {
        self.add_source(source);
        if let Some(slot) = self.sources.get_mut(source) {
            *slot = Some(content.to_string());
        }
    }

    /// Finish the map. Fails when no source was ever registered.
    pub fn build(mut self) -> Result<SourceMap> {
        ensure!(
            !self.sources.is_empty(),
            "Cannot build a source map without any sources"
        );

        self.mappings.sort_by(|a, b| {
            a.generated_line
                .cmp(&b.generated_line)
                .then(a.source.cmp(&b.source))
                .then(a.original_line.cmp(&b.original_line))
        });
        let mappings = encode_mappings(&self.mappings);

        let mut sources = Vec::with_capacity(self.sources.len());
        let mut sources_content = Vec::with_capacity(self.sources.len());
        for (source, content) in self.sources {
            sources.push(source);
            sources_content.push(content);
        }

        Ok(SourceMap {
            version: 3,
            sources,
            names: Vec::new(),
            mappings,
            file: None,
            source_root: None,
            sources_content,
        })
    }
}

/// Source Map v3 document, serialized as the JSON written next to bundles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMap {
    /// Always 3.
    pub version: u8,
    /// Source references in bundle order.
    pub sources: Vec<String>,
    /// Symbol names; line-granular maps never record any.
    pub names: Vec<String>,
    /// Base64 VLQ encoded segments.
    pub mappings: String,
    /// Generated file name, when known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file: Option<String>,
    /// Prefix consumers prepend to source references.
    #[serde(rename = "sourceRoot", skip_serializing_if = "Option::is_none", default)]
    pub source_root: Option<String>,
    /// Full original text per source, aligned with `sources`.
    #[serde(rename = "sourcesContent", skip_serializing_if = "Vec::is_empty", default)]
    pub sources_content: Vec<Option<String>>,
}

impl SourceMap {
    /// Parse a map from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid source map JSON")
    }

    /// Serialize to the compact JSON form written next to bundles.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize source map")
    }

    /// Resolve a 1-based generated line back to its original source line.
    pub fn lookup(&self, generated_line: u32) -> Option<OriginalLocation> {
        self.decode_mappings()
            .into_iter()
            .find(|mapping| mapping.generated_line == generated_line)
            .and_then(|mapping| {
                self.sources
                    .get(mapping.source as usize)
                    .map(|source| OriginalLocation {
                        source: source.clone(),
                        line: mapping.original_line,
                    })
            })
    }

    /// Decode the VLQ `mappings` string back into mapping records.
    ///
    /// Lenient on malformed segments: anything that cannot be decoded is
    /// skipped rather than failing the whole map.
    pub fn decode_mappings(&self) -> Vec<Mapping> {
        let mut decoded = Vec::new();
        let mut source = 0i64;
        let mut original_line = 0i64;

        for (line_index, segments) in self.mappings.split(';').enumerate() {
            for segment in segments.split(',') {
                if segment.is_empty() {
                    continue;
                }

                let mut chars = segment.chars();
                if vlq_decode(&mut chars).is_none() {
                    continue;
                }
                let Some(source_delta) = vlq_decode(&mut chars) else {
                    continue;
                };
                source += source_delta;
                if let Some(line_delta) = vlq_decode(&mut chars) {
                    original_line += line_delta;
                }

                if let (Ok(source), Ok(original_line)) =
                    (u32::try_from(source), u32::try_from(original_line))
                {
                    decoded.push(Mapping {
                        source,
                        original_line: original_line + 1,
                        generated_line: line_index as u32 + 1,
                    });
                }
            }
        }

        decoded
    }
}

/// Original source position of a generated line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalLocation {
    /// Source reference as recorded in the map.
    pub source: String,
    /// 1-based line in that source.
    pub line: u32,
}

/// Encode sorted mappings as the v3 `mappings` string.
///
/// One segment per mapped generated line, four fields each; generated and
/// original columns are always zero, so only the source index and original
/// line deltas ever move.
fn encode_mappings(mappings: &[Mapping]) -> String {
    let mut encoded = String::new();
    let mut generated_line = 0u32;
    let mut prev_source = 0i64;
    let mut prev_original_line = 0i64;

    for mapping in mappings {
        // 1-based on the way in, 0-based encoded; a zero line from a caller
        // ignoring the contract clamps to the first line instead of wrapping.
        while generated_line < mapping.generated_line.saturating_sub(1) {
            encoded.push(';');
            generated_line += 1;
        }
        if !encoded.is_empty() && !encoded.ends_with(';') {
            encoded.push(',');
        }

        let source = i64::from(mapping.source);
        let original_line = i64::from(mapping.original_line.saturating_sub(1));
        vlq_encode(0, &mut encoded);
        vlq_encode(source - prev_source, &mut encoded);
        vlq_encode(original_line - prev_original_line, &mut encoded);
        vlq_encode(0, &mut encoded);

        prev_source = source;
        prev_original_line = original_line;
    }

    encoded
}

/// Append the base64 VLQ encoding of `value` to `out`.
fn vlq_encode(value: i64, out: &mut String) {
    // Sign lives in the least significant bit.
    let mut unsigned = (value.unsigned_abs() << 1) | u64::from(value < 0);

    loop {
        let mut digit = (unsigned & 0x1F) as u8;
        unsigned >>= 5;
        if unsigned > 0 {
            digit |= 0x20;
        }
        out.push(char::from(BASE64_CHARS[digit as usize]));
        if unsigned == 0 {
            break;
        }
    }
}

/// Decode one base64 VLQ value from `chars`.
///
/// `None` when the input runs out, a character is not a base64 digit, or the
/// continuation run exceeds what 64 bits can hold.
fn vlq_decode(chars: &mut std::str::Chars<'_>) -> Option<i64> {
    let mut value = 0u64;
    let mut shift = 0u32;

    loop {
        let byte = u8::try_from(chars.next()?).ok()?;
        let digit = BASE64_CHARS.iter().position(|&b| b == byte)? as u64;
        value |= (digit & 0x1F).checked_shl(shift)?;
        shift += 5;
        if digit & 0x20 == 0 {
            break;
        }
    }

    let negative = value & 1 != 0;
    let magnitude = i64::try_from(value >> 1).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
