//! Archive file name parsing.

use std::ops::RangeInclusive;

/// Highest base chunk index shipped with the game.
pub const BASE_RESERVED_MAX: u32 = 29;

/// Patch indices this tool writes and therefore owns.
pub const OWNED_PATCH_SLOTS: RangeInclusive<u32> = 200..=300;

const CHUNK_PREFIX: &str = "chunk";
const PATCH_INFIX: &str = "patch";

/// Slot metadata carried in an archive file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotName {
    /// `chunk<N>.<ext>`
    Base(u32),
    /// `chunk<N>patch<M>.<ext>`, holding `M`.
    Patch(u32),
    Unparseable,
}

/// What the reclaimer does with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAction {
    Delete,
    Keep,
}

impl SlotName {
    pub fn action(self) -> SlotAction {
        match self {
            SlotName::Patch(index) if OWNED_PATCH_SLOTS.contains(&index) => SlotAction::Delete,
            SlotName::Base(index) if index > BASE_RESERVED_MAX => SlotAction::Delete,
            _ => SlotAction::Keep,
        }
    }
}

/// Parse a runtime directory entry name.
///
/// Names containing `patch` are read with the patch grammar only. The match
/// is unanchored, so trailing text such as `.bak` is ignored; when a name
/// matches more than once the last match wins. Other names take their base
/// index from the part before the first `.`.
pub fn parse_slot_name(name: &str) -> SlotName {
    if name.contains(PATCH_INFIX) {
        return last_patch_match(name)
            .map(SlotName::Patch)
            .unwrap_or(SlotName::Unparseable);
    }

    let stem = name.split('.').next().unwrap_or(name);
    let Some(rest) = stem.strip_prefix(CHUNK_PREFIX) else {
        return SlotName::Unparseable;
    };
    match split_digits(rest) {
        Some((index, "")) => SlotName::Base(index),
        _ => SlotName::Unparseable,
    }
}

fn last_patch_match(name: &str) -> Option<u32> {
    name.match_indices(CHUNK_PREFIX)
        .filter_map(|(start, _)| match_patch_at(&name[start + CHUNK_PREFIX.len()..]))
        .last()
}

/// Match `<digits*>patch<digits+>.<ext>` at the start of `rest`; anything
/// after the extension is ignored.
fn match_patch_at(rest: &str) -> Option<u32> {
    let chunk_digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let after_chunk = rest[chunk_digits..].strip_prefix(PATCH_INFIX)?;
    let (index, tail) = split_digits(after_chunk)?;
    starts_with_extension(tail).then_some(index)
}

/// Split a non-empty leading run of ASCII digits off `s`.
fn split_digits(s: &str) -> Option<(u32, &str)> {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let index = s[..len].parse().ok()?;
    Some((index, &s[len..]))
}

fn starts_with_extension(tail: &str) -> bool {
    tail.strip_prefix('.')
        .and_then(|ext| ext.bytes().next())
        .is_some_and(|b| b.is_ascii_alphanumeric())
}
